//! 定时器注册表模块
//! Timer registry module
//!
//! 该模块实现了定时器记录本身以及按剩余触发时间排序的调度队列，
//! 是工作任务挑选下一个到期定时器的依据。
//!
//! This module implements the timer records themselves and the schedule
//! ordered by remaining time to fire, which the worker consults to pick the
//! next due timer.

pub mod entry;
pub mod queue;

pub use entry::{TimerEntry, TimerId, TimerState};
pub use queue::DeadlineQueue;
