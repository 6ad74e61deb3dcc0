//! 定时器服务模块
//! Timer service module
//!
//! 该模块实现了唯一的定时器后台工作任务以及外部调用者使用的控制接口。
//! 所有定时器状态都归工作任务所有，控制操作通过消息传递完成。
//!
//! This module implements the single timer background worker task and the
//! control surface used by external callers. All timer state is owned by the
//! worker; control operations are message passing.

pub mod commands;
pub mod handle;
pub mod worker;


pub use commands::{ServiceCommand, TimerServiceStats};
pub use handle::{TimerService, start_timer_service};
pub use worker::TimerWorker;
