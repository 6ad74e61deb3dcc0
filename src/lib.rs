#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the deadline-ordered timer service library.
//! 截止时间有序定时器服务库的根。

pub mod clock;
pub mod config;
pub mod error;
pub mod task;
pub mod timer;

pub mod service;

pub use config::TimerConfig;
pub use error::{Error, Result};
pub use service::{TimerService, TimerServiceStats, start_timer_service};
pub use task::{NoOpQueue, SenderQueue, TaskQueue, TimerJob, TimerTask};
pub use timer::{TimerId, TimerState};
