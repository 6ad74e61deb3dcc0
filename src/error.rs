//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the timer service library.
/// 定时器服务库的主要错误类型。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The operation could not be completed because the service has been shut
    /// down, or every worker handle is gone.
    /// 由于服务已关闭或所有工作句柄均已消失，操作无法完成。
    #[error("timer service is not running")]
    NotRunning,

    /// The referenced timer is absent: it already fired, was already
    /// cancelled, or its id was never issued. Expected under normal races.
    /// 引用的定时器不存在：它已经触发、已被取消，或其ID从未被分配。
    /// 在正常竞争下属于预期情况。
    #[error("timer not found")]
    TimerNotFound,

    /// No more timer records can be created because the configured
    /// `max_timers` bound has been reached.
    /// 由于已达到配置的 `max_timers` 上限，无法再创建定时器记录。
    #[error("timer capacity exhausted")]
    CapacityExhausted,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
