//! 定义了定时器服务的可配置参数。
//! Defines configurable parameters for the timer service.

/// A structure containing all configurable parameters for the timer service.
///
/// 包含定时器服务所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// The capacity of the command channel between control-surface handles
    /// and the worker task. A full channel makes control calls wait until the
    /// worker drains it.
    ///
    /// 控制接口句柄与工作任务之间命令通道的容量。
    /// 通道满时，控制调用会等待工作任务将其排空。
    pub command_buffer_size: usize,

    /// The maximum number of live timers. `schedule` fails with
    /// `Error::CapacityExhausted` once this bound is reached.
    ///
    /// 存活定时器的最大数量。达到该上限后，`schedule` 将以
    /// `Error::CapacityExhausted` 失败。
    pub max_timers: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 1024,
            max_timers: 65536,
        }
    }
}
