//! 定时器服务命令定义
//! Timer service command definitions
//!
//! 本模块包含控制接口与工作任务之间的通信协议：命令枚举和统计信息。
//!
//! This module contains the communication protocol between the control
//! surface and the worker task: the command enum and service statistics.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::Result;
use crate::task::TimerJob;
use crate::timer::TimerId;

/// 定时器服务命令
/// Timer service commands
#[derive(Debug)]
pub enum ServiceCommand {
    /// 创建定时器
    /// Create a timer
    Schedule {
        period: Duration,
        recurring: bool,
        job: TimerJob,
        response_tx: oneshot::Sender<Result<TimerId>>,
    },
    /// 取消定时器
    /// Cancel a timer
    Cancel {
        timer_id: TimerId,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// 暂停定时器，冻结其剩余时间
    /// Pause a timer, freezing its remaining time
    Pause {
        timer_id: TimerId,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// 恢复暂停中的定时器
    /// Resume a paused timer
    Resume {
        timer_id: TimerId,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// 以新的周期重新开始倒计时
    /// Restart the countdown with a new period
    Reset {
        timer_id: TimerId,
        period: Duration,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// 获取统计信息
    /// Get statistics
    GetStats {
        response_tx: oneshot::Sender<TimerServiceStats>,
    },
    /// 关闭定时器服务；应答在工作任务退出前发出
    /// Shut the service down; acknowledged right before the worker exits
    Shutdown {
        response_tx: oneshot::Sender<()>,
    },
}

/// 定时器服务统计信息
/// Timer service statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerServiceStats {
    /// 存活定时器数
    /// Number of live timers
    pub live_timers: usize,
    /// 暂停中的定时器数
    /// Number of paused timers
    pub paused_timers: usize,
    /// 已触发的定时器次数
    /// Number of timer firings
    pub fired_timers: u64,
    /// 已取消的定时器数
    /// Number of cancelled timers
    pub cancelled_timers: u64,
}

impl std::fmt::Display for TimerServiceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimerServiceStats {{ live: {}, paused: {}, fired: {}, cancelled: {} }}",
            self.live_timers, self.paused_timers, self.fired_timers, self.cancelled_timers
        )
    }
}
