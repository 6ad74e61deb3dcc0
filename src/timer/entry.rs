//! 定时器记录实现
//! Timer record implementation

use std::time::Duration;

use tokio::time::Instant;

use crate::task::TimerJob;

/// 定时器ID，用于唯一标识一个定时器
/// Timer ID, used to uniquely identify a timer
pub type TimerId = u64;

/// 定时器的运行状态
/// Run state of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// 倒计时正在推进
    /// The countdown is advancing
    Running,
    /// 倒计时被冻结，剩余时间保持不变
    /// The countdown is frozen, remaining time holds still
    Paused,
}

/// 调度队列中的定时器记录
/// A timer record in the schedule
#[derive(Debug, Clone)]
pub struct TimerEntry {
    /// 定时器ID
    /// Timer ID
    pub id: TimerId,
    /// 运行状态
    /// Run state
    pub state: TimerState,
    /// 触发后是否重新装载而不是丢弃
    /// Whether the timer is re-armed after firing instead of discarded
    pub recurring: bool,
    /// 本轮倒计时的时长
    /// Duration of the current countdown window
    pub period: Duration,
    /// 本轮倒计时的起点
    /// Start of the current countdown window
    pub started_at: Instant,
    /// 本轮倒计时中累计的暂停时长
    /// Total time spent paused during the current countdown window
    pub paused_total: Duration,
    /// 进入暂停状态的时刻，恢复时结算
    /// Instant the timer entered Paused, settled on resume
    pub paused_at: Option<Instant>,
    /// 到期时执行的工作单元
    /// The unit of work run on expiry
    pub job: TimerJob,
}

impl TimerEntry {
    /// 创建新的运行中定时器记录
    /// Create a new running timer record
    pub fn new(id: TimerId, period: Duration, recurring: bool, job: TimerJob, now: Instant) -> Self {
        Self {
            id,
            state: TimerState::Running,
            recurring,
            period,
            started_at: now,
            paused_total: Duration::ZERO,
            paused_at: None,
            job,
        }
    }

    /// 本轮倒计时中已计入的时长。暂停期间以进入暂停的时刻为参照，
    /// 因此剩余时间在暂停时被冻结。
    /// Elapsed time charged against the deadline in the current window.
    /// While paused the reference point is the pause instant, which is what
    /// freezes the remaining time.
    fn charged(&self, now: Instant) -> Duration {
        let reference = match self.state {
            TimerState::Running => now,
            TimerState::Paused => self.paused_at.unwrap_or(now),
        };
        reference
            .saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_total)
    }

    /// 距离触发还剩的时长。到期后为零。
    /// Time left before the timer fires. Zero once due.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.period.saturating_sub(self.charged(now))
    }

    /// 定时器是否已到期（仅运行中的定时器会到期）
    /// Whether the timer is due (only a running timer can become due)
    pub fn is_due(&self, now: Instant) -> bool {
        self.state == TimerState::Running && self.remaining_at(now).is_zero()
    }

    /// 冻结倒计时
    /// Freeze the countdown
    pub fn pause(&mut self, now: Instant) {
        self.paused_at = Some(now);
        self.state = TimerState::Paused;
    }

    /// 解冻倒计时，把暂停时长计入累计值
    /// Unfreeze the countdown, folding the pause span into the accumulator
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
        self.state = TimerState::Running;
    }

    /// 开启新一轮倒计时：清零暂停累计并把起点移到 `now`。
    /// 运行状态保持不变；暂停中的定时器其冻结窗口也从 `now` 重新开始。
    /// Start a fresh countdown window: zero the pause accumulator and move
    /// the start to `now`. The run state is unchanged; for a paused timer
    /// the freeze window restarts at `now` as well.
    pub fn rearm(&mut self, now: Instant) {
        self.paused_total = Duration::ZERO;
        self.started_at = now;
        if self.state == TimerState::Paused {
            self.paused_at = Some(now);
        }
    }
}
