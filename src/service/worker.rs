//! 定时器工作任务实现
//! Timer worker task implementation
//!
//! 该模块实现了唯一的定时器后台任务。它独占定时器注册表和调度队列，
//! 反复触发到期的定时器，并在最近截止时间与命令通道之间等待：到达的
//! 命令会像条件变量的信号一样提前结束定时等待。
//!
//! This module implements the single timer background task. It exclusively
//! owns the timer registry and schedule, repeatedly fires due timers, and
//! waits on the nearest deadline and the command channel at once: an
//! arriving command cuts a timed wait short exactly like a condition
//! variable signal would.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{info, trace, warn};

use crate::clock;
use crate::config::TimerConfig;
use crate::error::{Error, Result};
use crate::service::commands::{ServiceCommand, TimerServiceStats};
use crate::task::{TaskQueue, TimerJob, TimerTask};
use crate::timer::{DeadlineQueue, TimerEntry, TimerId, TimerState};

/// 没有可运行定时器时的重新检查间隔
/// Recheck interval when no runnable timer exists
const IDLE_RECHECK_INTERVAL: Duration = Duration::from_secs(1);

/// 定时器工作任务
/// Timer worker task
pub struct TimerWorker<Q: TaskQueue> {
    /// 按剩余时间排序的调度队列
    /// Schedule ordered by remaining time
    queue: DeadlineQueue,
    /// 命令接收通道
    /// Command receiver channel
    command_rx: mpsc::Receiver<ServiceCommand>,
    /// 到期任务投递到的外部队列
    /// External queue fired tasks are posted to
    task_queue: Q,
    /// 下一个分配的定时器ID
    /// Next timer ID to allocate
    next_timer_id: TimerId,
    /// 存活定时器数量上限
    /// Bound on the number of live timers
    max_timers: usize,
    /// 已触发的定时器次数
    /// Number of timer firings
    fired_timers: u64,
    /// 已取消的定时器数
    /// Number of cancelled timers
    cancelled_timers: u64,
}

impl<Q: TaskQueue> TimerWorker<Q> {
    /// 创建新的工作任务及其命令发送通道
    /// Create a new worker task and its command sender channel
    pub fn new(config: TimerConfig, task_queue: Q) -> (Self, mpsc::Sender<ServiceCommand>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);

        let worker = Self {
            queue: DeadlineQueue::new(),
            command_rx,
            task_queue,
            next_timer_id: 1,
            max_timers: config.max_timers,
            fired_timers: 0,
            cancelled_timers: 0,
        };

        (worker, command_tx)
    }

    /// 运行工作任务主循环
    /// Run the worker task main loop
    pub async fn run(mut self) {
        info!("timer worker started");

        loop {
            // 先触发所有到期定时器，再决定等待多久
            // Fire every due timer first, then decide how long to wait
            let next_deadline = self.fire_due_timers().await;
            let wake_at = next_deadline.unwrap_or_else(|| clock::now() + IDLE_RECHECK_INTERVAL);

            tokio::select! {
                maybe_command = self.command_rx.recv() => {
                    match maybe_command {
                        Some(command) => {
                            if !self.handle_command(command) {
                                break;
                            }
                        }
                        // 所有控制句柄都已消失
                        // Every control handle is gone
                        None => break,
                    }
                }

                // 最近截止时间到达（或空闲重检），回到循环顶部重新评估
                // Nearest deadline reached (or idle recheck), loop to re-evaluate
                _ = sleep_until(wake_at) => {}
            }
        }

        info!(
            fired = self.fired_timers,
            cancelled = self.cancelled_timers,
            "timer worker stopped"
        );
    }

    /// 触发所有到期的定时器，返回下一个截止时间。
    ///
    /// 每触发一个定时器就立即重新评估队首，因为触发可能改变谁最先
    /// 到期。移交任务时不持有除任务自身状态之外的任何东西。
    ///
    /// Fire every due timer and return the next deadline.
    ///
    /// The front of the schedule is re-evaluated after every firing, since
    /// firing may change who is earliest. Nothing beyond the task's own
    /// state is held across the handoff.
    async fn fire_due_timers(&mut self) -> Option<Instant> {
        loop {
            let now = clock::now();
            let (timer_id, remaining) = {
                let entry = self.queue.next_running()?;
                (entry.id, entry.remaining_at(now))
            };

            if !remaining.is_zero() {
                return Some(now + remaining);
            }

            // 到期：分离记录，周期定时器以触发后的时刻重新装载
            // Due: detach the entry; a recurring timer re-arms at the
            // post-fire time
            let Some(mut entry) = self.queue.remove(timer_id) else {
                return None;
            };
            let task = TimerTask::new(entry.id, entry.job.clone());
            if entry.recurring {
                entry.rearm(now);
                self.queue.insert(entry, now);
            }
            self.fired_timers += 1;

            // 投递失败不重试，任务归外部系统负责
            // A rejected post is not retried; the task is the external
            // system's concern
            if self.task_queue.post(task).await.is_err() {
                warn!(timer_id, "task queue rejected fired timer task");
            }
            trace!(timer_id, "timer fired");
        }
    }

    /// 处理服务命令
    /// Handle a service command
    ///
    /// # Returns
    /// 返回false表示应该关闭工作任务
    /// Returns false if the worker should shut down
    fn handle_command(&mut self, command: ServiceCommand) -> bool {
        match command {
            ServiceCommand::Schedule {
                period,
                recurring,
                job,
                response_tx,
            } => {
                let result = self.schedule_timer(period, recurring, job);
                if let Err(err) = response_tx.send(result) {
                    warn!(error = ?err, "Failed to send schedule response");
                }
            }

            ServiceCommand::Cancel {
                timer_id,
                response_tx,
            } => {
                let result = self.cancel_timer(timer_id);
                if let Err(err) = response_tx.send(result) {
                    warn!(error = ?err, "Failed to send cancel response");
                }
            }

            ServiceCommand::Pause {
                timer_id,
                response_tx,
            } => {
                let result = self.pause_timer(timer_id);
                if let Err(err) = response_tx.send(result) {
                    warn!(error = ?err, "Failed to send pause response");
                }
            }

            ServiceCommand::Resume {
                timer_id,
                response_tx,
            } => {
                let result = self.resume_timer(timer_id);
                if let Err(err) = response_tx.send(result) {
                    warn!(error = ?err, "Failed to send resume response");
                }
            }

            ServiceCommand::Reset {
                timer_id,
                period,
                response_tx,
            } => {
                let result = self.reset_timer(timer_id, period);
                if let Err(err) = response_tx.send(result) {
                    warn!(error = ?err, "Failed to send reset response");
                }
            }

            ServiceCommand::GetStats { response_tx } => {
                if let Err(err) = response_tx.send(self.stats()) {
                    warn!(error = ?err, "Failed to send stats response");
                }
            }

            ServiceCommand::Shutdown { response_tx } => {
                info!("Received shutdown command");
                let _ = response_tx.send(());
                return false;
            }
        }

        true
    }

    /// 创建定时器
    /// Create a timer
    fn schedule_timer(&mut self, period: Duration, recurring: bool, job: TimerJob) -> Result<TimerId> {
        if self.queue.len() >= self.max_timers {
            warn!(max_timers = self.max_timers, "timer capacity exhausted");
            return Err(Error::CapacityExhausted);
        }

        let timer_id = self.next_timer_id;
        self.next_timer_id += 1;

        let now = clock::now();
        self.queue
            .insert(TimerEntry::new(timer_id, period, recurring, job, now), now);

        trace!(
            timer_id,
            period_ms = period.as_millis() as u64,
            recurring,
            "timer scheduled"
        );
        Ok(timer_id)
    }

    /// 取消定时器
    /// Cancel a timer
    fn cancel_timer(&mut self, timer_id: TimerId) -> Result<()> {
        match self.queue.remove(timer_id) {
            Some(_) => {
                self.cancelled_timers += 1;
                trace!(timer_id, "timer cancelled");
                Ok(())
            }
            None => Err(Error::TimerNotFound),
        }
    }

    /// 暂停定时器；已经暂停的定时器保持原样
    /// Pause a timer; an already paused timer is left as is
    fn pause_timer(&mut self, timer_id: TimerId) -> Result<()> {
        let now = clock::now();
        let entry = self.queue.get_mut(timer_id).ok_or(Error::TimerNotFound)?;
        if entry.state == TimerState::Running {
            entry.pause(now);
            trace!(timer_id, "timer paused");
        }
        Ok(())
    }

    /// 恢复定时器；冻结的剩余时间决定它的新队列位置
    /// Resume a timer; its frozen remaining time decides its new slot
    fn resume_timer(&mut self, timer_id: TimerId) -> Result<()> {
        let now = clock::now();
        let entry = self.queue.get_mut(timer_id).ok_or(Error::TimerNotFound)?;
        if entry.state == TimerState::Paused {
            entry.resume(now);
            self.queue.reposition(timer_id, now);
            trace!(timer_id, "timer resumed");
        }
        Ok(())
    }

    /// 以新周期重新开始倒计时；运行状态保持不变
    /// Restart the countdown with a new period; the run state is unchanged
    fn reset_timer(&mut self, timer_id: TimerId, period: Duration) -> Result<()> {
        let now = clock::now();
        let entry = self.queue.get_mut(timer_id).ok_or(Error::TimerNotFound)?;
        entry.period = period;
        entry.rearm(now);
        self.queue.reposition(timer_id, now);

        trace!(
            timer_id,
            period_ms = period.as_millis() as u64,
            "timer reset"
        );
        Ok(())
    }

    /// 当前统计信息
    /// Current statistics
    fn stats(&self) -> TimerServiceStats {
        TimerServiceStats {
            live_timers: self.queue.len(),
            paused_timers: self.queue.paused_count(),
            fired_timers: self.fired_timers,
            cancelled_timers: self.cancelled_timers,
        }
    }
}
