//! 定时器任务与外部任务队列定义
//! Timer task and external task queue definitions
//!
//! 该模块定义了到期定时器产生的任务值，以及把任务移交给宿主执行队列
//! 的接口。服务本身从不执行任务。
//!
//! This module defines the task value produced by an expired timer and the
//! seam through which it is handed to the host's execution queue. The
//! service itself never runs tasks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::timer::TimerId;

/// A cloneable unit of work owned by a timer. Recurring timers fire the same
/// job on every expiry, so the job is shared rather than consumed.
/// 定时器拥有的可克隆工作单元。周期定时器每次到期都触发同一个任务，
/// 因此任务是共享而非消耗的。
#[derive(Clone)]
pub struct TimerJob {
    func: Arc<dyn Fn() + Send + Sync + 'static>,
}

impl TimerJob {
    /// 从闭包创建工作单元
    /// Create a unit of work from a closure
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// 执行工作单元
    /// Run the unit of work
    pub fn run(&self) {
        (self.func)();
    }
}

impl fmt::Debug for TimerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerJob").field("func", &"<closure>").finish()
    }
}

/// A fired timer's work, ready to be run by the host.
/// 已触发定时器的工作，可由宿主执行。
#[derive(Debug, Clone)]
pub struct TimerTask {
    /// 产生该任务的定时器ID
    /// ID of the timer that produced this task
    pub timer_id: TimerId,
    /// 要执行的工作单元
    /// The unit of work to run
    pub job: TimerJob,
}

impl TimerTask {
    /// 创建新的定时器任务
    /// Create a new timer task
    pub fn new(timer_id: TimerId, job: TimerJob) -> Self {
        Self { timer_id, job }
    }

    /// 执行任务
    /// Run the task
    pub fn run(&self) {
        self.job.run();
    }
}

impl fmt::Display for TimerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerTask(timer_id: {})", self.timer_id)
    }
}

/// The external task queue the worker posts fired work to. Implementations
/// must be callable from the worker without any lock owned by this crate.
/// 工作任务把到期工作投递到的外部任务队列。实现必须能在不持有本库任何
/// 锁的情况下被工作任务调用。
#[async_trait]
pub trait TaskQueue: Send + Sync + 'static {
    /// 投递一个已触发的任务。返回 `Err` 表示队列拒绝了任务。
    /// Post a fired task. `Err` means the queue rejected it.
    async fn post(&self, task: TimerTask) -> Result<(), ()>;
}

/// 基于 mpsc::Sender 的任务队列实现
/// mpsc::Sender-based task queue implementation
#[derive(Debug, Clone)]
pub struct SenderQueue {
    sender: mpsc::Sender<TimerTask>,
}

impl SenderQueue {
    /// 创建新的发送者任务队列
    /// Create a new sender task queue
    pub fn new(sender: mpsc::Sender<TimerTask>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl TaskQueue for SenderQueue {
    async fn post(&self, task: TimerTask) -> Result<(), ()> {
        // 使用 try_send 避免阻塞工作任务，发送失败只记录警告
        // Use try_send so the worker is never blocked, log a warning on failure
        if let Err(e) = self.sender.try_send(task) {
            tracing::warn!("Failed to post timer task: {:?}", e);
            return Err(());
        }
        Ok(())
    }
}

/// 空任务队列实现（用于测试或不需要投递任务的场景）
/// No-op task queue implementation (for testing or scenarios where posting is not needed)
#[derive(Debug, Clone, Default)]
pub struct NoOpQueue;

impl NoOpQueue {
    /// 创建新的空任务队列
    /// Create a new no-op task queue
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskQueue for NoOpQueue {
    async fn post(&self, _task: TimerTask) -> Result<(), ()> {
        // 什么都不做
        // Do nothing
        Ok(())
    }
}
