//! 定时器服务控制句柄
//! Timer service control handle
//!
//! 本模块包含定时器服务的客户端句柄，提供创建、取消、暂停、恢复和
//! 重置定时器的高级接口，以及启动服务的便捷函数。
//!
//! This module contains the client handle for the timer service, providing
//! the high-level interface for creating, cancelling, pausing, resuming and
//! resetting timers, and the convenience function for starting the service.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::config::TimerConfig;
use crate::error::{Error, Result};
use crate::service::commands::{ServiceCommand, TimerServiceStats};
use crate::service::worker::TimerWorker;
use crate::task::{TaskQueue, TimerJob};
use crate::timer::TimerId;

/// 定时器服务的控制句柄。克隆即可在多个调用方之间共享。
/// Control handle for the timer service. Clone to share between callers.
#[derive(Debug, Clone)]
pub struct TimerService {
    /// 命令发送通道
    /// Command sender channel
    command_tx: mpsc::Sender<ServiceCommand>,
}

impl TimerService {
    /// 创建新的服务句柄
    /// Create a new service handle
    pub fn new(command_tx: mpsc::Sender<ServiceCommand>) -> Self {
        Self { command_tx }
    }

    /// 创建定时器：`job` 在 `period` 之后于外部任务队列上运行；
    /// `recurring` 为真时触发后重新装载。
    /// Create a timer: `job` runs on the external task queue after `period`;
    /// with `recurring` it is re-armed after firing.
    pub async fn schedule<F>(&self, period: Duration, recurring: bool, job: F) -> Result<TimerId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.schedule_job(period, recurring, TimerJob::new(job)).await
    }

    /// 创建一次性定时器
    /// Create a one-shot timer
    pub async fn set_timeout<F>(&self, delay: Duration, job: F) -> Result<TimerId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.schedule(delay, false, job).await
    }

    /// 创建周期定时器
    /// Create a recurring timer
    pub async fn set_interval<F>(&self, period: Duration, job: F) -> Result<TimerId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.schedule(period, true, job).await
    }

    async fn schedule_job(&self, period: Duration, recurring: bool, job: TimerJob) -> Result<TimerId> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::Schedule {
            period,
            recurring,
            job,
            response_tx,
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)?
    }

    /// 取消定时器。定时器已经被分离去触发时返回
    /// `Error::TimerNotFound`：已投递到外部队列的任务无法撤回，这是
    /// 一个无害的竞争而非错误。
    /// Cancel a timer. Returns `Error::TimerNotFound` when the timer was
    /// already detached for firing: a task already posted to the external
    /// queue cannot be retracted; this is a benign race, not a fault.
    pub async fn cancel(&self, timer_id: TimerId) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::Cancel {
            timer_id,
            response_tx,
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)?
    }

    /// 暂停定时器，冻结其剩余时间
    /// Pause a timer, freezing its remaining time
    pub async fn pause(&self, timer_id: TimerId) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::Pause {
            timer_id,
            response_tx,
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)?
    }

    /// 恢复暂停中的定时器
    /// Resume a paused timer
    pub async fn resume(&self, timer_id: TimerId) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::Resume {
            timer_id,
            response_tx,
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)?
    }

    /// 以新周期重新开始倒计时，下一次触发发生在本调用之后 `period`
    /// Restart the countdown; the next fire occurs `period` after this call
    pub async fn reset(&self, timer_id: TimerId, period: Duration) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::Reset {
            timer_id,
            period,
            response_tx,
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)?
    }

    /// 获取统计信息
    /// Get statistics
    pub async fn stats(&self) -> Result<TimerServiceStats> {
        let (response_tx, response_rx) = oneshot::channel();

        let command = ServiceCommand::GetStats { response_tx };

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)
    }

    /// 关闭定时器服务并等待工作任务退出。之后所有操作返回
    /// `Error::NotRunning`。
    /// Shut the service down and wait for the worker to exit. Every
    /// operation afterwards returns `Error::NotRunning`.
    pub async fn shutdown(&self) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ServiceCommand::Shutdown { response_tx })
            .await
            .map_err(|_| Error::NotRunning)?;

        response_rx.await.map_err(|_| Error::NotRunning)
    }
}

/// 启动定时器服务：每次调用生成一个独立的工作任务，句柄通过克隆共享
/// Start the timer service: each call spawns one worker task; share the
/// handle by cloning it
pub fn start_timer_service<Q: TaskQueue>(config: TimerConfig, task_queue: Q) -> TimerService {
    let (worker, command_tx) = TimerWorker::new(config, task_queue);
    let service = TimerService::new(command_tx);

    tokio::spawn(async move {
        worker.run().await;
    });

    info!("Timer service started");
    service
}
