//! 定时器服务集成测试
//! Timer service integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use metronome::{
    Error, SenderQueue, TimerConfig, TimerService, TimerTask, start_timer_service,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn start_service() -> (TimerService, mpsc::Receiver<TimerTask>) {
    init_tracing();
    let (task_tx, task_rx) = mpsc::channel(64);
    let service = start_timer_service(TimerConfig::default(), SenderQueue::new(task_tx));
    (service, task_rx)
}

#[tokio::test(start_paused = true)]
async fn one_shot_round_trip() {
    let (service, mut task_rx) = start_service();

    let counter = Arc::new(AtomicUsize::new(0));
    let job_counter = counter.clone();
    let timer_id = service
        .set_timeout(Duration::from_millis(50), move || {
            job_counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    sleep(Duration::from_millis(60)).await;

    let task = task_rx.recv().await.unwrap();
    assert_eq!(task.timer_id, timer_id);
    task.run();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // 定时器触发后已被丢弃
    // The timer was discarded after firing
    assert_eq!(service.cancel(timer_id).await, Err(Error::TimerNotFound));
    let stats = service.stats().await.unwrap();
    assert_eq!(stats.live_timers, 0);
    assert_eq!(stats.fired_timers, 1);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn recurring_timer_keeps_pace_over_a_window() {
    let (service, mut task_rx) = start_service();

    let period = Duration::from_millis(50);
    let window = Duration::from_millis(500);
    let timer_id = service.set_interval(period, || {}).await.unwrap();

    sleep(window).await;
    service.cancel(timer_id).await.unwrap();

    let mut fired = 0usize;
    while task_rx.try_recv().is_ok() {
        fired += 1;
    }

    // 至少 ⌊T/p⌋ − 1 次，允许一个调度单位的偏差
    // At least ⌊T/p⌋ − 1 fires, allowing one unit of scheduling slack
    let expected = (window.as_millis() / period.as_millis()) as usize;
    assert!(
        fired >= expected - 1,
        "expected at least {} fires, got {}",
        expected - 1,
        fired
    );

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn same_instant_schedules_fire_shortest_first() {
    let (service, mut task_rx) = start_service();

    let mut scheduled = Vec::new();
    for period_ms in [100u64, 200, 200, 300] {
        let id = service
            .set_timeout(Duration::from_millis(period_ms), || {})
            .await
            .unwrap();
        scheduled.push(id);
    }

    let mut fired = Vec::new();
    for _ in 0..scheduled.len() {
        fired.push(task_rx.recv().await.unwrap().timer_id);
    }

    // 周期更短者先触发，相同周期按创建顺序
    // Shorter periods fire first, equal periods in creation order
    assert_eq!(fired, scheduled);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn concurrent_schedules_get_distinct_ids() {
    let (service, mut task_rx) = start_service();

    let handles: Vec<_> = [Duration::from_millis(100), Duration::from_millis(200)]
        .into_iter()
        .map(|period| {
            let service = service.clone();
            tokio::spawn(async move { service.set_timeout(period, || {}).await.unwrap() })
        })
        .collect();

    let ids = futures::future::join_all(handles).await;
    let fast = *ids[0].as_ref().unwrap();
    let slow = *ids[1].as_ref().unwrap();
    assert_ne!(fast, slow);

    // 周期更短的定时器严格先被观察到
    // The shorter-period timer is observed strictly first
    assert_eq!(task_rx.recv().await.unwrap().timer_id, fast);
    assert_eq!(task_rx.recv().await.unwrap().timer_id, slow);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_preserve_remaining_time() {
    let (service, mut task_rx) = start_service();

    let timer_id = service.set_timeout(Duration::from_millis(200), || {}).await.unwrap();

    sleep(Duration::from_millis(80)).await;
    service.pause(timer_id).await.unwrap();
    sleep(Duration::from_millis(500)).await;
    assert!(task_rx.try_recv().is_err());

    service.resume(timer_id).await.unwrap();
    sleep(Duration::from_millis(120)).await;
    assert_eq!(task_rx.recv().await.unwrap().timer_id, timer_id);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_a_live_recurring_timer() {
    let (service, mut task_rx) = start_service();

    let timer_id = service.set_interval(Duration::from_millis(50), || {}).await.unwrap();
    assert_eq!(task_rx.recv().await.unwrap().timer_id, timer_id);

    service.shutdown().await.unwrap();

    sleep(Duration::from_millis(300)).await;
    assert!(task_rx.try_recv().is_err());
    assert_eq!(
        service.set_interval(Duration::from_millis(50), || {}).await,
        Err(Error::NotRunning)
    );
}

#[tokio::test]
async fn timer_fires_under_real_time() {
    let (service, mut task_rx) = start_service();

    let timer_id = service.set_timeout(Duration::from_millis(50), || {}).await.unwrap();

    let task = tokio::time::timeout(Duration::from_secs(2), task_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.timer_id, timer_id);

    service.shutdown().await.unwrap();
}
