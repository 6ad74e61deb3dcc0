//! 单调时钟适配器
//! Monotonic clock adapter
//!
//! 该模块包装了定时器服务使用的单调时间源。所有截止时间计算都通过
//! 这里进行，因此基于虚拟时间的测试工具对整个服务生效。
//!
//! This module wraps the monotonic time source used by the timer service.
//! All deadline arithmetic goes through here, so virtual-time test tooling
//! applies to the whole service.

use tokio::time::Instant;

/// Returns the current monotonic timestamp. Never decreases across calls
/// within a process lifetime.
/// 返回当前的单调时间戳。在进程生命周期内的多次调用中永不回退。
pub fn now() -> Instant {
    Instant::now()
}

/// Returns the whole milliseconds elapsed since `since`. Saturating, so the
/// result is never negative even for a timestamp taken "in the future" by a
/// caller racing the clock.
/// 返回自 `since` 以来经过的整毫秒数。饱和计算，即使调用者与时钟竞争
/// 拿到了"未来"的时间戳，结果也不会为负。
pub fn elapsed_ms(since: Instant) -> u64 {
    now().saturating_duration_since(since).as_millis() as u64
}
