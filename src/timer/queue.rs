//! 按剩余触发时间排序的调度队列实现
//! Schedule implementation ordered by remaining time to fire

use std::collections::VecDeque;

use tokio::time::Instant;
use tracing::trace;

use crate::timer::entry::{TimerEntry, TimerId, TimerState};

/// 按剩余触发时间排序的定时器调度队列。
///
/// 顺序不变量：运行中的定时器之间，队列顺序即剩余时间顺序。剩余时间
/// 相同的定时器保持插入顺序（先插入者先触发）。暂停中的定时器保留
/// 原位置并被查找跳过，在恢复或重置时重新定位。
///
/// 查找和插入是线性扫描。注册表规模预期很小，O(n) 是刻意的简单性
/// 取舍。
///
/// The timer schedule ordered by remaining time to fire.
///
/// Ordering invariant: among Running timers, queue order equals
/// remaining-time order. Timers with equal remaining time keep their
/// insertion order (first inserted fires first). Paused timers keep their
/// position, are skipped by lookups, and are repositioned on resume/reset.
///
/// Lookup and insertion are linear scans. The registry is expected to stay
/// small; O(n) is a deliberate simplicity trade-off.
#[derive(Debug, Default)]
pub struct DeadlineQueue {
    entries: VecDeque<TimerEntry>,
}

impl DeadlineQueue {
    /// 创建空的调度队列
    /// Create an empty schedule
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// 当前存活定时器数量
    /// Number of live timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 队列是否为空
    /// Whether the schedule is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 暂停中的定时器数量
    /// Number of paused timers
    pub fn paused_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == TimerState::Paused)
            .count()
    }

    /// 有序插入：插入到第一个剩余时间严格更长的记录之前，因此剩余
    /// 时间相同的记录保持已有顺序，新记录排在它们之后。
    /// Ordered insertion: immediately before the first entry whose remaining
    /// time is strictly greater, so entries with equal remaining time keep
    /// their existing order and the new entry lands after them.
    pub fn insert(&mut self, entry: TimerEntry, now: Instant) {
        let remaining = entry.remaining_at(now);
        let position = self
            .entries
            .iter()
            .position(|e| e.remaining_at(now) > remaining)
            .unwrap_or(self.entries.len());

        trace!(
            timer_id = entry.id,
            remaining_ms = remaining.as_millis() as u64,
            position,
            "timer inserted into schedule"
        );
        self.entries.insert(position, entry);
    }

    /// 按ID分离一条记录
    /// Detach an entry by id
    pub fn remove(&mut self, id: TimerId) -> Option<TimerEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(position)
    }

    /// 按ID查找记录
    /// Look up an entry by id
    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// 队列中是否存在该ID
    /// Whether the schedule contains the id
    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// 距离队首最近的运行中定时器；暂停中的记录被跳过但不被移除
    /// The Running timer nearest the front; Paused entries are skipped
    /// without being removed
    pub fn next_running(&self) -> Option<&TimerEntry> {
        self.entries.iter().find(|e| e.state == TimerState::Running)
    }

    /// 剩余时间变化后重新定位一条记录
    /// Reposition an entry after its remaining time changed
    pub fn reposition(&mut self, id: TimerId, now: Instant) {
        if let Some(entry) = self.remove(id) {
            self.insert(entry, now);
        }
    }

    /// 以队列顺序遍历记录
    /// Iterate entries in schedule order
    pub fn iter(&self) -> impl Iterator<Item = &TimerEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TimerJob;
    use std::time::Duration;

    fn entry(id: TimerId, period_ms: u64, now: Instant) -> TimerEntry {
        TimerEntry::new(id, Duration::from_millis(period_ms), false, TimerJob::new(|| {}), now)
    }

    fn ids(queue: &DeadlineQueue) -> Vec<TimerId> {
        queue.iter().map(|e| e.id).collect()
    }

    #[test]
    fn insert_orders_by_remaining_time() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 300, now), now);
        queue.insert(entry(2, 100, now), now);
        queue.insert(entry(3, 200, now), now);

        assert_eq!(ids(&queue), vec![2, 3, 1]);
    }

    #[test]
    fn equal_remaining_preserves_insertion_order() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 100, now), now);
        queue.insert(entry(2, 100, now), now);
        queue.insert(entry(3, 100, now), now);

        assert_eq!(ids(&queue), vec![1, 2, 3]);
    }

    #[test]
    fn equal_remaining_lands_after_existing_shorter_and_before_longer() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 50, now), now);
        queue.insert(entry(2, 200, now), now);
        queue.insert(entry(3, 50, now), now);

        assert_eq!(ids(&queue), vec![1, 3, 2]);
    }

    #[test]
    fn remove_detaches_by_id() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 100, now), now);
        queue.insert(entry(2, 200, now), now);

        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(!queue.contains(1));
        assert_eq!(queue.len(), 1);
        assert!(queue.remove(1).is_none());
    }

    #[test]
    fn next_running_skips_paused_entries() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 100, now), now);
        queue.insert(entry(2, 200, now), now);

        queue.get_mut(1).unwrap().pause(now);

        assert_eq!(queue.next_running().unwrap().id, 2);
        assert_eq!(queue.paused_count(), 1);
        // 暂停的记录留在队列中
        // The paused entry stays in the schedule
        assert!(queue.contains(1));
    }

    #[test]
    fn next_running_is_none_when_all_paused() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 100, now), now);
        queue.get_mut(1).unwrap().pause(now);

        assert!(queue.next_running().is_none());
    }

    #[test]
    fn reposition_moves_entry_to_its_new_slot() {
        let now = Instant::now();
        let mut queue = DeadlineQueue::new();

        queue.insert(entry(1, 100, now), now);
        queue.insert(entry(2, 200, now), now);

        // 暂停1号计时器，等其冻结的剩余时间落后于2号后恢复
        // Pause timer 1 and resume it once its frozen remaining time lags timer 2
        queue.get_mut(1).unwrap().pause(now);
        let later = now + Duration::from_millis(150);
        queue.get_mut(1).unwrap().resume(later);
        queue.reposition(1, later);

        // 2号剩余50ms，1号剩余100ms
        // Timer 2 has 50ms left, timer 1 has 100ms left
        assert_eq!(ids(&queue), vec![2, 1]);
    }
}
