//! ==============================================================================
//! event_log.rs - bounded history of rfid reads
//! ==============================================================================
//!
//! purpose:
//!     keeps the most recent N reads (50 by default) in arrival order.
//!     this is the only shared mutable state in the service.
//!
//! concurrency:
//!     one tokio RwLock guards the whole deque. appends and clears take the
//!     write half, snapshots and counts take the read half, so a reader never
//!     sees a half-finished append or clear. nothing awaits while the lock
//!     is held.
//!
//! relationships:
//!     - used by: handlers.rs (every api operation)
//!     - owned by: server.rs (AppState, cloned into each request)
//!
//! ==============================================================================

use crate::domain::{EventRecord, Order};

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// default number of reads kept
pub const DEFAULT_CAPACITY: usize = 50;

/// fixed-capacity fifo of event records
///
/// cheap to clone: clones share the same history.
#[derive(Clone, Debug)]
pub struct BoundedEventLog {
    records: Arc<RwLock<VecDeque<EventRecord>>>,
    capacity: usize,
}

impl Default for BoundedEventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BoundedEventLog {
    /// create an empty log; a zero capacity is bumped to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// add a record as the newest entry and return the new count
    ///
    /// when the log is full the oldest record is dropped first, so the
    /// length never goes above capacity, not even inside the lock.
    pub async fn append(&self, record: EventRecord) -> usize {
        let mut records = self.records.write().await;
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
        records.len()
    }

    /// independent copy of the current records in the requested order
    pub async fn snapshot(&self, order: Order) -> Vec<EventRecord> {
        let records = self.records.read().await;
        ordered(&records, order)
    }

    /// count and snapshot taken under the same read guard
    pub async fn counted_snapshot(&self, order: Order) -> (usize, Vec<EventRecord>) {
        let records = self.records.read().await;
        (records.len(), ordered(&records, order))
    }

    /// drop every record
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

fn ordered(records: &VecDeque<EventRecord>, order: Order) -> Vec<EventRecord> {
    match order {
        Order::OldestFirst => records.iter().cloned().collect(),
        Order::NewestFirst => records.iter().rev().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(n: usize) -> EventRecord {
        EventRecord {
            recorded_at: "10:00:00".into(),
            uid_hex: format!("{:08X}", n),
            uid_dec: n.to_string(),
            device: "ESP32".into(),
        }
    }

    #[tokio::test]
    async fn append_returns_running_count() {
        let log = BoundedEventLog::default();

        assert_eq!(log.append(read(1)).await, 1);
        assert_eq!(log.append(read(2)).await, 2);
        assert_eq!(log.count().await, 2);
    }

    #[tokio::test]
    async fn never_exceeds_capacity_and_evicts_oldest() {
        let log = BoundedEventLog::default();

        for n in 0..DEFAULT_CAPACITY {
            log.append(read(n)).await;
        }
        assert_eq!(log.count().await, 50);

        // 51st read pushes out read 0 and nothing else
        assert_eq!(log.append(read(50)).await, 50);
        let all = log.snapshot(Order::OldestFirst).await;
        assert_eq!(all.first().unwrap().uid_dec, "1");
        assert_eq!(all.last().unwrap().uid_dec, "50");

        for n in 51..200 {
            assert!(log.append(read(n)).await <= 50);
        }
        let all = log.snapshot(Order::OldestFirst).await;
        assert_eq!(all.len(), 50);
        assert_eq!(all.first().unwrap().uid_dec, "150");
    }

    #[tokio::test]
    async fn newest_first_is_exact_reverse() {
        let log = BoundedEventLog::new(5);
        for n in 0..8 {
            log.append(read(n)).await;
        }

        let oldest = log.snapshot(Order::OldestFirst).await;
        let mut newest = log.snapshot(Order::NewestFirst).await;
        newest.reverse();

        assert_eq!(oldest, newest);
        let decs: Vec<_> = oldest.iter().map(|r| r.uid_dec.as_str()).collect();
        assert_eq!(decs, ["3", "4", "5", "6", "7"]);
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let log = BoundedEventLog::default();
        log.append(read(7)).await;
        log.append(read(7)).await;
        log.append(read(7)).await;

        assert_eq!(log.count().await, 3);
    }

    #[tokio::test]
    async fn snapshot_is_independent_of_later_writes() {
        let log = BoundedEventLog::default();
        log.append(read(1)).await;

        let before = log.snapshot(Order::OldestFirst).await;
        log.append(read(2)).await;
        log.clear().await;

        assert_eq!(before.len(), 1);
        assert!(log.snapshot(Order::NewestFirst).await.is_empty());
    }

    #[tokio::test]
    async fn clear_then_accumulate_again() {
        let log = BoundedEventLog::default();
        log.append(read(1)).await;
        log.clear().await;
        log.clear().await;
        assert_eq!(log.count().await, 0);

        assert_eq!(log.append(read(2)).await, 1);
        assert_eq!(log.snapshot(Order::OldestFirst).await[0].uid_dec, "2");
    }

    #[tokio::test]
    async fn zero_capacity_is_bumped() {
        let log = BoundedEventLog::new(0);
        assert_eq!(log.capacity(), 1);

        log.append(read(1)).await;
        log.append(read(2)).await;
        assert_eq!(log.snapshot(Order::OldestFirst).await[0].uid_dec, "2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_a_consistent_window() {
        let log = BoundedEventLog::default();

        let mut tasks = Vec::new();
        for n in 0..100usize {
            let log = log.clone();
            tasks.push(tokio::spawn(async move {
                let mut r = read(n);
                r.device = format!("ESP32-{}", n % 4);
                let total = log.append(r).await;
                assert!(total <= DEFAULT_CAPACITY);
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let (total, all) = log.counted_snapshot(Order::OldestFirst).await;
        assert_eq!(total, 50);
        assert_eq!(all.len(), 50);

        let mut seen: Vec<usize> = all.iter().map(|r| r.uid_dec.parse().unwrap()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 50);
        for r in &all {
            let n: usize = r.uid_dec.parse().unwrap();
            assert_eq!(r.uid_hex, format!("{:08X}", n));
            assert_eq!(r.device, format!("ESP32-{}", n % 4));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn snapshots_during_appends_are_always_whole() {
        let log = BoundedEventLog::default();

        let mut writers = Vec::new();
        for n in 0..200usize {
            let log = log.clone();
            writers.push(tokio::spawn(async move {
                log.append(read(n)).await;
            }));
        }

        let mut readers = Vec::new();
        for _ in 0..8 {
            let log = log.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let (total, all) = log.counted_snapshot(Order::NewestFirst).await;
                    assert_eq!(total, all.len());
                    assert!(total <= DEFAULT_CAPACITY);
                    for r in &all {
                        let n: usize = r.uid_dec.parse().unwrap();
                        assert_eq!(r.uid_hex, format!("{:08X}", n));
                        assert_eq!(r.recorded_at, "10:00:00");
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        for t in writers.into_iter().chain(readers) {
            t.await.unwrap();
        }
        assert_eq!(log.count().await, 50);
    }
}
