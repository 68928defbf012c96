//! Per-period write guards.
//!
//! Any write whose legality depends on a month record's lock state runs while holding
//! that record's guard, so `lock`/`unlock` cannot land between the lock check and the
//! write. Guards are acquired before a database transaction begins and never while one
//! is open: a task parked on a guard must not pin a pooled connection.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = DashMap<i64, Arc<Mutex<()>>>;

/// Registry of async mutexes keyed by month record id.
///
/// A slot only lives while some guard holds or waits on it; the last guard to release
/// a period removes its slot.
#[derive(Debug, Default)]
pub struct PeriodGuards {
    slots: Arc<Slots>,
}

/// Exclusive access to one or more month records, released on drop.
#[derive(Debug)]
pub struct PeriodGuard {
    month_record_ids: Vec<i64>,
    held: Vec<OwnedMutexGuard<()>>,
    slots: Arc<Slots>,
}

impl PeriodGuard {
    /// Ids covered by this guard, ascending and deduplicated.
    #[must_use]
    pub fn month_record_ids(&self) -> &[i64] {
        &self.month_record_ids
    }
}

impl Drop for PeriodGuard {
    fn drop(&mut self) {
        self.held.clear();
        // Count 1 is the map's own handle: nobody holds or awaits the slot.
        for id in &self.month_record_ids {
            self.slots
                .remove_if(id, |_, slot| Arc::strong_count(slot) == 1);
        }
    }
}

impl PeriodGuards {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The DashMap shard lock is released before the caller awaits the mutex.
    fn slot(&self, month_record_id: i64) -> Arc<Mutex<()>> {
        Arc::clone(self.slots.entry(month_record_id).or_default().value())
    }

    /// Number of periods currently guarded or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no period is guarded or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Waits for exclusive access to a single month record.
    pub async fn acquire(&self, month_record_id: i64) -> PeriodGuard {
        self.acquire_many(&[month_record_id]).await
    }

    /// Waits for exclusive access to several month records.
    ///
    /// Ids are locked in ascending order so two callers covering overlapping sets
    /// cannot deadlock. If the returned future is dropped early, the periods already
    /// taken are released and pruned like a normal guard.
    pub async fn acquire_many(&self, month_record_ids: &[i64]) -> PeriodGuard {
        let mut ids = month_record_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guard = PeriodGuard {
            held: Vec::with_capacity(ids.len()),
            month_record_ids: ids,
            slots: Arc::clone(&self.slots),
        };
        for index in 0..guard.month_record_ids.len() {
            let slot = self.slot(guard.month_record_ids[index]);
            guard.held.push(slot.lock_owned().await);
        }
        guard
    }
}
