//! Point-in-time arena counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Occupancy and event counters for a [`SlotArena`](crate::SlotArena).
///
/// Occupancy fields are sampled, not read under one lock, so under
/// concurrent use `live + free + retired` may briefly differ from
/// `committed_slots`. Cumulative counters only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Blocks appended so far.
    pub committed_blocks: usize,
    /// Slots across all committed blocks.
    pub committed_slots: usize,
    /// Slots currently allocated.
    pub live: usize,
    /// Slots ready for reuse.
    pub free: usize,
    /// Deallocated slots still waiting on a hazard.
    pub retired: usize,
    /// Cumulative successful `allocate()` calls.
    pub allocations: u64,
    /// Cumulative successful `deallocate()` calls.
    pub deallocations: u64,
    /// Cumulative block appends.
    pub growth_events: u64,
    /// Cumulative deallocations parked because a hazard covered the slot.
    pub deferred_reclaims: u64,
    /// Cumulative hazard leases that could not use the home slot.
    pub contended_leases: u64,
}

/// Relaxed atomic counters behind [`ArenaStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) allocations: AtomicU64,
    pub(crate) deallocations: AtomicU64,
    pub(crate) growth_events: AtomicU64,
    pub(crate) deferred_reclaims: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
