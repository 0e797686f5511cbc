//! Hazard slots protecting arena indices from recycling.
//!
//! A [`HazardDomain`] owns a fixed array of [`HazardSlot`]s, one per
//! expected concurrent worker. A thread protects an index by leasing a slot
//! (starting from the slot its thread id hashes to), publishing the index
//! there, and then re-validating the target. Reclaimers scan every slot
//! before handing a deallocated index back to the free list.
//!
//! All publish and scan accesses are `SeqCst`: the protector stores the
//! hazard and then loads the slot tag; the reclaimer flips the tag and then
//! loads the hazards. In every interleaving at least one side sees the
//! other's write, so a verified index is never recycled.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use hedge_core::{EdgeIndex, INVALID_INDEX};

/// Spin iterations before a contended lease starts yielding the thread.
const SPIN_BEFORE_YIELD: u32 = 64;

thread_local! {
    static THREAD_HASH: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Stable per-thread hash of the current thread's id.
fn thread_hash() -> u64 {
    THREAD_HASH.with(|cell| {
        if let Some(h) = cell.get() {
            return h;
        }
        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        let h = hasher.finish();
        cell.set(Some(h));
        h
    })
}

/// One published hazard, padded to avoid false sharing.
///
/// Reclaimers read every slot on each deallocation; without padding,
/// neighbouring workers' publishes would invalidate each other's lines.
/// 128-byte alignment covers both 64-byte and 128-byte cache lines.
#[repr(align(128))]
pub struct HazardSlot {
    /// Whether a [`HazardLease`] currently owns this slot.
    owned: AtomicBool,
    /// Protected index, or `INVALID_INDEX`.
    protected: AtomicU32,
}

// Compile-time assertion: HazardSlot must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<HazardSlot>();
};

impl HazardSlot {
    fn new() -> Self {
        Self {
            owned: AtomicBool::new(false),
            protected: AtomicU32::new(INVALID_INDEX),
        }
    }

    /// The index this slot currently publishes.
    pub fn protected(&self) -> Option<EdgeIndex> {
        EdgeIndex::unpack(self.protected.load(Ordering::SeqCst))
    }

    /// Whether a lease owns this slot.
    pub fn is_owned(&self) -> bool {
        self.owned.load(Ordering::Acquire)
    }
}

/// The set of hazard slots shared by one arena.
pub struct HazardDomain {
    slots: Box<[HazardSlot]>,
    /// Lease attempts that found the preferred slot taken.
    contended: AtomicU64,
}

impl HazardDomain {
    /// Create a domain with `count` slots (at least one).
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count.max(1)).map(|_| HazardSlot::new()).collect(),
            contended: AtomicU64::new(0),
        }
    }

    /// Number of hazard slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a domain has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot the calling thread tries first.
    pub fn home_slot(&self) -> usize {
        (thread_hash() % self.slots.len() as u64) as usize
    }

    /// Lease a slot, probing from the calling thread's home slot.
    ///
    /// Spins (then yields) while every slot is leased. Never fails, but a
    /// thread that holds every lease and asks for another will spin
    /// forever.
    pub fn acquire(&self) -> HazardLease<'_> {
        let n = self.slots.len();
        let home = self.home_slot();
        let mut spins = 0u32;
        loop {
            for step in 0..n {
                let i = (home + step) % n;
                if self.slots[i]
                    .owned
                    .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    if step > 0 || spins > 0 {
                        self.contended.fetch_add(1, Ordering::Relaxed);
                    }
                    return HazardLease {
                        domain: self,
                        slot: i,
                    };
                }
            }
            spins = spins.saturating_add(1);
            if spins == SPIN_BEFORE_YIELD {
                tracing::trace!(slots = n, "all hazard slots leased, yielding");
            }
            if spins < SPIN_BEFORE_YIELD {
                std::hint::spin_loop();
            } else {
                std::thread::yield_now();
            }
        }
    }

    /// Whether any slot currently publishes `index`.
    pub fn is_protected(&self, index: EdgeIndex) -> bool {
        self.slots
            .iter()
            .any(|s| s.protected.load(Ordering::SeqCst) == index.0)
    }

    /// Number of slots that currently publish an index.
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.protected.load(Ordering::SeqCst) != INVALID_INDEX)
            .count()
    }

    /// Cumulative number of leases that could not use the home slot.
    pub fn contended_leases(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }

    /// Read-only view of the slots, for diagnostics.
    pub fn slots(&self) -> &[HazardSlot] {
        &self.slots
    }
}

/// Exclusive ownership of one hazard slot.
///
/// Dropping the lease clears the published index and releases the slot.
pub struct HazardLease<'a> {
    domain: &'a HazardDomain,
    slot: usize,
}

impl HazardLease<'_> {
    /// Publish `index` as protected, replacing any previous index.
    pub fn publish(&self, index: EdgeIndex) {
        self.entry().protected.store(index.0, Ordering::SeqCst);
    }

    /// Stop protecting without releasing the slot.
    pub fn clear(&self) {
        self.entry().protected.store(INVALID_INDEX, Ordering::SeqCst);
    }

    /// The index this lease publishes.
    pub fn protected(&self) -> Option<EdgeIndex> {
        self.entry().protected()
    }

    /// Position of the leased slot within the domain.
    pub fn slot_index(&self) -> usize {
        self.slot
    }

    fn entry(&self) -> &HazardSlot {
        &self.domain.slots[self.slot]
    }
}

impl Drop for HazardLease<'_> {
    fn drop(&mut self) {
        let entry = self.entry();
        entry.protected.store(INVALID_INDEX, Ordering::SeqCst);
        entry.owned.store(false, Ordering::Release);
    }
}
