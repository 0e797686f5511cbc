//! The concurrent slot arena.
//!
//! [`SlotArena`] ties together the block directory (storage), the recycle
//! bin (free and retired indices, behind a `Mutex`) and the hazard domain
//! (protection against recycling). All operations take `&self`; share the
//! arena across threads with `Arc`.
//!
//! # Slot lifecycle
//!
//! ```text
//!   grow() ──► free ──allocate()──► allocated(g) ──deallocate()──► free(g)
//!               ▲                                                    │
//!               │                 no hazard publishes the index      │
//!               └──────────── promote() ◄── retired ◄────────────────┘
//!                                          (hazard still set)
//! ```

use std::ops::Deref;
use std::sync::atomic::{fence, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hedge_core::EdgeIndex;

use crate::block::{BlockDirectory, EdgeSlot};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, HandleFault};
use crate::handle::{EdgeHandle, SlotTag};
use crate::hazard::{HazardDomain, HazardLease};
use crate::record::HalfEdgeRecord;
use crate::recycle::RecycleBin;
use crate::stats::{ArenaStats, Counters};

/// Block-structured pool of [`HalfEdgeRecord`]s with hazard-protected reuse.
pub struct SlotArena {
    blocks: BlockDirectory,
    bin: Mutex<RecycleBin>,
    hazards: HazardDomain,
    live: AtomicUsize,
    counters: Counters,
}

// Compile-time assertion: SlotArena must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SlotArena>();
};

impl SlotArena {
    /// Create an arena from a validated config.
    ///
    /// Commits `prealloc_blocks` blocks up front; everything else is
    /// appended lazily when the free list runs dry.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let hazard_slots = config.resolved_hazard_slots();
        let arena = Self {
            blocks: BlockDirectory::new(config.block_capacity, config.max_blocks),
            bin: Mutex::new(RecycleBin::new()),
            hazards: HazardDomain::new(hazard_slots),
            live: AtomicUsize::new(0),
            counters: Counters::default(),
        };
        {
            let mut bin = arena.lock_bin();
            for _ in 0..config.prealloc_blocks {
                let range = arena.blocks.grow()?;
                bin.extend_fresh(range);
                Counters::bump(&arena.counters.growth_events);
            }
        }
        tracing::debug!(
            block_capacity = config.block_capacity,
            max_blocks = config.max_blocks,
            hazard_slots,
            prealloc_blocks = config.prealloc_blocks,
            "slot arena created"
        );
        Ok(arena)
    }

    fn lock_bin(&self) -> MutexGuard<'_, RecycleBin> {
        // The bin is plain data and never left half-updated by a panic.
        self.bin.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a slot whose record has every link unset.
    ///
    /// Reuses a free index if one exists, then tries to promote retired
    /// indices whose hazards have cleared, and only then appends a block.
    /// Fails only with [`ArenaError::PoolGrowthFailure`].
    pub fn allocate(&self) -> Result<EdgeHandle, ArenaError> {
        let index = {
            let mut bin = self.lock_bin();
            loop {
                if let Some(index) = bin.pop_free() {
                    break index;
                }
                if bin.retired_len() > 0 && bin.promote(|i| self.hazards.is_protected(i)) > 0 {
                    continue;
                }
                let range = self.blocks.grow().inspect_err(|err| {
                    tracing::warn!(error = %err, live = self.live.load(Ordering::Relaxed), "slot arena exhausted");
                })?;
                tracing::debug!(
                    block = self.blocks.block_count() - 1,
                    first_index = range.start,
                    "appended slot block"
                );
                Counters::bump(&self.counters.growth_events);
                bin.extend_fresh(range);
            }
        };

        let slot = self.blocks.slot(index)?;
        let tag = slot.tag(Ordering::Acquire).next_allocation();
        debug_assert!(slot.record.is_unset(), "recycled slot {index} was not reset");
        slot.record.set_slot(index);
        slot.store_tag(tag, Ordering::SeqCst);

        self.live.fetch_add(1, Ordering::Relaxed);
        Counters::bump(&self.counters.allocations);
        Ok(EdgeHandle::new(index, tag.generation()))
    }

    /// Return a slot to the pool.
    ///
    /// The record's links are reset before the index becomes reusable. If a
    /// hazard slot still publishes the index, it is parked until a later
    /// scan finds it unprotected. Double frees and stale handles are
    /// rejected with [`ArenaError::InvalidHandle`].
    pub fn deallocate(&self, handle: EdgeHandle) -> Result<(), ArenaError> {
        let slot = self.blocks.slot(handle.index)?;
        slot.swap_tag(
            SlotTag::allocated(handle.generation),
            SlotTag::free(handle.generation),
        )
        .map_err(|observed| fault_for(handle, observed))?;
        slot.record.reset();

        // Tag is flipped first, so a protector that publishes after this
        // scan fails its own verification.
        let protected = self.hazards.is_protected(handle.index);
        {
            let mut bin = self.lock_bin();
            if protected {
                bin.retire(handle.index);
            } else {
                bin.push_free(handle.index);
            }
        }
        if protected {
            Counters::bump(&self.counters.deferred_reclaims);
            tracing::trace!(index = %handle.index, "reclaim deferred by hazard");
        }

        self.live.fetch_sub(1, Ordering::Relaxed);
        Counters::bump(&self.counters.deallocations);
        Ok(())
    }

    /// Low-level access to the record at `index`.
    ///
    /// Bounds-checked against the committed blocks and rejected if the slot
    /// is free. No generation check and no protection: the caller must know
    /// the slot cannot be recycled meanwhile (single owner, or an active
    /// [`Protected`] guard).
    pub fn resolve(&self, index: EdgeIndex) -> Result<&HalfEdgeRecord, ArenaError> {
        let slot = self.blocks.slot(index)?;
        if !slot.tag(Ordering::Acquire).is_allocated() {
            return Err(ArenaError::invalid(index, HandleFault::NotAllocated));
        }
        Ok(&slot.record)
    }

    /// Generation-checked access to the record behind `handle`.
    pub fn get(&self, handle: EdgeHandle) -> Result<&HalfEdgeRecord, ArenaError> {
        let slot = self.checked_slot(handle)?;
        Ok(&slot.record)
    }

    /// Current handle of an allocated slot, or `None` if the index is out
    /// of range or free.
    pub fn handle_at(&self, index: EdgeIndex) -> Option<EdgeHandle> {
        let tag = self.blocks.slot(index).ok()?.tag(Ordering::Acquire);
        tag.is_allocated()
            .then(|| EdgeHandle::new(index, tag.generation()))
    }

    /// Whether `handle` still names the live occupancy of its slot.
    pub fn is_allocated(&self, handle: EdgeHandle) -> bool {
        self.checked_slot(handle).is_ok()
    }

    /// Protect `handle` against recycling for the lifetime of the guard.
    ///
    /// Leases a hazard slot, publishes the index, then re-validates that
    /// the slot still holds the same occupancy. Fails with
    /// [`ArenaError::InvalidHandle`] if it does not; the hazard is cleared
    /// in that case.
    ///
    /// A protected record may still be deallocated by another thread. Its
    /// links then read as unset, but the slot is not reissued until the
    /// guard drops. Use [`Protected::is_current`] to detect this.
    pub fn protect(&self, handle: EdgeHandle) -> Result<Protected<'_>, ArenaError> {
        let lease = self.hazards.acquire();
        self.protect_with(lease, handle)
    }

    fn protect_with<'a>(
        &'a self,
        lease: HazardLease<'a>,
        handle: EdgeHandle,
    ) -> Result<Protected<'a>, ArenaError> {
        let slot = self.blocks.slot(handle.index)?;
        lease.publish(handle.index);
        let observed = slot.tag(Ordering::SeqCst);
        if observed != SlotTag::allocated(handle.generation) {
            // Dropping the lease clears the hazard.
            return Err(fault_for(handle, observed));
        }
        Ok(Protected {
            arena: self,
            slot,
            handle,
            lease,
        })
    }

    /// Move every retired index whose hazard has cleared to the free list.
    ///
    /// `allocate()` does this on demand; calling it explicitly bounds the
    /// retired list under long-lived protection churn. Returns the number
    /// of indices promoted.
    pub fn reclaim(&self) -> usize {
        let promoted = self.lock_bin().promote(|i| self.hazards.is_protected(i));
        if promoted > 0 {
            tracing::trace!(promoted, "promoted retired slots");
        }
        promoted
    }

    /// Records per block.
    pub fn block_capacity(&self) -> u32 {
        self.blocks.block_capacity()
    }

    /// Number of committed blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.block_count()
    }

    /// Most blocks this arena can ever commit.
    pub fn max_blocks(&self) -> usize {
        self.blocks.max_blocks()
    }

    /// Number of committed slots.
    pub fn committed_slots(&self) -> usize {
        self.blocks.slot_count()
    }

    /// Number of currently allocated slots.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// The hazard domain, for diagnostics.
    pub fn hazards(&self) -> &HazardDomain {
        &self.hazards
    }

    /// Sample occupancy and cumulative counters.
    pub fn stats(&self) -> ArenaStats {
        let (free, retired) = {
            let bin = self.lock_bin();
            (bin.free_len(), bin.retired_len())
        };
        ArenaStats {
            committed_blocks: self.blocks.block_count(),
            committed_slots: self.blocks.slot_count(),
            live: self.live_count(),
            free,
            retired,
            allocations: Counters::get(&self.counters.allocations),
            deallocations: Counters::get(&self.counters.deallocations),
            growth_events: Counters::get(&self.counters.growth_events),
            deferred_reclaims: Counters::get(&self.counters.deferred_reclaims),
            contended_leases: self.hazards.contended_leases(),
        }
    }

    fn checked_slot(&self, handle: EdgeHandle) -> Result<&EdgeSlot, ArenaError> {
        let slot = self.blocks.slot(handle.index)?;
        let observed = slot.tag(Ordering::Acquire);
        if observed != SlotTag::allocated(handle.generation) {
            return Err(fault_for(handle, observed));
        }
        Ok(slot)
    }
}

/// Classify why `observed` does not match the occupancy `handle` names.
fn fault_for(handle: EdgeHandle, observed: SlotTag) -> ArenaError {
    let fault = if observed.generation() != handle.generation {
        HandleFault::StaleGeneration {
            handle_generation: handle.generation,
            slot_generation: observed.generation(),
        }
    } else {
        HandleFault::NotAllocated
    };
    ArenaError::invalid(handle.index, fault)
}

/// A hazard-protected view of one record.
///
/// While the guard lives, the slot cannot be reissued to a new occupant.
/// Dropping it clears the hazard.
pub struct Protected<'a> {
    arena: &'a SlotArena,
    slot: &'a EdgeSlot,
    handle: EdgeHandle,
    lease: HazardLease<'a>,
}

impl<'a> Protected<'a> {
    /// The protected handle.
    pub fn handle(&self) -> EdgeHandle {
        self.handle
    }

    /// Whether the occupancy is still live (not deallocated since
    /// protection began).
    pub fn is_current(&self) -> bool {
        self.slot.tag(Ordering::SeqCst) == SlotTag::allocated(self.handle.generation)
    }

    /// Move this guard's hazard slot to another handle.
    ///
    /// The previous record is unprotected as soon as the new index is
    /// published. On failure the hazard is released.
    pub fn retarget(self, handle: EdgeHandle) -> Result<Protected<'a>, ArenaError> {
        let Protected { arena, lease, .. } = self;
        arena.protect_with(lease, handle)
    }

    /// Retarget to the record's `next` link.
    ///
    /// Returns `Ok(None)` (releasing the hazard) when `next` is unset,
    /// names a free slot, or stopped naming the target before the target
    /// was protected.
    pub fn follow_next(self) -> Result<Option<Protected<'a>>, ArenaError> {
        let Some(next) = self.next() else {
            return Ok(None);
        };
        self.follow_link(next)
    }

    /// Protect the current occupant of `next`, then confirm this record is
    /// still live and still links to it.
    fn follow_link(self, next: EdgeIndex) -> Result<Option<Protected<'a>>, ArenaError> {
        let Some(target) = self.arena.handle_at(next) else {
            return Ok(None);
        };
        let (source, from) = (self.slot, self.handle);
        let guard = self.retarget(target)?;
        // Order the re-read after the hazard publish.
        fence(Ordering::SeqCst);
        let linked = source.record.next() == Some(next)
            && source.tag(Ordering::SeqCst) == SlotTag::allocated(from.generation);
        Ok(linked.then_some(guard))
    }
}

impl Deref for Protected<'_> {
    type Target = HalfEdgeRecord;

    fn deref(&self) -> &HalfEdgeRecord {
        &self.slot.record
    }
}
