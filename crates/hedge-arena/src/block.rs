//! Fixed-capacity blocks and the write-once block directory.
//!
//! A [`Block`] is a boxed slice of `block_capacity` slots. A
//! [`BlockDirectory`] is a pre-sized table of write-once cells that blocks
//! are appended into. Blocks are never moved or freed while the directory
//! lives, so a `&EdgeSlot` obtained from it stays valid across growth.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

use hedge_core::EdgeIndex;

use crate::error::{ArenaError, HandleFault};
use crate::handle::SlotTag;
use crate::record::HalfEdgeRecord;

/// One arena slot: the state tag and the record storage.
pub(crate) struct EdgeSlot {
    tag: AtomicU64,
    pub(crate) record: HalfEdgeRecord,
}

impl EdgeSlot {
    fn new() -> Self {
        Self {
            tag: AtomicU64::new(SlotTag::FRESH.raw()),
            record: HalfEdgeRecord::new(),
        }
    }

    pub(crate) fn tag(&self, order: Ordering) -> SlotTag {
        SlotTag::from_raw(self.tag.load(order))
    }

    pub(crate) fn store_tag(&self, tag: SlotTag, order: Ordering) {
        self.tag.store(tag.raw(), order);
    }

    /// Flip `current` to `new`; on failure returns the observed tag.
    pub(crate) fn swap_tag(&self, current: SlotTag, new: SlotTag) -> Result<(), SlotTag> {
        self.tag
            .compare_exchange(current.raw(), new.raw(), Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(SlotTag::from_raw)
    }
}

/// A contiguous run of `block_capacity` slots.
pub(crate) struct Block {
    slots: Box<[EdgeSlot]>,
}

impl Block {
    fn new(capacity: u32) -> Self {
        Self {
            slots: (0..capacity).map(|_| EdgeSlot::new()).collect(),
        }
    }

    fn get(&self, offset: usize) -> Option<&EdgeSlot> {
        self.slots.get(offset)
    }
}

/// Directory of write-once block cells with an atomic committed count.
///
/// Readers index lock-free: a block is visible once `committed` has been
/// published past it. Growth itself is not synchronised here; the caller
/// serialises [`grow`](Self::grow) (the arena holds its free-set lock).
pub(crate) struct BlockDirectory {
    blocks: Box<[OnceLock<Block>]>,
    committed: AtomicUsize,
    block_capacity: u32,
}

impl BlockDirectory {
    pub(crate) fn new(block_capacity: u32, max_blocks: u32) -> Self {
        Self {
            blocks: (0..max_blocks).map(|_| OnceLock::new()).collect(),
            committed: AtomicUsize::new(0),
            block_capacity,
        }
    }

    /// Append a block and return the slot indices it covers.
    ///
    /// Callers must serialise growth.
    pub(crate) fn grow(&self) -> Result<Range<u32>, ArenaError> {
        let n = self.committed.load(Ordering::Acquire);
        let Some(cell) = self.blocks.get(n) else {
            return Err(ArenaError::PoolGrowthFailure {
                blocks: n as u32,
                block_capacity: self.block_capacity,
            });
        };
        let fresh = cell.set(Block::new(self.block_capacity)).is_ok();
        debug_assert!(fresh, "block {n} initialised twice; growth is not serialised");
        // Publish only after the block is in place.
        self.committed.store(n + 1, Ordering::Release);

        let start = n as u32 * self.block_capacity;
        Ok(start..start + self.block_capacity)
    }

    /// Resolve a slot, bounds-checked against the committed blocks.
    pub(crate) fn slot(&self, index: EdgeIndex) -> Result<&EdgeSlot, ArenaError> {
        let cap = self.block_capacity as usize;
        let block = index.as_usize() / cap;
        let committed = self.committed.load(Ordering::Acquire);
        if block >= committed {
            return Err(ArenaError::invalid(
                index,
                HandleFault::OutOfRange {
                    committed: (committed * cap) as u64,
                },
            ));
        }
        self.blocks[block]
            .get()
            .and_then(|b| b.get(index.as_usize() % cap))
            .ok_or(ArenaError::invalid(
                index,
                HandleFault::OutOfRange {
                    committed: (committed * cap) as u64,
                },
            ))
    }

    /// Number of committed blocks.
    pub(crate) fn block_count(&self) -> usize {
        self.committed.load(Ordering::Acquire)
    }

    /// Number of committed slots.
    pub(crate) fn slot_count(&self) -> usize {
        self.block_count() * self.block_capacity as usize
    }

    pub(crate) fn block_capacity(&self) -> u32 {
        self.block_capacity
    }

    /// Directory size: the most blocks that can ever be committed.
    pub(crate) fn max_blocks(&self) -> usize {
        self.blocks.len()
    }
}
