//! Arena configuration parameters.

use hedge_core::EdgeIndex;

use crate::error::ArenaError;

/// Configuration for a [`SlotArena`](crate::SlotArena).
///
/// Controls block sizing, the growth ceiling, and the number of hazard
/// slots. Validated at construction; all values are immutable after
/// creation.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Number of records per block (the growth increment).
    ///
    /// Default: 1024. Must be at least 1.
    pub block_capacity: u32,

    /// Size of the block directory, i.e. the most blocks the arena can ever
    /// commit. Reaching it makes `allocate()` fail with
    /// [`ArenaError::PoolGrowthFailure`].
    ///
    /// Default: 16_384 (16M records at the default block size).
    pub max_blocks: u32,

    /// Number of hazard slots. `None` = one per available hardware thread.
    ///
    /// Explicit values are clamped to `[1, 256]`.
    pub hazard_slots: Option<usize>,

    /// Blocks committed eagerly at construction. Default: 0 (fully lazy).
    pub prealloc_blocks: u32,
}

impl ArenaConfig {
    /// Default records per block.
    pub const DEFAULT_BLOCK_CAPACITY: u32 = 1024;

    /// Default block directory size.
    pub const DEFAULT_MAX_BLOCKS: u32 = 16_384;

    /// Upper bound on the hazard slot count.
    pub const MAX_HAZARD_SLOTS: usize = 256;

    /// Create a config with the given block capacity and defaults elsewhere.
    pub fn new(block_capacity: u32) -> Self {
        Self {
            block_capacity,
            max_blocks: Self::DEFAULT_MAX_BLOCKS,
            hazard_slots: None,
            prealloc_blocks: 0,
        }
    }

    /// Set the hazard slot count.
    pub fn with_hazard_slots(mut self, slots: usize) -> Self {
        self.hazard_slots = Some(slots);
        self
    }

    /// Set the block directory size.
    pub fn with_max_blocks(mut self, max_blocks: u32) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Set the number of eagerly committed blocks.
    pub fn with_prealloc_blocks(mut self, blocks: u32) -> Self {
        self.prealloc_blocks = blocks;
        self
    }

    /// Resolve the hazard slot count, applying auto-detection if `None`.
    pub fn resolved_hazard_slots(&self) -> usize {
        match self.hazard_slots {
            Some(n) => n.clamp(1, Self::MAX_HAZARD_SLOTS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, Self::MAX_HAZARD_SLOTS),
        }
    }

    /// Largest number of slots the arena can ever commit.
    pub fn max_slots(&self) -> u64 {
        self.block_capacity as u64 * self.max_blocks as u64
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.block_capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "block_capacity must be at least 1".into(),
            });
        }
        if self.max_blocks == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_blocks must be at least 1".into(),
            });
        }
        if self.prealloc_blocks > self.max_blocks {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "prealloc_blocks ({}) exceeds max_blocks ({})",
                    self.prealloc_blocks, self.max_blocks
                ),
            });
        }
        // Every slot index must stay below the packing sentinel.
        if self.max_slots() > EdgeIndex::MAX as u64 + 1 {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "block_capacity * max_blocks = {} exceeds the index space",
                    self.max_slots()
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_CAPACITY)
    }
}
