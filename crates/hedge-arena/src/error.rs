//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use hedge_core::EdgeIndex;

/// Why a handle or index was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleFault {
    /// The index lies beyond the committed blocks.
    OutOfRange {
        /// Number of committed slots at the time of the check.
        committed: u64,
    },
    /// The slot is free (double free, or never allocated).
    NotAllocated,
    /// The slot was recycled since the handle was issued.
    StaleGeneration {
        /// Generation carried by the handle.
        handle_generation: u32,
        /// Generation currently stored in the slot.
        slot_generation: u32,
    },
}

impl fmt::Display for HandleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { committed } => {
                write!(f, "out of range ({committed} slots committed)")
            }
            Self::NotAllocated => write!(f, "slot is not allocated"),
            Self::StaleGeneration {
                handle_generation,
                slot_generation,
            } => write!(
                f,
                "stale generation {handle_generation}, slot is at {slot_generation}"
            ),
        }
    }
}

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The block directory is full; no further block can be appended.
    PoolGrowthFailure {
        /// Blocks committed when growth was attempted.
        blocks: u32,
        /// Records per block.
        block_capacity: u32,
    },
    /// A handle or index that does not name a live slot.
    InvalidHandle {
        /// The offending slot index.
        index: EdgeIndex,
        /// What was wrong with it.
        fault: HandleFault,
    },
    /// [`ArenaConfig`](crate::ArenaConfig) failed validation.
    InvalidConfig {
        /// Which invariant was violated.
        reason: String,
    },
}

impl ArenaError {
    pub(crate) fn invalid(index: EdgeIndex, fault: HandleFault) -> Self {
        Self::InvalidHandle { index, fault }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolGrowthFailure {
                blocks,
                block_capacity,
            } => write!(
                f,
                "slot pool cannot grow: {blocks} blocks of {block_capacity} records already committed"
            ),
            Self::InvalidHandle { index, fault } => {
                write!(f, "invalid handle {index}: {fault}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_index_and_fault() {
        let err = ArenaError::invalid(EdgeIndex(9), HandleFault::NotAllocated);
        assert_eq!(err.to_string(), "invalid handle e9: slot is not allocated");
    }

    #[test]
    fn growth_failure_display() {
        let err = ArenaError::PoolGrowthFailure {
            blocks: 2,
            block_capacity: 4,
        };
        assert!(err.to_string().contains("2 blocks of 4 records"));
    }
}
