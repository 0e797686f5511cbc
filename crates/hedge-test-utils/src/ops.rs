//! Seeded arena workloads.
//!
//! [`OpStream`] is an endless, reproducible sequence of [`ArenaOp`]s drawn
//! from a ChaCha8 generator. [`drive`] applies a prefix of a stream to an
//! arena, tracking the handles it owns, and panics on any outcome a correct
//! arena cannot produce.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hedge_arena::{ArenaError, EdgeHandle, SlotArena};

/// One step of a workload. `pick` selects among currently held handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaOp {
    Allocate,
    Release { pick: u32 },
    Protect { pick: u32 },
}

/// Deterministic op generator.
pub struct OpStream {
    rng: ChaCha8Rng,
    /// Out of 256: chance that a step allocates.
    alloc_weight: u32,
}

impl OpStream {
    /// Balanced stream: about half the steps allocate.
    pub fn new(seed: u64) -> Self {
        Self::with_alloc_weight(seed, 128)
    }

    /// Stream whose steps allocate with probability `weight / 256`.
    pub fn with_alloc_weight(seed: u64, weight: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            alloc_weight: weight.min(256),
        }
    }
}

impl Iterator for OpStream {
    type Item = ArenaOp;

    fn next(&mut self) -> Option<ArenaOp> {
        let roll = self.rng.next_u32();
        let pick = self.rng.next_u32();
        let op = if roll & 0xff < self.alloc_weight {
            ArenaOp::Allocate
        } else if roll & 0x100 == 0 {
            ArenaOp::Release { pick }
        } else {
            ArenaOp::Protect { pick }
        };
        Some(op)
    }
}

/// Apply `steps` ops from `stream` to `arena`.
///
/// Every allocated record gets its own index written into `next`;
/// protects check the stamp is still there. Returns the handles
/// still held at the end. Allocation errors are returned as-is so callers
/// can test growth limits.
pub fn drive(
    arena: &SlotArena,
    stream: &mut OpStream,
    steps: usize,
) -> Result<Vec<EdgeHandle>, ArenaError> {
    let mut held: Vec<EdgeHandle> = Vec::new();
    for op in stream.take(steps) {
        match op {
            ArenaOp::Allocate => {
                let handle = arena.allocate()?;
                let rec = arena.get(handle).expect("fresh handle resolves");
                assert!(rec.is_unset(), "{handle} issued with stale links");
                rec.set_next(Some(handle.index()));
                held.push(handle);
            }
            ArenaOp::Release { pick } => {
                if held.is_empty() {
                    continue;
                }
                let handle = held.swap_remove(pick as usize % held.len());
                arena
                    .deallocate(handle)
                    .unwrap_or_else(|e| panic!("release of held {handle} failed: {e}"));
                assert!(arena.get(handle).is_err(), "{handle} still resolves");
            }
            ArenaOp::Protect { pick } => {
                if held.is_empty() {
                    continue;
                }
                let handle = held[pick as usize % held.len()];
                let guard = arena
                    .protect(handle)
                    .unwrap_or_else(|e| panic!("protect of held {handle} failed: {e}"));
                assert_eq!(guard.next(), Some(handle.index()), "{handle} was clobbered");
            }
        }
    }
    Ok(held)
}
