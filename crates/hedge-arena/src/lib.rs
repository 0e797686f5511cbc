//! Block-structured concurrent slot arena for half-edge records.
//!
//! Every half-edge of a mesh lives in a slot of a [`SlotArena`]. The arena
//! hands out stable, reusable slots to many threads at once, grows by
//! appending fixed-capacity blocks without moving existing ones, and uses
//! hazard slots so that a record one thread is still looking at is never
//! reissued to another.
//!
//! # Architecture
//!
//! ```text
//! SlotArena
//! ├── BlockDirectory  (write-once OnceLock<Block> cells, atomic committed count)
//! │   └── Block → EdgeSlot[] (AtomicU64 tag + HalfEdgeRecord)
//! ├── Mutex<RecycleBin>  (LIFO free list + retired list)
//! └── HazardDomain → HazardSlot[] (cache-padded, one per worker)
//! ```
//!
//! # Safety
//!
//! No `unsafe`. Records are made of atomics and wired through shared
//! references; stability across growth comes from never replacing a
//! committed `OnceLock` cell.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
mod block;
pub mod config;
pub mod error;
pub mod handle;
pub mod hazard;
pub mod record;
mod recycle;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::{Protected, SlotArena};
pub use config::ArenaConfig;
pub use error::{ArenaError, HandleFault};
pub use handle::EdgeHandle;
pub use hazard::{HazardDomain, HazardLease};
pub use record::{HalfEdgeRecord, RecordFields};
pub use stats::ArenaStats;
