//! Free and retired index lists.
//!
//! [`RecycleBin`] holds the indices that are not currently issued. Indices
//! returned by `deallocate()` go straight to `free` unless a hazard slot
//! still publishes them, in which case they wait in `retired` until a scan
//! finds them unprotected.
//!
//! The bin itself is plain data; the arena keeps it behind a `Mutex`.

use std::ops::Range;

use hedge_core::EdgeIndex;

/// Free list plus deferred-reclamation list.
#[derive(Debug, Default)]
pub(crate) struct RecycleBin {
    /// Indices ready to hand out. LIFO, so recently freed (cache-warm)
    /// slots are reused first.
    free: Vec<u32>,
    /// Indices freed while protected; not yet safe to reissue.
    retired: Vec<u32>,
}

impl RecycleBin {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pop_free(&mut self) -> Option<EdgeIndex> {
        self.free.pop().map(EdgeIndex)
    }

    pub(crate) fn push_free(&mut self, index: EdgeIndex) {
        debug_assert!(!self.free.contains(&index.0), "{index} freed twice");
        self.free.push(index.0);
    }

    pub(crate) fn retire(&mut self, index: EdgeIndex) {
        self.retired.push(index.0);
    }

    /// Add a freshly committed block's indices.
    ///
    /// Pushed in reverse so the lowest index is popped first.
    pub(crate) fn extend_fresh(&mut self, range: Range<u32>) {
        self.free.extend(range.rev());
    }

    /// Move every retired index for which `is_protected` is false into the
    /// free list. Returns the number moved.
    pub(crate) fn promote(&mut self, mut is_protected: impl FnMut(EdgeIndex) -> bool) -> usize {
        let before = self.retired.len();
        let free = &mut self.free;
        self.retired.retain(|&raw| {
            if is_protected(EdgeIndex(raw)) {
                true
            } else {
                free.push(raw);
                false
            }
        });
        before - self.retired.len()
    }

    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn retired_len(&self) -> usize {
        self.retired.len()
    }

    #[cfg(test)]
    pub(crate) fn is_free(&self, index: EdgeIndex) -> bool {
        self.free.contains(&index.0)
    }
}
