//! Face-loop assembly, validation and traversal.
//!
//! A [`FaceLoopBuilder`] wires `next`/`prev`/`twin`/`vertex` on arena
//! records through a moving cursor. [`finalize`](FaceLoopBuilder::finalize)
//! walks the result and either returns a [`FaceLoop`] or the first
//! [`TopologyError`] it finds. A `FaceLoop` is just a head handle and a
//! length; every traversal re-walks the arena from the head.
//!
//! ```text
//!   begin(e1, e3)          add_next(e2)          add_next(e3)          add_next(e1)
//!   cursor: e1             e1 → e2               e1 → e2 → e3          e1 → e2 → e3 ─┐
//!                          cursor: e2            cursor: e3            ▲─────────────┘
//! ```
//!
//! `add_next` sets only the forward link. `link_next` sets both directions
//! and `close` ties the cursor back to the head.

use smallvec::SmallVec;

use hedge_arena::{EdgeHandle, HalfEdgeRecord, SlotArena};
use hedge_core::{EdgeIndex, VertexHandle};

use crate::error::TopologyError;

/// Cursor-based wiring of one face loop.
///
/// Wiring methods never fail individually. If the cursor names a slot that
/// is no longer allocated, the fault is remembered and reported by
/// `finalize`, and later wiring calls are ignored.
pub struct FaceLoopBuilder<'a> {
    arena: &'a SlotArena,
    head: EdgeHandle,
    tail: EdgeHandle,
    cursor: EdgeHandle,
    /// Distinct loop edges in the order the builder first touched them.
    touched: SmallVec<[EdgeHandle; 8]>,
    fault: Option<TopologyError>,
}

impl<'a> FaceLoopBuilder<'a> {
    /// Start a loop at `head`, expecting `tail` to be the edge that closes
    /// it (`tail.next == head`). Both must come from `arena`.
    pub fn begin(arena: &'a SlotArena, head: EdgeHandle, tail: EdgeHandle) -> Self {
        let mut touched = SmallVec::new();
        touched.push(head);
        if tail != head {
            touched.push(tail);
        }
        Self {
            arena,
            head,
            tail,
            cursor: head,
            touched,
            fault: None,
        }
    }

    /// The edge the next wiring call applies to.
    pub fn cursor(&self) -> EdgeHandle {
        self.cursor
    }

    /// Set `cursor.next = edge` and move the cursor to `edge`.
    pub fn add_next(&mut self, edge: EdgeHandle) -> &mut Self {
        if let Some(rec) = self.cursor_record() {
            rec.set_next(Some(edge.index()));
            self.touch(edge);
            self.cursor = edge;
        }
        self
    }

    /// Set `cursor.prev = edge` and move the cursor to `edge`.
    pub fn add_prev(&mut self, edge: EdgeHandle) -> &mut Self {
        if let Some(rec) = self.cursor_record() {
            rec.set_prev(Some(edge.index()));
            self.touch(edge);
            self.cursor = edge;
        }
        self
    }

    /// Set `cursor.next = edge` and `edge.prev = cursor`, then move the
    /// cursor to `edge`.
    pub fn link_next(&mut self, edge: EdgeHandle) -> &mut Self {
        let from = self.cursor;
        self.add_next(edge);
        if self.fault.is_none() {
            match self.arena.get(edge) {
                Ok(rec) => rec.set_prev(Some(from.index())),
                Err(_) => self.fail(edge.index()),
            }
        }
        self
    }

    /// Pair the cursor with `edge` as twins (both directions). The cursor
    /// does not move.
    pub fn add_twin(&mut self, edge: EdgeHandle) -> &mut Self {
        let cursor = self.cursor;
        if let Some(rec) = self.cursor_record() {
            match self.arena.get(edge) {
                Ok(twin) => {
                    rec.set_twin(Some(edge.index()));
                    twin.set_twin(Some(cursor.index()));
                }
                Err(_) => self.fail(edge.index()),
            }
        }
        self
    }

    /// Set the cursor's origin vertex.
    pub fn set_vertex(&mut self, vertex: VertexHandle) -> &mut Self {
        if let Some(rec) = self.cursor_record() {
            rec.set_vertex(Some(vertex));
        }
        self
    }

    /// Link the cursor back to the head (`cursor.next = head`,
    /// `head.prev = cursor`) and move the cursor to the head.
    pub fn close(&mut self) -> &mut Self {
        let head = self.head;
        self.link_next(head)
    }

    /// Validate the wired loop.
    ///
    /// Walks `next` from the head for at most as many steps as the builder
    /// touched edges, so a loop that never closes is reported instead of
    /// walked forever. Checks, in walk order, that each edge is allocated,
    /// has a vertex, has a symmetric twin (if any), and is the `prev` of its
    /// successor; then that the tail closes the loop and that every touched
    /// edge was visited.
    pub fn finalize(self) -> Result<FaceLoop, TopologyError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        let arena = self.arena;
        let bound = self.touched.len();
        let mut visited: SmallVec<[EdgeIndex; 8]> = SmallVec::new();
        let mut current = self.head;

        loop {
            let rec = arena
                .get(current)
                .map_err(|_| TopologyError::DeadEdge {
                    edge: current.index(),
                })?;
            visited.push(current.index());
            check_record(arena, current.index(), rec)?;

            let next_index = rec.next().ok_or(TopologyError::OpenLoop {
                edge: current.index(),
            })?;
            let next = arena
                .handle_at(next_index)
                .ok_or(TopologyError::DeadEdge { edge: next_index })?;
            let next_rec = arena
                .get(next)
                .map_err(|_| TopologyError::DeadEdge { edge: next_index })?;
            if next_rec.prev() != Some(current.index()) {
                return Err(TopologyError::BrokenPrev { edge: next_index });
            }
            if current == self.tail && next != self.head {
                return Err(TopologyError::TailNotClosing {
                    edge: self.tail.index(),
                });
            }
            if next == self.head {
                break;
            }
            if visited.len() >= bound {
                return Err(TopologyError::OpenLoop {
                    edge: current.index(),
                });
            }
            current = next;
        }

        if !visited.contains(&self.tail.index()) {
            return Err(TopologyError::TailNotClosing {
                edge: self.tail.index(),
            });
        }
        if let Some(stray) = self
            .touched
            .iter()
            .find(|h| !visited.contains(&h.index()))
        {
            return Err(TopologyError::Unreachable {
                edge: stray.index(),
            });
        }

        Ok(FaceLoop {
            head: self.head,
            len: visited.len(),
        })
    }

    fn cursor_record(&mut self) -> Option<&'a HalfEdgeRecord> {
        if self.fault.is_some() {
            return None;
        }
        match self.arena.get(self.cursor) {
            Ok(rec) => Some(rec),
            Err(_) => {
                self.fail(self.cursor.index());
                None
            }
        }
    }

    fn touch(&mut self, edge: EdgeHandle) {
        if !self.touched.contains(&edge) {
            self.touched.push(edge);
        }
    }

    fn fail(&mut self, edge: EdgeIndex) {
        if self.fault.is_none() {
            self.fault = Some(TopologyError::DeadEdge { edge });
        }
    }
}

/// Per-edge checks that do not depend on walk position.
fn check_record(
    arena: &SlotArena,
    index: EdgeIndex,
    rec: &HalfEdgeRecord,
) -> Result<(), TopologyError> {
    if rec.vertex().is_none() {
        return Err(TopologyError::MissingVertex { edge: index });
    }
    if let Some(twin) = rec.twin() {
        let back = arena.resolve(twin).ok().and_then(HalfEdgeRecord::twin);
        if back != Some(index) {
            return Err(TopologyError::AsymmetricTwin { edge: index });
        }
    }
    Ok(())
}

/// A validated face boundary.
///
/// Holds only the head handle and the loop length. Traversals re-walk the
/// arena, so they reflect the current links; if the loop is edited or its
/// edges released after validation, walks stop early rather than run on.
/// Once the head is released, every walk is empty, even after its slot is
/// reissued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceLoop {
    head: EdgeHandle,
    len: usize,
}

impl FaceLoop {
    /// The edge every traversal starts from.
    pub fn head(&self) -> EdgeHandle {
        self.head
    }

    /// Number of edges on the loop.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a validated loop has at least one edge.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Edges in `next` order, starting at the head.
    pub fn edges<'a>(&self, arena: &'a SlotArena) -> LoopWalk<'a> {
        LoopWalk::new(arena, self.head, self.len, Direction::Next)
    }

    /// Edges in `prev` order, starting at the head.
    ///
    /// For a loop `[e1, e2, e3]` this yields `[e1, e3, e2]`.
    pub fn edges_rev<'a>(&self, arena: &'a SlotArena) -> LoopWalk<'a> {
        LoopWalk::new(arena, self.head, self.len, Direction::Prev)
    }

    /// Origin vertices in `next` order, starting at the head's.
    pub fn vertices<'a>(&self, arena: &'a SlotArena) -> impl Iterator<Item = VertexHandle> + 'a {
        self.edges(arena)
            .map_while(move |h| arena.get(h).ok().and_then(HalfEdgeRecord::vertex))
    }

    /// Whether `edge` is on this loop.
    pub fn contains(&self, arena: &SlotArena, edge: EdgeHandle) -> bool {
        self.edges(arena).any(|h| h == edge)
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Next,
    Prev,
}

/// Bounded walk around a face loop.
///
/// Yields at most the loop's length. Yields nothing if the head handle is
/// stale, and stops early if a link is unset or names a free slot.
pub struct LoopWalk<'a> {
    arena: &'a SlotArena,
    /// Head handle, checked before the first step.
    head: Option<EdgeHandle>,
    at: Option<EdgeIndex>,
    remaining: usize,
    direction: Direction,
}

impl<'a> LoopWalk<'a> {
    fn new(arena: &'a SlotArena, head: EdgeHandle, len: usize, direction: Direction) -> Self {
        Self {
            arena,
            head: Some(head),
            at: Some(head.index()),
            remaining: len,
            direction,
        }
    }
}

impl Iterator for LoopWalk<'_> {
    type Item = EdgeHandle;

    fn next(&mut self) -> Option<EdgeHandle> {
        if self.remaining == 0 {
            return None;
        }
        if let Some(head) = self.head.take() {
            if !self.arena.is_allocated(head) {
                self.at = None;
                self.remaining = 0;
                return None;
            }
        }
        let index = self.at.take()?;
        let handle = self.arena.handle_at(index)?;
        let rec = self.arena.get(handle).ok()?;
        self.at = match self.direction {
            Direction::Next => rec.next(),
            Direction::Prev => rec.prev(),
        };
        self.remaining -= 1;
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl std::iter::FusedIterator for LoopWalk<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use hedge_test_utils::small_arena;

    fn edges(arena: &SlotArena, n: usize) -> Vec<EdgeHandle> {
        (0..n).map(|_| arena.allocate().unwrap()).collect()
    }

    /// Build e0 → e1 → … → e(n-1) → e0 with vertices 0..n and prev links.
    fn closed_loop<'a>(arena: &'a SlotArena, es: &[EdgeHandle]) -> FaceLoopBuilder<'a> {
        let mut b = FaceLoopBuilder::begin(arena, es[0], es[es.len() - 1]);
        b.set_vertex(VertexHandle(0));
        for (i, e) in es.iter().enumerate().skip(1) {
            b.link_next(*e).set_vertex(VertexHandle(i as u32));
        }
        b.close();
        b
    }

    #[test]
    fn triangle_with_explicit_prev_links() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let (e1, e2, e3) = (es[0], es[1], es[2]);
        let (v1, v2, v3) = (VertexHandle(10), VertexHandle(11), VertexHandle(12));

        let mut b = FaceLoopBuilder::begin(&arena, e1, e3);
        b.set_vertex(v1)
            .add_next(e2)
            .set_vertex(v2)
            .add_next(e3)
            .set_vertex(v3)
            .add_next(e1);
        assert_eq!(b.cursor(), e1);
        b.add_prev(e3).add_prev(e2).add_prev(e1);

        let face = b.finalize().unwrap();
        assert_eq!(face.len(), 3);
        assert_eq!(face.head(), e1);
        assert_eq!(face.edges(&arena).collect::<Vec<_>>(), vec![e1, e2, e3]);
        assert_eq!(face.vertices(&arena).collect::<Vec<_>>(), vec![v1, v2, v3]);
        // Restartable.
        assert_eq!(face.edges(&arena).count(), 3);
        assert_eq!(face.edges_rev(&arena).collect::<Vec<_>>(), vec![e1, e3, e2]);
    }

    #[test]
    fn missing_closing_link_is_open_loop() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[2]);
        b.set_vertex(VertexHandle(0))
            .link_next(es[1])
            .set_vertex(VertexHandle(1))
            .link_next(es[2])
            .set_vertex(VertexHandle(2));
        assert_eq!(
            b.finalize(),
            Err(TopologyError::OpenLoop {
                edge: es[2].index()
            })
        );
    }

    #[test]
    fn cycle_not_through_head_terminates() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[2]);
        b.set_vertex(VertexHandle(0))
            .link_next(es[1])
            .set_vertex(VertexHandle(1))
            .link_next(es[2])
            .set_vertex(VertexHandle(2))
            .link_next(es[1]);
        // e2 → e1 closes a sub-cycle that never returns to e0.
        let err = b.finalize().unwrap_err();
        assert!(matches!(
            err,
            TopologyError::BrokenPrev { .. } | TopologyError::OpenLoop { .. }
        ));
    }

    #[test]
    fn missing_vertex_reported() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[2]);
        b.set_vertex(VertexHandle(0))
            .link_next(es[1])
            .link_next(es[2])
            .set_vertex(VertexHandle(2))
            .close();
        assert_eq!(
            b.finalize(),
            Err(TopologyError::MissingVertex {
                edge: es[1].index()
            })
        );
    }

    #[test]
    fn missing_prev_reported() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[2]);
        b.set_vertex(VertexHandle(0))
            .add_next(es[1])
            .set_vertex(VertexHandle(1))
            .add_next(es[2])
            .set_vertex(VertexHandle(2))
            .add_next(es[0]);
        assert_eq!(
            b.finalize(),
            Err(TopologyError::BrokenPrev {
                edge: es[1].index()
            })
        );
    }

    #[test]
    fn asymmetric_twin_reported() {
        let arena = small_arena(16);
        let es = edges(&arena, 4);
        let b = closed_loop(&arena, &es[..3]);
        arena.get(es[1]).unwrap().set_twin(Some(es[3].index()));
        assert_eq!(
            b.finalize(),
            Err(TopologyError::AsymmetricTwin {
                edge: es[1].index()
            })
        );
    }

    #[test]
    fn add_twin_is_symmetric() {
        let arena = small_arena(16);
        let es = edges(&arena, 4);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[2]);
        b.set_vertex(VertexHandle(0)).add_twin(es[3]);
        assert_eq!(b.cursor(), es[0]);
        b.link_next(es[1])
            .set_vertex(VertexHandle(1))
            .link_next(es[2])
            .set_vertex(VertexHandle(2))
            .close();
        let face = b.finalize().unwrap();
        assert_eq!(arena.get(es[0]).unwrap().twin(), Some(es[3].index()));
        assert_eq!(arena.get(es[3]).unwrap().twin(), Some(es[0].index()));
        assert_eq!(face.len(), 3);
    }

    #[test]
    fn wrong_tail_reported() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[1]);
        b.set_vertex(VertexHandle(0))
            .link_next(es[1])
            .set_vertex(VertexHandle(1))
            .link_next(es[2])
            .set_vertex(VertexHandle(2))
            .close();
        assert_eq!(
            b.finalize(),
            Err(TopologyError::TailNotClosing {
                edge: es[1].index()
            })
        );
    }

    #[test]
    fn dead_cursor_is_sticky() {
        let arena = small_arena(16);
        let es = edges(&arena, 2);
        arena.deallocate(es[1]).unwrap();
        let mut b = FaceLoopBuilder::begin(&arena, es[0], es[1]);
        b.set_vertex(VertexHandle(0)).add_next(es[1]).set_vertex(VertexHandle(1));
        assert_eq!(
            b.finalize(),
            Err(TopologyError::DeadEdge {
                edge: es[1].index()
            })
        );
    }

    #[test]
    fn unreachable_touched_edge_reported() {
        let arena = small_arena(16);
        let es = edges(&arena, 4);
        let mut b = closed_loop(&arena, &es[..3]);
        // Cursor is back at the head; hang e3 off its prev chain without
        // putting it on the loop, then restore the head's prev.
        b.add_prev(es[3]).set_vertex(VertexHandle(3));
        arena.get(es[0]).unwrap().set_prev(Some(es[2].index()));
        assert_eq!(
            b.finalize(),
            Err(TopologyError::Unreachable {
                edge: es[3].index()
            })
        );
    }

    #[test]
    fn single_edge_self_loop() {
        let arena = small_arena(16);
        let e = arena.allocate().unwrap();
        let mut b = FaceLoopBuilder::begin(&arena, e, e);
        b.set_vertex(VertexHandle(0)).close();
        let face = b.finalize().unwrap();
        assert_eq!(face.edges(&arena).collect::<Vec<_>>(), vec![e]);
    }

    #[test]
    fn walk_stops_after_release() {
        let arena = small_arena(16);
        let es = edges(&arena, 4);
        let face = closed_loop(&arena, &es).finalize().unwrap();
        assert!(face.contains(&arena, es[2]));
        arena.deallocate(es[2]).unwrap();
        assert_eq!(face.edges(&arena).collect::<Vec<_>>(), vec![es[0], es[1]]);
        assert_eq!(face.vertices(&arena).count(), 2);
    }

    #[test]
    fn stale_loop_does_not_walk_reissued_slots() {
        let arena = small_arena(16);
        let es = edges(&arena, 3);
        let old = closed_loop(&arena, &es).finalize().unwrap();
        for &e in &es {
            arena.deallocate(e).unwrap();
        }
        let reissued = edges(&arena, 3);
        assert!(reissued.iter().any(|e| e.index() == old.head().index()));
        let new = closed_loop(&arena, &reissued).finalize().unwrap();

        assert_eq!(old.edges(&arena).count(), 0);
        assert_eq!(old.edges_rev(&arena).count(), 0);
        assert_eq!(old.vertices(&arena).count(), 0);
        assert!(!reissued.iter().any(|&e| old.contains(&arena, e)));
        assert_eq!(new.edges(&arena).count(), 3);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn closed_loops_walk_both_ways(n in 1usize..24) {
                let arena = small_arena(16);
                let es = edges(&arena, n);
                let face = closed_loop(&arena, &es).finalize().unwrap();
                prop_assert_eq!(face.len(), n);
                let fwd: Vec<_> = face.edges(&arena).collect();
                prop_assert_eq!(&fwd, &es);
                let mut rev: Vec<_> = face.edges_rev(&arena).collect();
                rev[1..].reverse();
                prop_assert_eq!(rev, es);
            }

            #[test]
            fn dropping_any_next_link_fails(n in 2usize..16, cut in 0usize..16) {
                let arena = small_arena(16);
                let es = edges(&arena, n);
                let b = closed_loop(&arena, &es);
                let cut = cut % n;
                arena.get(es[cut]).unwrap().set_next(None);
                prop_assert_eq!(
                    b.finalize(),
                    Err(TopologyError::OpenLoop { edge: es[cut].index() })
                );
            }
        }
    }
}
