//! Integration tests: the slot arena under concurrent allocation, release
//! and protection.
//!
//! Threads are scoped and borrow one arena. Results come back over
//! crossbeam channels and are checked on the main thread.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;
use hedge_arena::{ArenaConfig, ArenaError, EdgeHandle, SlotArena};
use hedge_core::VertexHandle;
use hedge_test_utils::{drive, small_arena, OpStream};

const THREADS: usize = 8;

#[test]
fn concurrent_allocations_are_distinct() {
    let arena = small_arena(32);
    let (tx, rx) = unbounded::<EdgeHandle>();

    thread::scope(|s| {
        for _ in 0..THREADS {
            let tx = tx.clone();
            let arena = &arena;
            s.spawn(move || {
                for _ in 0..500 {
                    tx.send(arena.allocate().unwrap()).unwrap();
                }
            });
        }
    });
    drop(tx);

    let handles: Vec<_> = rx.iter().collect();
    let indices: HashSet<_> = handles.iter().map(|h| h.index()).collect();
    assert_eq!(handles.len(), THREADS * 500);
    assert_eq!(indices.len(), handles.len(), "an index was issued twice");
    assert_eq!(arena.live_count(), THREADS * 500);
    for h in handles {
        assert!(arena.get(h).unwrap().is_unset());
    }
}

#[test]
fn growth_under_contention_commits_exact_blocks() {
    let arena = SlotArena::new(ArenaConfig::new(4).with_hazard_slots(2)).unwrap();
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..100 {
                    arena.allocate().unwrap();
                }
            });
        }
    });
    assert_eq!(arena.block_count(), THREADS * 100 / 4);
    assert_eq!(arena.stats().growth_events, (THREADS * 100 / 4) as u64);
}

#[test]
fn growth_cap_is_shared_across_threads() {
    let arena =
        SlotArena::new(ArenaConfig::new(4).with_max_blocks(2).with_hazard_slots(2)).unwrap();
    let (tx, rx) = unbounded::<Result<EdgeHandle, ArenaError>>();

    thread::scope(|s| {
        for _ in 0..4 {
            let tx = tx.clone();
            let arena = &arena;
            s.spawn(move || {
                for _ in 0..4 {
                    tx.send(arena.allocate()).unwrap();
                }
            });
        }
    });
    drop(tx);

    let (ok, failed): (Vec<_>, Vec<_>) = rx.iter().partition(Result::is_ok);
    assert_eq!(ok.len(), 8);
    assert_eq!(failed.len(), 8);
    assert!(failed
        .iter()
        .all(|r| matches!(r, Err(ArenaError::PoolGrowthFailure { .. }))));
}

#[test]
fn seeded_churn_balances_counters() {
    let arena = small_arena(16);
    let (tx, rx) = unbounded::<Vec<EdgeHandle>>();

    thread::scope(|s| {
        for seed in 0..THREADS as u64 {
            let tx = tx.clone();
            let arena = &arena;
            s.spawn(move || {
                let mut ops = OpStream::new(0x5EED ^ seed);
                tx.send(drive(arena, &mut ops, 2_000).unwrap()).unwrap();
            });
        }
    });
    drop(tx);

    let held: Vec<EdgeHandle> = rx.iter().flatten().collect();
    assert_eq!(arena.live_count(), held.len());
    for h in held {
        arena.deallocate(h).unwrap();
    }
    arena.reclaim();

    let stats = arena.stats();
    assert_eq!(stats.live, 0);
    assert_eq!(stats.allocations, stats.deallocations);
    assert_eq!(stats.retired, 0, "no guard is alive, nothing may stay retired");
    assert_eq!(stats.free, arena.committed_slots());
}

#[test]
fn protected_index_is_not_reissued_while_others_allocate() {
    let arena = small_arena(8);
    let victim = arena.allocate().unwrap();
    let guard = arena.protect(victim).unwrap();
    arena.deallocate(victim).unwrap();
    assert!(!guard.is_current());

    let (tx, rx) = unbounded::<EdgeHandle>();
    thread::scope(|s| {
        for _ in 0..4 {
            let tx = tx.clone();
            let arena = &arena;
            s.spawn(move || {
                for _ in 0..64 {
                    let h = arena.allocate().unwrap();
                    tx.send(h).unwrap();
                    arena.deallocate(h).unwrap();
                }
            });
        }
    });
    drop(tx);
    assert!(rx.iter().all(|h| h.index() != victim.index()));

    drop(guard);
    assert_eq!(arena.reclaim(), 1);
    assert_eq!(arena.stats().retired, 0);
}

/// Stamp unique to one occupancy of one slot. Bit 31 stays clear.
fn ring_stamp(h: EdgeHandle) -> VertexHandle {
    VertexHandle((h.index().0 << 20) | (h.generation() & 0xF_FFFF))
}

/// Marker for records that never join the ring.
const FOREIGN: u32 = 1 << 31;

#[test]
fn readers_walk_ring_while_writer_replaces_edges() {
    const RING: usize = 12;

    let arena = small_arena(8);
    let mut ring: Vec<EdgeHandle> = (0..RING).map(|_| arena.allocate().unwrap()).collect();
    for (i, &h) in ring.iter().enumerate() {
        let rec = arena.get(h).unwrap();
        rec.set_vertex(Some(ring_stamp(h)));
        rec.set_next(Some(ring[(i + 1) % RING].index()));
    }
    let head = ring[0];
    let stop = AtomicBool::new(false);
    let (tx, rx) = unbounded::<usize>();

    thread::scope(|s| {
        for _ in 0..3 {
            let tx = tx.clone();
            let (arena, stop) = (&arena, &stop);
            s.spawn(move || {
                let mut laps = 0usize;
                loop {
                    let mut guard = arena.protect(head).unwrap();
                    for _ in 0..RING * 2 {
                        match guard.follow_next() {
                            Ok(Some(next)) => {
                                // A guard reached through a ring link holds that
                                // ring occupancy, or one released since.
                                let v = next.vertex();
                                assert!(
                                    v == Some(ring_stamp(next.handle())) || !next.is_current(),
                                    "{} reached with stamp {v:?}",
                                    next.handle()
                                );
                                if next.handle() == head {
                                    laps += 1;
                                    break;
                                }
                                guard = next;
                            }
                            Ok(None) | Err(_) => break,
                        }
                    }
                    if stop.load(Ordering::Relaxed) && laps > 0 {
                        break;
                    }
                }
                tx.send(laps).unwrap();
            });
        }

        // Churn picks up freed ring slots with records that are never linked.
        let stop_ref = &stop;
        let arena_ref = &arena;
        s.spawn(move || {
            let mut n = 0u32;
            while !stop_ref.load(Ordering::Relaxed) {
                let h = arena_ref.allocate().unwrap();
                let rec = arena_ref.get(h).unwrap();
                rec.set_vertex(Some(VertexHandle(FOREIGN | (n & 0xFFFF))));
                rec.set_next(Some(h.index()));
                arena_ref.deallocate(h).unwrap();
                n = n.wrapping_add(1);
            }
        });

        for round in 0..2_000 {
            let k = 1 + round % (RING - 1);
            let replacement = arena.allocate().unwrap();
            let rec = arena.get(replacement).unwrap();
            rec.set_vertex(Some(ring_stamp(replacement)));
            rec.set_next(Some(ring[(k + 1) % RING].index()));
            arena
                .get(ring[k - 1])
                .unwrap()
                .set_next(Some(replacement.index()));
            arena.deallocate(ring[k]).unwrap();
            ring[k] = replacement;
        }
        stop.store(true, Ordering::Relaxed);
    });
    drop(tx);

    let laps: Vec<usize> = rx.iter().collect();
    assert_eq!(laps.len(), 3);
    assert!(laps.iter().all(|&l| l > 0), "a reader never completed a lap: {laps:?}");
    assert_eq!(arena.live_count(), RING);
    arena.reclaim();
    assert_eq!(arena.stats().retired, 0);
    // The ring is still intact from the head, and every member carries its
    // own stamp.
    let mut at = head;
    for _ in 0..RING {
        let rec = arena.get(at).unwrap();
        assert_eq!(rec.vertex(), Some(ring_stamp(at)));
        at = arena.handle_at(rec.next().unwrap()).unwrap();
    }
    assert_eq!(at, head);
}
