//! Criterion micro-benchmarks for slot arena allocation, release and
//! hazard-protected traversal.

use std::hint::black_box;
use std::thread;

use criterion::{criterion_group, criterion_main, Criterion};
use hedge_arena::{ArenaConfig, EdgeHandle, SlotArena};
use hedge_test_utils::{drive, OpStream};

fn make_arena() -> SlotArena {
    SlotArena::new(ArenaConfig::new(1024).with_prealloc_blocks(4)).unwrap()
}

/// Benchmark: allocate then release one slot (free-list hot path).
fn bench_alloc_release(c: &mut Criterion) {
    let arena = make_arena();
    c.bench_function("arena_alloc_release", |b| {
        b.iter(|| {
            let h = arena.allocate().unwrap();
            arena.deallocate(black_box(h)).unwrap();
        });
    });
}

/// Benchmark: 10K allocations into a fresh arena, including growth.
fn bench_alloc_10k_fresh(c: &mut Criterion) {
    c.bench_function("arena_alloc_10k_fresh", |b| {
        b.iter(|| {
            let arena = SlotArena::new(ArenaConfig::new(1024)).unwrap();
            for _ in 0..10_000 {
                black_box(arena.allocate().unwrap());
            }
        });
    });
}

/// Benchmark: protect + follow_next around a 1K ring.
fn bench_protected_walk(c: &mut Criterion) {
    let arena = make_arena();
    let ring: Vec<EdgeHandle> = (0..1_000).map(|_| arena.allocate().unwrap()).collect();
    for (i, &h) in ring.iter().enumerate() {
        arena
            .get(h)
            .unwrap()
            .set_next(Some(ring[(i + 1) % ring.len()].index()));
    }
    c.bench_function("arena_protected_walk_1k", |b| {
        b.iter(|| {
            let mut guard = arena.protect(ring[0]).unwrap();
            for _ in 1..ring.len() {
                guard = guard.follow_next().unwrap().unwrap();
            }
            black_box(guard.handle());
        });
    });
}

/// Benchmark: 4 threads running seeded churn against one arena.
fn bench_threaded_churn(c: &mut Criterion) {
    c.bench_function("arena_threaded_churn_4x1k", |b| {
        b.iter(|| {
            let arena = make_arena();
            thread::scope(|s| {
                for seed in 0..4u64 {
                    let arena = &arena;
                    s.spawn(move || {
                        let mut ops = OpStream::new(seed);
                        black_box(drive(arena, &mut ops, 1_000).unwrap());
                    });
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_release,
    bench_alloc_10k_fresh,
    bench_protected_walk,
    bench_threaded_churn
);
criterion_main!(benches);
