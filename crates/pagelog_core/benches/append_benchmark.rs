//! # Append Benchmark
//!
//! Measures the in-place append path against the obvious heap alternative:
//! 1. `PagePool` appends into a preallocated page
//! 2. `Vec<u8>` per page, growing as it goes
//! 3. Pool creation and full clears

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pagelog_core::{ClearPolicy, PagePool, PoolConfig};

const PAGE_CAPACITY: usize = 4096;
const LINE: &str = "sensor 3: temperature 21.5C, humidity 40%";

// =============================================================================
// APPEND PATH
// =============================================================================

fn bench_append_line(c: &mut Criterion) {
    let mut pool = PagePool::create(6, PAGE_CAPACITY).unwrap();

    c.bench_function("pool_append_line_until_full", |b| {
        b.iter(|| {
            pool.clear(0).unwrap();
            while pool.remaining(0).unwrap() > 0 {
                black_box(pool.append_line(0, black_box(LINE)).unwrap());
            }
        });
    });

    c.bench_function("vec_push_line_until_full", |b| {
        b.iter(|| {
            let mut page: Vec<u8> = Vec::new();
            while page.len() < PAGE_CAPACITY {
                let room = PAGE_CAPACITY - page.len();
                let take = LINE.len().min(room.saturating_sub(1));
                page.extend_from_slice(&LINE.as_bytes()[..take]);
                page.push(b'\n');
            }
            black_box(page)
        });
    });
}

fn bench_append_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_by_size");
    let mut pool = PagePool::create(1, PAGE_CAPACITY).unwrap();

    for size in [8_usize, 64, 512] {
        let payload = vec![b'x'; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                if pool.remaining(0).unwrap() < payload.len() {
                    pool.clear(0).unwrap();
                }
                black_box(pool.append(0, black_box(payload)).unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// LIFECYCLE
// =============================================================================

fn bench_create(c: &mut Criterion) {
    c.bench_function("pool_create_6x1024", |b| {
        b.iter(|| black_box(PagePool::create(black_box(6), black_box(1024)).unwrap()));
    });
}

fn bench_clear_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("clear_all");

    for policy in [ClearPolicy::Sentinel, ClearPolicy::ZeroFill] {
        let config = PoolConfig::new(64, PAGE_CAPACITY).with_clear_all(policy);
        let mut pool = PagePool::with_config(&config).unwrap();
        group.bench_function(format!("{policy:?}"), |b| {
            b.iter(|| pool.clear_all());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append_line, bench_append_sizes, bench_create, bench_clear_all);
criterion_main!(benches);
