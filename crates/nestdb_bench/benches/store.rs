//! Resource store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nestdb_bench::{random_document, random_snapshot};
use nestdb_core::ResourceStore;
use rand::Rng;

/// Benchmark reads from a populated store.
fn bench_get_populated(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_populated");

    for count in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let store = ResourceStore::from_snapshot(random_snapshot(count, 8, 2));
            let mut rng = rand::thread_rng();

            b.iter(|| {
                let ns = format!("ns_{}", rng.gen_range(0..count));
                black_box(store.get(&ns).unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark merging into an existing namespace.
fn bench_merge_into_store(c: &mut Criterion) {
    c.bench_function("store_merge", |b| {
        let store = ResourceStore::new();
        store.set("target", random_document(16, 2));
        let incoming = random_document(16, 2);

        b.iter(|| black_box(store.merge("target", incoming.clone())));
    });
}

/// Benchmark listing namespaces.
fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");

    for count in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let store = ResourceStore::from_snapshot(random_snapshot(count, 1, 1));
            b.iter(|| black_box(store.list()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_get_populated, bench_merge_into_store, bench_list);
criterion_main!(benches);
