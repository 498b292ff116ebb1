//! Snapshot persistence benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nestdb_bench::random_snapshot;
use nestdb_core::PersistenceGateway;
use tempfile::tempdir;

/// Benchmark writing a snapshot.
fn bench_persist(c: &mut Criterion) {
    let mut group = c.benchmark_group("persist");
    group.sample_size(20);

    for namespaces in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*namespaces as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(namespaces),
            namespaces,
            |b, &namespaces| {
                let dir = tempdir().unwrap();
                let gateway = PersistenceGateway::new(Some(dir.path().join("persist.json")));
                let snapshot = random_snapshot(namespaces, 8, 2);

                b.iter(|| black_box(gateway.persist(&snapshot).unwrap()));
            },
        );
    }
    group.finish();
}

/// Benchmark restoring a snapshot.
fn bench_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("restore");
    group.sample_size(20);

    for namespaces in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*namespaces as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(namespaces),
            namespaces,
            |b, &namespaces| {
                let dir = tempdir().unwrap();
                let gateway = PersistenceGateway::new(Some(dir.path().join("persist.json")));
                gateway.persist(&random_snapshot(namespaces, 8, 2)).unwrap();

                b.iter(|| black_box(gateway.restore().unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_persist, bench_restore);
criterion_main!(benches);
