//! Micro-benchmarks for single contract calls
//!
//! The CLI measures whole concurrent workloads; these isolate the per-call
//! cost of each backend on one thread.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bucketbench::config::EngineConfig;
use bucketbench::storage::backends;
use bucketbench::workload::{bucket_name, key_name, value_name};
use bucketbench::StorageRegistry;
use tempfile::TempDir;

const PRELOADED: usize = 10_000;

fn storage_benchmarks(c: &mut Criterion) {
    let registry = StorageRegistry::with_builtin(EngineConfig::default());
    let bucket = bucket_name(0);

    for name in [backends::MEMORY, backends::ATLAS] {
        let temp = TempDir::new().unwrap();
        let storage = registry.open(name, temp.path()).unwrap();
        for i in 0..PRELOADED {
            storage.put(&bucket, &key_name(0, i), &value_name(0, i)).unwrap();
        }

        let mut group = c.benchmark_group(name);

        let mut next = PRELOADED;
        group.bench_function(BenchmarkId::new("put", "unique"), |b| {
            b.iter(|| {
                storage.put(&bucket, &key_name(0, next), &value_name(0, next)).unwrap();
                next += 1;
            })
        });

        group.bench_function(BenchmarkId::new("put", "duplicate"), |b| {
            let key = key_name(0, 0);
            b.iter(|| storage.put(&bucket, &key, &value_name(0, 1)).unwrap())
        });

        let mut i = 0;
        group.bench_function("get", |b| {
            b.iter(|| {
                let value = storage.get(&bucket, &key_name(0, i % PRELOADED)).unwrap();
                i += 1;
                black_box(value)
            })
        });

        group.bench_function("has_missing", |b| {
            let key = key_name(1, 0);
            b.iter(|| black_box(storage.has(&bucket, &key).unwrap()))
        });

        group.finish();
        storage.close().unwrap();
    }
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
