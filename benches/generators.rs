//! Criterion benchmarks for the workload generators.

use bitmap_bench::{
    generate_import_csv, BasicQueryBenchmark, BasicQueryConfig, Benchmark, Cancellation,
    EchoClient, ImportSpec, QueryClient, QueryGenerator, StaticConnector,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

fn bench_query_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_depth");

    for depth in [1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut generator = QueryGenerator::new(42);
            b.iter(|| generator.random(100, depth, 4, 0, 100_000).to_string());
        });
    }

    group.finish();
}

fn bench_import_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_csv");

    for (name, random_order) in [("ordered", false), ("random", true)] {
        let spec = ImportSpec {
            base_bitmap_id: 0,
            max_bitmap_id: 1000,
            base_profile_id: 0,
            max_profile_id: 100_000,
            min_bits_per_map: 0,
            max_bits_per_map: 100,
            seed: 42,
            random_order,
        };
        let rows = spec.rows().count() as u64;

        group.throughput(Throughput::Elements(rows));
        group.bench_with_input(BenchmarkId::from_parameter(name), &spec, |b, spec| {
            b.iter(|| generate_import_csv(std::io::sink(), spec));
        });
    }

    group.finish();
}

fn bench_basic_query_run(c: &mut Criterion) {
    let client: Arc<dyn QueryClient> = Arc::new(EchoClient::discard());
    let hosts = vec!["localhost:10101".to_string()];

    c.bench_function("basic_query_run", |b| {
        b.iter_batched(
            || {
                let mut bench = BasicQueryBenchmark::new(
                    BasicQueryConfig::default().with_iterations(100).with_num_args(8),
                    Arc::new(StaticConnector(client.clone())),
                );
                bench.init(&hosts, 0).expect("init");
                bench
            },
            |mut bench| bench.run(&Cancellation::new()),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_query_depth,
    bench_import_csv,
    bench_basic_query_run,
);

criterion_main!(benches);
