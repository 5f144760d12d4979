//! Square f32 matmul at growing sizes, with B read both row-major and
//! through a transposed view of the same buffer.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sk_core::{matmul, FloatXFloat, MatMulParams, MatrixView};

fn fill(n: usize) -> Vec<f32> {
    (0..n * n).map(|i| ((i * 7919) % 1000) as f32 / 1000.0).collect()
}

fn bench_square(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul_f32");
    group.sample_size(10);

    for n in [64usize, 128, 181, 256, 362] {
        let data = fill(n);
        group.throughput(Throughput::Elements((n * n * n) as u64));

        let row_major = MatMulParams::row_major(n, n, n);
        group.bench_with_input(BenchmarkId::new("row_major", n), &n, |bench, _| {
            bench.iter(|| matmul::<FloatXFloat<f32>>(black_box(&row_major), &data, &data))
        });

        let transposed = MatMulParams::from_views(
            MatrixView::row_major(n, n),
            MatrixView::row_major(n, n).transpose(),
        );
        group.bench_with_input(BenchmarkId::new("transposed_b", n), &n, |bench, _| {
            bench.iter(|| matmul::<FloatXFloat<f32>>(black_box(&transposed), &data, &data))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_square);
criterion_main!(benches);
