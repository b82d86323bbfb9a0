//! Criterion benchmarks for pair metrics and pairwise matrices.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p polymatch --bench metrics_bench

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use polymatch::geom::{concave_hull_knn, Point, Polygon, RasterGrid};
use polymatch::metrics::{calculate_iou, overlap_matrix_iou, pairwise_metric_matrix, Metric};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_hull(n: usize, seed: u64) -> Polygon {
    let mut rng = StdRng::seed_from_u64(seed);
    let (cx, cy) = (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
    let pts: Vec<Point> = (0..n)
        .map(|_| Point::new(cx + rng.gen_range(-1.0..1.0), cy + rng.gen_range(-1.0..1.0)))
        .collect();
    concave_hull_knn(&pts, 8)
}

fn bench_pair(c: &mut Criterion) {
    let a = random_hull(200, 1);
    let b = random_hull(200, 2);
    let mut group = c.benchmark_group("pair");
    for &res in &[64usize, 256, 512, 1024] {
        group.bench_with_input(BenchmarkId::new("raster_iou", res), &res, |bn, &res| {
            let mut grid = RasterGrid::new(res);
            bn.iter(|| grid.iou(&a, &b))
        });
    }
    for metric in Metric::ALL {
        group.bench_function(BenchmarkId::new("metric", metric.name()), |bn| {
            bn.iter(|| metric.eval(&a, &b))
        });
    }
    group.bench_function("calculate_iou", |bn| bn.iter(|| calculate_iou(&a, &b)));
    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");
    group.sample_size(10);
    for &n in &[8usize, 32] {
        group.bench_with_input(BenchmarkId::new("overlap_iou_512", n), &n, |bn, &n| {
            bn.iter_batched(
                || (0..n as u64).map(|s| random_hull(120, s)).collect::<Vec<_>>(),
                |polys| overlap_matrix_iou(&polys, 512),
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("hausdorff", n), &n, |bn, &n| {
            bn.iter_batched(
                || (0..n as u64).map(|s| random_hull(120, s)).collect::<Vec<_>>(),
                |polys| pairwise_metric_matrix(&polys, Metric::Hausdorff),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pair, bench_matrix);
criterion_main!(benches);
