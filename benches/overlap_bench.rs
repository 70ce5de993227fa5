//! Overlap evaluator performance benchmarks.
//!
//! Measures the per-query hit-counting loop across ground-truth shapes that
//! bracket common benchmark datasets (thousands of queries, K up to a few
//! hundred).

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gtkit::formats::GroundTruth;
use gtkit::overlap::overlap_at;
use std::hint::black_box;

/// Deterministic ground truth with partially overlapping id streams.
fn synthetic_gt(nq: usize, k: usize, stride: u32) -> GroundTruth {
    let ids = (0..nq * k)
        .map(|i| (i as u32).wrapping_mul(stride) % 10_000)
        .collect();
    let dists = (0..nq * k).map(|i| i as f32 * 0.001).collect();
    GroundTruth::from_parts(nq, k, ids, dists)
}

fn bench_overlap_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_at");

    for &(nq, k) in &[(1_000usize, 10usize), (1_000, 100), (10_000, 100)] {
        let reference = synthetic_gt(nq, k, 7);
        let candidate = synthetic_gt(nq, k, 11);
        group.throughput(Throughput::Elements((nq * k) as u64));

        group.bench_with_input(
            BenchmarkId::new("ids_only", format!("{nq}x{k}")),
            &(&reference, &candidate),
            |b, (reference, candidate)| {
                b.iter(|| {
                    overlap_at(black_box(*reference), black_box(*candidate), k, false)
                        .expect("valid cut-off")
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("with_distance_ties", format!("{nq}x{k}")),
            &(&reference, &candidate),
            |b, (reference, candidate)| {
                b.iter(|| {
                    overlap_at(black_box(*reference), black_box(*candidate), k, true)
                        .expect("valid cut-off")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_overlap_at);
criterion_main!(benches);
