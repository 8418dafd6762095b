use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::{Rect, coord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geomark::generator::{
    IntersectsConfig, generate_contains_queries, generate_intersects_queries,
    generate_point_queries,
};
use geomark::index::{RTreeIndex, SpatialIndex};

fn uniform_boxes(n: usize, seed: u64) -> Vec<Rect<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0.0..990.0);
            let y = rng.gen_range(0.0..990.0);
            let w = rng.gen_range(0.5..10.0);
            let h = rng.gen_range(0.5..10.0);
            Rect::new(coord! { x: x, y: y }, coord! { x: x + w, y: y + h })
        })
        .collect()
}

fn benchmark_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generators");
    let data = uniform_boxes(10_000, 42);

    group.bench_function("point_queries_1k", |b| {
        b.iter(|| generate_point_queries(black_box(&data), 1000, 42).unwrap())
    });

    group.bench_function("contains_queries_1k", |b| {
        b.iter(|| generate_contains_queries(black_box(&data), 1000, 42).unwrap())
    });

    for min_qualified in [4usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("intersects_queries_100", min_qualified),
            &min_qualified,
            |b, &min_qualified| {
                let config = IntersectsConfig {
                    min_qualified,
                    num_queries: 100,
                    seed: 42,
                    parallelism: 1,
                    ..IntersectsConfig::default()
                };
                b.iter(|| generate_intersects_queries(black_box(&data), &config).unwrap())
            },
        );
    }

    group.finish();
}

fn benchmark_index_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_queries");
    let data = uniform_boxes(10_000, 7);
    let queries = generate_intersects_queries(
        &data,
        &IntersectsConfig {
            min_qualified: 8,
            num_queries: 500,
            seed: 7,
            parallelism: 1,
            ..IntersectsConfig::default()
        },
    )
    .unwrap()
    .queries;

    let mut index = RTreeIndex::new();
    index.build(&data);

    group.bench_function("bulk_build_10k", |b| {
        b.iter(|| {
            let mut fresh = RTreeIndex::new();
            fresh.build(black_box(&data));
            fresh.len()
        })
    });

    group.bench_function("range_intersects_500", |b| {
        b.iter(|| {
            let mut matched = 0u64;
            for q in &queries {
                index.range_intersects(q, &mut |_| matched += 1);
            }
            matched
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_generators, benchmark_index_queries);
criterion_main!(benches);
