use std::path::PathBuf;

use geo::{Rect, coord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geomark::config::{BenchmarkConfig, IndexType, QueryType, ResultMode};
use geomark::generator::{IntersectsConfig, generate_intersects_queries, generate_point_queries};
use geomark::harness::{Workload, run_query_benchmark};
use geomark::{create_index, loader};

fn uniform_boxes(n: usize, seed: u64) -> Vec<Rect<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0.0..90.0);
            let y = rng.gen_range(0.0..90.0);
            let w = rng.gen_range(1.0..10.0);
            let h = rng.gen_range(1.0..10.0);
            Rect::new(coord! { x: x, y: y }, coord! { x: x + w, y: y + h })
        })
        .collect()
}

fn config(query_type: QueryType, parallelism: usize, query: Option<PathBuf>) -> BenchmarkConfig {
    BenchmarkConfig {
        geom: PathBuf::new(),
        query,
        cache_dir: None,
        warmup: 1,
        repeat: 2,
        limit: None,
        seed: 0,
        parallelism,
        avg_time: true,
        query_type,
        index_type: IndexType::RTree,
        result_mode: ResultMode::Collect,
        load_factor: 0.1,
        batch: 64,
        json: false,
    }
}

fn intersections(data: &[Rect<f64>], q: &Rect<f64>) -> usize {
    data.iter()
        .filter(|b| {
            b.min().x <= q.max().x
                && q.min().x <= b.max().x
                && b.min().y <= q.max().y
                && q.min().y <= b.max().y
        })
        .count()
}

/// 100 boxes in [0,100]x[0,100], min_qualified 5, 10 queries, seed 42:
/// exactly 10 queries come out, each intersecting at least 5 dataset boxes,
/// and the whole run is reproducible.
#[test]
fn intersects_generation_scenario() {
    let data = uniform_boxes(100, 42);
    let gen_config = IntersectsConfig {
        min_qualified: 5,
        num_queries: 10,
        seed: 42,
        parallelism: 1,
        ..IntersectsConfig::default()
    };

    let outcome = generate_intersects_queries(&data, &gen_config).unwrap();
    assert_eq!(outcome.queries.len(), 10);
    for q in &outcome.queries {
        assert!(intersections(&data, q) >= 5);
    }

    let rerun = generate_intersects_queries(&data, &gen_config).unwrap();
    assert_eq!(outcome.queries, rerun.queries);
}

/// Generated workloads survive a WKT dump/load cycle and both backends agree
/// on the harness-reported result cardinality.
#[test]
fn workload_round_trips_through_wkt_and_backends_agree() {
    let data = uniform_boxes(200, 7);
    let gen_config = IntersectsConfig {
        min_qualified: 4,
        num_queries: 25,
        seed: 3,
        parallelism: 1,
        ..IntersectsConfig::default()
    };
    let outcome = generate_intersects_queries(&data, &gen_config).unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    loader::dump_boxes(file.path(), &outcome.queries).unwrap();
    let reloaded = loader::load_boxes(file.path(), usize::MAX).unwrap();
    assert_eq!(reloaded, outcome.queries);

    let workload = Workload::Boxes(reloaded);
    let mut cardinalities = Vec::new();
    for index_type in [IndexType::RTree, IndexType::Linear] {
        let mut run_config = config(QueryType::RangeIntersects, 2, None);
        run_config.index_type = index_type;
        let mut index = create_index(index_type);
        let ts = run_query_benchmark(index.as_mut(), &data, &workload, &run_config);
        assert_eq!(ts.insert_ms.len(), 3);
        assert_eq!(ts.query_ms.len(), 3);
        // every query intersects at least min_qualified boxes
        assert!(ts.num_results >= 4 * 25);
        let s = ts.selectivity();
        assert!((0.0..=1.0).contains(&s));
        cardinalities.push(ts.num_results);
    }
    assert_eq!(cardinalities[0], cardinalities[1]);
}

/// Point workloads guarantee one hit per query, so the harness must report
/// at least as many results as queries, at any parallelism.
#[test]
fn point_workload_yields_a_hit_per_query() {
    let data = uniform_boxes(150, 11);
    let points = generate_point_queries(&data, 40, 5).unwrap();
    let workload = Workload::Points(points);

    for parallelism in [1, 3, 8] {
        let run_config = config(QueryType::PointContains, parallelism, None);
        let mut index = create_index(IndexType::RTree);
        let ts = run_query_benchmark(index.as_mut(), &data, &workload, &run_config);
        assert!(ts.num_results >= 40);
    }
}

/// Count mode must agree with collect mode through the full protocol.
#[test]
fn count_mode_matches_collect_mode() {
    let data = uniform_boxes(120, 13);
    let queries = uniform_boxes(30, 17);
    let workload = Workload::Boxes(queries);

    let mut collect_config = config(QueryType::RangeContains, 4, None);
    let mut index = create_index(IndexType::RTree);
    let collected = run_query_benchmark(index.as_mut(), &data, &workload, &collect_config);

    collect_config.result_mode = ResultMode::Count;
    let mut index = create_index(IndexType::RTree);
    let counted = run_query_benchmark(index.as_mut(), &data, &workload, &collect_config);

    assert_eq!(collected.num_results, counted.num_results);
}
