//! The build/query timing protocol.
//!
//! Every variant follows the same scheme: `warmup + repeat` timed iterations,
//! with the index destroyed and rebuilt at the start of each one so every
//! sample measures cold-build cost. The query phase shards the workload into
//! contiguous, disjoint ranges, spawns one scoped worker per shard against
//! the shared read-only index, and merges either materialized matches (under
//! a single lock at shard completion) or per-shard counters (atomic add).

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use geo::{Point, Rect};
use log::debug;
use parking_lot::Mutex;

use crate::config::{BenchmarkConfig, QueryType, ResultMode};
use crate::geom::Coord;
use crate::index::SpatialIndex;
use crate::stats::TimeStat;

/// The query geometries driven through the index.
#[derive(Debug, Clone)]
pub enum Workload {
    Points(Vec<Point<Coord>>),
    Boxes(Vec<Rect<Coord>>),
}

impl Workload {
    pub fn len(&self) -> usize {
        match self {
            Self::Points(points) => points.len(),
            Self::Boxes(boxes) => boxes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Placeholder workload for variants without a query phase.
    pub fn empty() -> Self {
        Self::Boxes(Vec::new())
    }
}

/// Contiguous shard assigned to worker `tid`.
///
/// With `avg = ceil(total / parallelism)`, shard `tid` covers
/// `[min(tid * avg, total), min((tid + 1) * avg, total))`; the union over all
/// workers is exactly `[0, total)` with no gaps or overlaps.
///
/// # Examples
///
/// ```rust
/// use geomark::shard_range;
///
/// assert_eq!(shard_range(0, 10, 4), (0, 3));
/// assert_eq!(shard_range(3, 10, 4), (9, 10));
/// ```
pub fn shard_range(tid: usize, total: usize, parallelism: usize) -> (usize, usize) {
    debug_assert!(parallelism >= 1);
    let avg = total.div_ceil(parallelism);
    let begin = (tid * avg).min(total);
    let end = (begin + avg).min(total);
    (begin, end)
}

/// Time `warmup + repeat` cold builds followed by the sharded query phase.
pub fn run_query_benchmark(
    index: &mut dyn SpatialIndex,
    geoms: &[Rect<Coord>],
    workload: &Workload,
    config: &BenchmarkConfig,
) -> TimeStat {
    let mut ts = TimeStat {
        num_geoms: geoms.len(),
        num_queries: workload.len(),
        num_threads: config.parallelism,
        ..TimeStat::default()
    };
    build_phase(index, geoms, config, &mut ts);
    query_phase(index, workload, config, &mut ts);
    ts
}

/// Time cold builds only.
pub fn run_bulk_load_benchmark(
    index: &mut dyn SpatialIndex,
    geoms: &[Rect<Coord>],
    config: &BenchmarkConfig,
) -> TimeStat {
    let mut ts = TimeStat {
        num_geoms: geoms.len(),
        num_threads: 1,
        ..TimeStat::default()
    };
    build_phase(index, geoms, config, &mut ts);
    ts.num_inserts = geoms.len();
    ts
}

/// Time chunked insertion of the full dataset per iteration.
pub fn run_insertion_benchmark(
    index: &mut dyn SpatialIndex,
    geoms: &[Rect<Coord>],
    config: &BenchmarkConfig,
) -> TimeStat {
    let mut ts = TimeStat {
        num_geoms: geoms.len(),
        num_threads: 1,
        ..TimeStat::default()
    };
    let n_batches = geoms.len().div_ceil(config.batch);
    debug!("inserting in {} batches of {}", n_batches, config.batch);

    for _ in 0..config.warmup + config.repeat {
        index.clear();
        let start = Instant::now();
        for batch in 0..n_batches {
            let begin = batch * config.batch;
            let end = (begin + config.batch).min(geoms.len());
            index.insert_batch(&geoms[begin..end], begin);
        }
        ts.insert_ms.push(elapsed_ms(start));
    }
    ts.num_inserts = geoms.len();
    ts
}

/// Rebuild per iteration (untimed), then time chunked deletion of the full
/// dataset.
pub fn run_deletion_benchmark(
    index: &mut dyn SpatialIndex,
    geoms: &[Rect<Coord>],
    config: &BenchmarkConfig,
) -> TimeStat {
    let mut ts = TimeStat {
        num_geoms: geoms.len(),
        num_threads: 1,
        ..TimeStat::default()
    };
    let n_batches = geoms.len().div_ceil(config.batch);

    for _ in 0..config.warmup + config.repeat {
        index.clear();
        index.build(geoms);
        let start = Instant::now();
        let mut removed = 0;
        for batch in 0..n_batches {
            let begin = batch * config.batch;
            let end = (begin + config.batch).min(geoms.len());
            removed += index.delete_batch(&geoms[begin..end], begin);
        }
        ts.delete_ms.push(elapsed_ms(start));
        ts.num_deletes = removed;
    }
    ts
}

fn build_phase(
    index: &mut dyn SpatialIndex,
    geoms: &[Rect<Coord>],
    config: &BenchmarkConfig,
    ts: &mut TimeStat,
) {
    for _ in 0..config.warmup + config.repeat {
        index.clear();
        let start = Instant::now();
        index.build(geoms);
        ts.insert_ms.push(elapsed_ms(start));
    }
}

fn query_phase(
    index: &dyn SpatialIndex,
    workload: &Workload,
    config: &BenchmarkConfig,
    ts: &mut TimeStat,
) {
    let total_queries = workload.len();
    let reserve_hint = (config.load_factor * ts.num_geoms as f64) as usize;
    let results: Mutex<Vec<usize>> = Mutex::new(Vec::new());
    let total = AtomicU64::new(0);

    for _ in 0..config.warmup + config.repeat {
        results.lock().clear();
        total.store(0, Ordering::Relaxed);

        let start = Instant::now();
        thread::scope(|s| {
            for tid in 0..config.parallelism {
                let results = &results;
                let total = &total;
                s.spawn(move || {
                    let (begin, end) = shard_range(tid, total_queries, config.parallelism);
                    match config.result_mode {
                        ResultMode::Collect => {
                            let mut local = Vec::with_capacity(reserve_hint);
                            run_shard(index, workload, config.query_type, begin, end, &mut |id| {
                                local.push(id);
                            });
                            results.lock().append(&mut local);
                        }
                        ResultMode::Count => {
                            let mut matched = 0u64;
                            run_shard(index, workload, config.query_type, begin, end, &mut |_| {
                                matched += 1;
                            });
                            total.fetch_add(matched, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        ts.num_results = match config.result_mode {
            ResultMode::Collect => results.lock().len() as u64,
            ResultMode::Count => total.load(Ordering::Relaxed),
        };
        ts.query_ms.push(elapsed_ms(start));
    }
}

fn run_shard(
    index: &dyn SpatialIndex,
    workload: &Workload,
    query_type: QueryType,
    begin: usize,
    end: usize,
    visit: &mut dyn FnMut(usize),
) {
    match (workload, query_type) {
        (Workload::Points(points), QueryType::PointContains) => {
            for p in &points[begin..end] {
                index.point_contains(*p, visit);
            }
        }
        (Workload::Boxes(boxes), QueryType::RangeContains) => {
            for q in &boxes[begin..end] {
                index.range_contains(q, visit);
            }
        }
        (Workload::Boxes(boxes), QueryType::RangeIntersects) => {
            for q in &boxes[begin..end] {
                index.range_intersects(q, visit);
            }
        }
        _ => unreachable!("workload shape does not match query type"),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}
