//! Workload generators with statistically controlled properties.
//!
//! Every generator builds a read-only helper R-tree over the input dataset
//! and draws query geometries whose relationship to the dataset is known by
//! construction: points that are covered by at least one box, boxes nested
//! inside an input box, or boxes intersecting at least a target number of
//! inputs. Workloads are reproducible: the same seed and parallelism always
//! produce the same query sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use geo::{Point, Rect, coord};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

use crate::config::hardware_parallelism;
use crate::error::{GeomarkError, Result};
use crate::geom::{self, Coord};
use crate::harness::shard_range;
use crate::index::rtree::{IndexedBox, build_helper_tree, to_aabb};

/// Tuning for [`generate_intersects_queries`].
#[derive(Debug, Clone)]
pub struct IntersectsConfig {
    /// Minimum number of dataset boxes each query must intersect
    pub min_qualified: usize,
    /// Number of queries to produce
    pub num_queries: usize,
    /// Base seed; each worker derives its own generator from it
    pub seed: u64,
    /// Generator worker count; 0 resolves to hardware concurrency
    pub parallelism: usize,
    /// A candidate matching more than `overshoot_factor * min_qualified`
    /// boxes is discarded and redrawn
    pub overshoot_factor: f64,
    /// Redraw budget per query before settling for the tightest candidate
    pub max_retries: usize,
}

impl Default for IntersectsConfig {
    fn default() -> Self {
        Self {
            min_qualified: 10,
            num_queries: 100,
            seed: 0,
            parallelism: 0,
            overshoot_factor: 10.0,
            max_retries: 64,
        }
    }
}

/// Queries produced by the intersects generator, plus the realized
/// aggregate selectivity `sum(intersection counts) / (|data| * num_queries)`.
#[derive(Debug, Clone)]
pub struct IntersectsOutcome {
    pub queries: Vec<Rect<Coord>>,
    pub selectivity: f64,
}

/// Generate points that are each covered by at least one dataset box.
///
/// Each draw picks a uniform location in the dataset envelope, walks to the
/// nearest box, and emits a uniform point inside that box's extent.
pub fn generate_point_queries(
    data: &[Rect<Coord>],
    num_queries: usize,
    seed: u64,
) -> Result<Vec<Point<Coord>>> {
    let envelope = non_empty_envelope(data)?;
    let tree = build_helper_tree(data);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut queries = Vec::with_capacity(num_queries);

    while queries.len() < num_queries {
        let (x, y) = random_point_in(&envelope, &mut rng);
        let Some(nearest) = tree.nearest_neighbor_iter(&[x, y]).next() else {
            break;
        };
        let b = nearest.rect;
        queries.push(Point::new(
            rng.gen_range(b.min().x..=b.max().x),
            rng.gen_range(b.min().y..=b.max().y),
        ));
    }
    Ok(queries)
}

/// Generate boxes that are each nested inside some dataset box.
///
/// The min corner is drawn uniformly inside the sampled box, then the max
/// corner uniformly between the min corner and the box's own max corner, so
/// containment holds by construction.
pub fn generate_contains_queries(
    data: &[Rect<Coord>],
    num_queries: usize,
    seed: u64,
) -> Result<Vec<Rect<Coord>>> {
    let envelope = non_empty_envelope(data)?;
    let tree = build_helper_tree(data);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut queries = Vec::with_capacity(num_queries);

    while queries.len() < num_queries {
        let (x, y) = random_point_in(&envelope, &mut rng);
        let Some(nearest) = tree.nearest_neighbor_iter(&[x, y]).next() else {
            break;
        };
        let b = nearest.rect;
        let min_x = rng.gen_range(b.min().x..=b.max().x);
        let min_y = rng.gen_range(b.min().y..=b.max().y);
        let max_x = rng.gen_range(min_x..=b.max().x);
        let max_y = rng.gen_range(min_y..=b.max().y);
        queries.push(Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: max_x, y: max_y },
        ));
    }
    Ok(queries)
}

/// Generate boxes that each intersect at least `min_qualified` dataset boxes,
/// by rejection sampling.
///
/// Per query: draw a point in the dataset envelope, fetch its `min_qualified`
/// nearest boxes, and grow an envelope from the point one neighbor at a time
/// (nearest first), recounting true intersections after every inclusion and
/// stopping as soon as the target is met. A candidate overshooting the target
/// by more than `overshoot_factor` is discarded and redrawn, at most
/// `max_retries` times; when the budget runs out the tightest candidate seen
/// is emitted and a warning logged, so generation always terminates.
///
/// Workers generate disjoint shards with independent generators derived from
/// `(seed, thread id)`; shard buffers are concatenated in thread-id order, so
/// output is deterministic for a fixed seed and parallelism.
pub fn generate_intersects_queries(
    data: &[Rect<Coord>],
    config: &IntersectsConfig,
) -> Result<IntersectsOutcome> {
    let envelope = non_empty_envelope(data)?;
    if config.min_qualified == 0 {
        return Err(GeomarkError::InvalidConfig(
            "min_qualified must be at least 1".into(),
        ));
    }
    if !config.overshoot_factor.is_finite() || config.overshoot_factor < 1.0 {
        return Err(GeomarkError::InvalidConfig(format!(
            "overshoot_factor must be at least 1.0, got {}",
            config.overshoot_factor
        )));
    }
    if config.num_queries == 0 {
        return Ok(IntersectsOutcome {
            queries: Vec::new(),
            selectivity: 0.0,
        });
    }
    let parallelism = match config.parallelism {
        0 => hardware_parallelism(),
        n => n,
    };

    debug!(
        "query envelope x [{}, {}], y [{}, {}]",
        envelope.min().x,
        envelope.max().x,
        envelope.min().y,
        envelope.max().y
    );

    let tree = build_helper_tree(data);
    let total_intersects = AtomicU64::new(0);
    let mut shards: Vec<Vec<Rect<Coord>>> = Vec::new();
    shards.resize_with(parallelism, Vec::new);

    thread::scope(|s| {
        for (tid, shard) in shards.iter_mut().enumerate() {
            let tree = &tree;
            let envelope = &envelope;
            let total_intersects = &total_intersects;
            s.spawn(move || {
                let (begin, end) = shard_range(tid, config.num_queries, parallelism);
                let mut rng = StdRng::seed_from_u64(worker_seed(config.seed, tid as u64));
                shard.reserve(end - begin);
                for _ in begin..end {
                    let (query, matched) = sample_query(tree, envelope, &mut rng, config);
                    total_intersects.fetch_add(matched, Ordering::Relaxed);
                    shard.push(query);
                }
            });
        }
    });

    let queries: Vec<Rect<Coord>> = shards.into_iter().flatten().collect();
    let selectivity = total_intersects.load(Ordering::Relaxed) as f64
        / (data.len() as f64 * config.num_queries as f64);
    info!("realized selectivity {selectivity}");

    Ok(IntersectsOutcome {
        queries,
        selectivity,
    })
}

/// One rejection-sampling round: keep redrawing while the candidate
/// overshoots, up to the retry budget, tracking the tightest candidate.
fn sample_query(
    tree: &RTree<IndexedBox>,
    envelope: &Rect<Coord>,
    rng: &mut StdRng,
    config: &IntersectsConfig,
) -> (Rect<Coord>, u64) {
    let (mut query, mut matched) = grow_candidate(tree, envelope, rng, config.min_qualified);
    let mut retries = 0;
    while is_overshoot(matched, config) && retries < config.max_retries {
        let (candidate, n) = grow_candidate(tree, envelope, rng, config.min_qualified);
        if n < matched {
            query = candidate;
            matched = n;
        }
        retries += 1;
    }
    if is_overshoot(matched, config) {
        warn!(
            "intersects query matches {} boxes after {} retries (target {})",
            matched, config.max_retries, config.min_qualified
        );
    }
    (query, matched)
}

fn is_overshoot(matched: u64, config: &IntersectsConfig) -> bool {
    config.min_qualified > 1
        && matched as f64 / config.min_qualified as f64 > config.overshoot_factor
}

/// Grow an envelope from a random seed point over its nearest neighbors
/// until it truly intersects `min_qualified` boxes, or the neighbors run out
/// (possible only when the dataset is smaller than the target).
fn grow_candidate(
    tree: &RTree<IndexedBox>,
    envelope: &Rect<Coord>,
    rng: &mut StdRng,
    min_qualified: usize,
) -> (Rect<Coord>, u64) {
    let (x, y) = random_point_in(envelope, rng);
    let mut query = Rect::new(coord! { x: x, y: y }, coord! { x: x, y: y });
    let mut matched = 0u64;

    for neighbor in tree.nearest_neighbor_iter(&[x, y]).take(min_qualified) {
        query = geom::enclose(&query, &neighbor.rect);
        matched = count_intersections(tree, &query);
        if matched as usize >= min_qualified {
            break;
        }
    }
    (query, matched)
}

fn count_intersections(tree: &RTree<IndexedBox>, query: &Rect<Coord>) -> u64 {
    tree.locate_in_envelope_intersecting(&to_aabb(query))
        .filter(|b| geom::rect_intersects_rect(&b.rect, query))
        .count() as u64
}

fn random_point_in(envelope: &Rect<Coord>, rng: &mut StdRng) -> (Coord, Coord) {
    (
        rng.gen_range(envelope.min().x..=envelope.max().x),
        rng.gen_range(envelope.min().y..=envelope.max().y),
    )
}

fn non_empty_envelope(data: &[Rect<Coord>]) -> Result<Rect<Coord>> {
    geom::bounding_envelope(data).ok_or_else(|| {
        GeomarkError::InvalidConfig("cannot generate queries over an empty dataset".into())
    })
}

/// Derive an independent per-worker seed from the base seed and thread id
/// (splitmix64 finalizer).
fn worker_seed(seed: u64, tid: u64) -> u64 {
    let mut z = seed
        .wrapping_add(tid.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
