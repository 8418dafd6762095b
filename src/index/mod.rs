//! Backend abstraction for the benchmarked spatial indexes.
//!
//! The harness and the generator only ever talk to [`SpatialIndex`], so each
//! backend is written once and every query variant runs against all of them.
//! Match reporting goes through a visitor callback, which lets the caller
//! either materialize matches or just count them without touching the
//! backend code.

pub mod linear;
pub mod rtree;

use geo::{Point, Rect};

use crate::config::IndexType;
use crate::geom::Coord;

pub use linear::LinearScanIndex;
pub use rtree::RTreeIndex;

/// A spatial-index backend under benchmark.
///
/// Dataset boxes are identified by their position in the slice passed to
/// [`build`](Self::build) (or by `offset + i` for batched updates). Query
/// methods report matching ids through `visit` and never allocate on behalf
/// of the caller. Implementations must be safe to query concurrently from
/// multiple threads while no mutation is in flight.
pub trait SpatialIndex: Send + Sync {
    /// Backend name as spelled on the command line.
    fn name(&self) -> &'static str;

    /// Number of boxes currently indexed.
    fn len(&self) -> usize;

    /// Whether the index holds no boxes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all indexed boxes.
    fn clear(&mut self);

    /// Bulk-construct the index over `boxes`, assigning ids `0..boxes.len()`.
    fn build(&mut self, boxes: &[Rect<Coord>]);

    /// Insert `boxes` one by one with ids `offset..offset + boxes.len()`.
    fn insert_batch(&mut self, boxes: &[Rect<Coord>], offset: usize);

    /// Remove the boxes with ids `offset..offset + boxes.len()`; returns how
    /// many were actually present.
    fn delete_batch(&mut self, boxes: &[Rect<Coord>], offset: usize) -> usize;

    /// Visit ids of indexed boxes containing `p` (boundary inclusive).
    fn point_contains(&self, p: Point<Coord>, visit: &mut dyn FnMut(usize));

    /// Visit ids of indexed boxes containing all of `query`.
    fn range_contains(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize));

    /// Visit ids of indexed boxes sharing at least one point with `query`.
    fn range_intersects(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize));
}

/// Instantiate the backend selected by the configuration.
pub fn create_index(kind: IndexType) -> Box<dyn SpatialIndex> {
    match kind {
        IndexType::RTree => Box::new(RTreeIndex::new()),
        IndexType::Linear => Box::new(LinearScanIndex::new()),
    }
}
