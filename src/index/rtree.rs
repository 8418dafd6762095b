//! R-tree backend and the generator's helper index, both on `rstar`.

use geo::{Point, Rect};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geom::{self, Coord};

use super::SpatialIndex;

/// A dataset box wrapped for storage in an `rstar::RTree`.
///
/// The id is the box's position in the source dataset; it is part of the
/// identity so duplicate rectangles stay distinguishable under deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBox {
    pub id: usize,
    pub rect: Rect<Coord>,
}

impl IndexedBox {
    pub fn new(id: usize, rect: Rect<Coord>) -> Self {
        Self { id, rect }
    }
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[Coord; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_aabb(&self.rect)
    }
}

impl PointDistance for IndexedBox {
    fn distance_2(&self, point: &[Coord; 2]) -> Coord {
        self.envelope().distance_2(point)
    }
}

/// Convert a `geo::Rect` into the equivalent rstar envelope.
pub fn to_aabb(rect: &Rect<Coord>) -> AABB<[Coord; 2]> {
    AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    )
}

/// Bulk-load a helper tree over a dataset, ids following slice order.
///
/// Used by the workload generator for its 1-NN/k-NN probes and intersection
/// counts; the benchmarked backend below shares the same element type.
pub fn build_helper_tree(boxes: &[Rect<Coord>]) -> RTree<IndexedBox> {
    RTree::bulk_load(
        boxes
            .iter()
            .enumerate()
            .map(|(id, rect)| IndexedBox::new(id, *rect))
            .collect(),
    )
}

/// R-tree backend backed by the `rstar` crate.
pub struct RTreeIndex {
    tree: RTree<IndexedBox>,
}

impl RTreeIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }
}

impl Default for RTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for RTreeIndex {
    fn name(&self) -> &'static str {
        "rtree"
    }

    fn len(&self) -> usize {
        self.tree.size()
    }

    fn clear(&mut self) {
        self.tree = RTree::new();
    }

    fn build(&mut self, boxes: &[Rect<Coord>]) {
        self.tree = build_helper_tree(boxes);
    }

    fn insert_batch(&mut self, boxes: &[Rect<Coord>], offset: usize) {
        for (i, rect) in boxes.iter().enumerate() {
            self.tree.insert(IndexedBox::new(offset + i, *rect));
        }
    }

    fn delete_batch(&mut self, boxes: &[Rect<Coord>], offset: usize) -> usize {
        let mut removed = 0;
        for (i, rect) in boxes.iter().enumerate() {
            if self.tree.remove(&IndexedBox::new(offset + i, *rect)).is_some() {
                removed += 1;
            }
        }
        removed
    }

    fn point_contains(&self, p: Point<Coord>, visit: &mut dyn FnMut(usize)) {
        for b in self.tree.locate_all_at_point(&[p.x(), p.y()]) {
            visit(b.id);
        }
    }

    fn range_contains(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize)) {
        for b in self.tree.locate_in_envelope_intersecting(&to_aabb(query)) {
            if geom::rect_contains_rect(&b.rect, query) {
                visit(b.id);
            }
        }
    }

    fn range_intersects(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize)) {
        for b in self.tree.locate_in_envelope_intersecting(&to_aabb(query)) {
            if geom::rect_intersects_rect(&b.rect, query) {
                visit(b.id);
            }
        }
    }
}
