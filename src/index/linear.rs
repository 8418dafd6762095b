//! Exhaustive-scan baseline backend.
//!
//! Answers every predicate by scanning the whole dataset. Useless in
//! production, invaluable in a benchmark: it gives a floor to compare real
//! indexes against and a second, trivially-correct implementation for
//! cross-checking backend results in tests.

use geo::{Point, Rect};

use crate::geom::{self, Coord};

use super::SpatialIndex;

pub struct LinearScanIndex {
    boxes: Vec<(usize, Rect<Coord>)>,
}

impl LinearScanIndex {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }
}

impl Default for LinearScanIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for LinearScanIndex {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn clear(&mut self) {
        self.boxes.clear();
    }

    fn build(&mut self, boxes: &[Rect<Coord>]) {
        self.boxes = boxes.iter().copied().enumerate().collect();
    }

    fn insert_batch(&mut self, boxes: &[Rect<Coord>], offset: usize) {
        self.boxes
            .extend(boxes.iter().enumerate().map(|(i, r)| (offset + i, *r)));
    }

    fn delete_batch(&mut self, boxes: &[Rect<Coord>], offset: usize) -> usize {
        let before = self.boxes.len();
        let doomed = offset..offset + boxes.len();
        self.boxes.retain(|(id, _)| !doomed.contains(id));
        before - self.boxes.len()
    }

    fn point_contains(&self, p: Point<Coord>, visit: &mut dyn FnMut(usize)) {
        for (id, rect) in &self.boxes {
            if geom::rect_contains_point(rect, &p) {
                visit(*id);
            }
        }
    }

    fn range_contains(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize)) {
        for (id, rect) in &self.boxes {
            if geom::rect_contains_rect(rect, query) {
                visit(*id);
            }
        }
    }

    fn range_intersects(&self, query: &Rect<Coord>, visit: &mut dyn FnMut(usize)) {
        for (id, rect) in &self.boxes {
            if geom::rect_intersects_rect(rect, query) {
                visit(*id);
            }
        }
    }
}
