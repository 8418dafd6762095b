//! Axis-aligned box relations shared by the generator and the index backends.
//!
//! Datasets are collections of `geo::Rect` values. All relations here treat
//! boxes as closed: a point on the boundary is contained, and two boxes that
//! only share an edge intersect. The generators rely on the inclusive reading
//! of these relations for their statistical guarantees.

use geo::{Point, Rect, coord};

/// Coordinate type used for all geometries.
pub type Coord = f64;

/// Smallest box enclosing every box in `boxes`, or `None` for an empty slice.
pub fn bounding_envelope(boxes: &[Rect<Coord>]) -> Option<Rect<Coord>> {
    let mut iter = boxes.iter();
    let first = *iter.next()?;
    Some(iter.fold(first, |acc, b| enclose(&acc, b)))
}

/// Smallest box enclosing both `a` and `b`.
pub fn enclose(a: &Rect<Coord>, b: &Rect<Coord>) -> Rect<Coord> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Whether `r` contains `p`, boundary included.
pub fn rect_contains_point(r: &Rect<Coord>, p: &Point<Coord>) -> bool {
    p.x() >= r.min().x && p.x() <= r.max().x && p.y() >= r.min().y && p.y() <= r.max().y
}

/// Whether `outer` contains all of `inner`, boundary included.
pub fn rect_contains_rect(outer: &Rect<Coord>, inner: &Rect<Coord>) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

/// Whether `a` and `b` share at least one point, boundary included.
pub fn rect_intersects_rect(a: &Rect<Coord>, b: &Rect<Coord>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect<Coord> {
        Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
    }

    #[test]
    fn envelope_of_empty_slice_is_none() {
        assert!(bounding_envelope(&[]).is_none());
    }

    #[test]
    fn envelope_covers_all_boxes() {
        let boxes = vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, -2.0, 6.0, 3.0)];
        let env = bounding_envelope(&boxes).unwrap();
        assert_eq!(env.min().x, 0.0);
        assert_eq!(env.min().y, -2.0);
        assert_eq!(env.max().x, 6.0);
        assert_eq!(env.max().y, 3.0);
        for b in &boxes {
            assert!(rect_contains_rect(&env, b));
        }
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let r = rect(0.0, 0.0, 2.0, 2.0);
        assert!(rect_contains_point(&r, &Point::new(0.0, 0.0)));
        assert!(rect_contains_point(&r, &Point::new(2.0, 1.0)));
        assert!(!rect_contains_point(&r, &Point::new(2.1, 1.0)));
        assert!(rect_contains_rect(&r, &r));
        assert!(rect_contains_rect(&r, &rect(0.0, 0.0, 1.0, 1.0)));
        assert!(!rect_contains_rect(&rect(0.0, 0.0, 1.0, 1.0), &r));
    }

    #[test]
    fn intersection_counts_shared_edges() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let c = rect(1.5, 1.5, 2.0, 2.0);
        assert!(rect_intersects_rect(&a, &b));
        assert!(!rect_intersects_rect(&a, &c));
        assert!(rect_intersects_rect(&b, &c));
    }
}
