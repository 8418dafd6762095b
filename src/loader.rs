//! WKT geometry loaders and dumpers.
//!
//! Inputs are line-oriented WKT files. Box datasets accept `POLYGON` and
//! `MULTIPOLYGON` lines and reduce each to its bounding box; point datasets
//! additionally accept `POINT` lines and flatten polygon vertices. Any line
//! that fails to parse or carries an unsupported geometry kind is a fatal
//! data error identifying the file and line number.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use geo::{BoundingRect, Geometry, Point, Polygon, Rect};
use log::debug;
use wkt::{ToWkt, Wkt};

use crate::error::{GeomarkError, Result};
use crate::geom::Coord;

/// Load boxes from a WKT file, keeping at most `limit` geometries.
pub fn load_boxes(path: &Path, limit: usize) -> Result<Vec<Rect<Coord>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut boxes = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let lno = idx + 1;
        let rect = match parse_line(path, lno, &line)? {
            Geometry::Polygon(poly) => poly.bounding_rect(),
            Geometry::MultiPolygon(mp) => mp.bounding_rect(),
            _ => None,
        }
        .ok_or_else(|| bad_geometry(path, lno))?;
        boxes.push(rect);

        if boxes.len() % 1000 == 0 {
            debug!("loaded {} K geometries from {}", boxes.len() / 1000, path.display());
        }
        if boxes.len() >= limit {
            break;
        }
    }
    Ok(boxes)
}

/// Load points from a WKT file, keeping at most `limit` geometries.
///
/// Polygon lines contribute their outer-ring vertices.
pub fn load_points(path: &Path, limit: usize) -> Result<Vec<Point<Coord>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut points = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let lno = idx + 1;
        match parse_line(path, lno, &line)? {
            Geometry::Point(p) => points.push(p),
            Geometry::Polygon(poly) => points.extend(poly.exterior().points()),
            Geometry::MultiPolygon(mp) => {
                for poly in &mp {
                    points.extend(poly.exterior().points());
                }
            }
            _ => return Err(bad_geometry(path, lno)),
        }
        if points.len() % 1000 == 0 {
            debug!("loaded {} K points from {}", points.len() / 1000, path.display());
        }
        if points.len() >= limit {
            break;
        }
    }
    Ok(points)
}

/// Load polygons from a WKT file, keeping at most `limit` geometries.
pub fn load_polygons(path: &Path, limit: usize) -> Result<Vec<Polygon<Coord>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut polygons = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let lno = idx + 1;
        match parse_line(path, lno, &line)? {
            Geometry::Polygon(poly) => polygons.push(poly),
            Geometry::MultiPolygon(mp) => polygons.extend(mp),
            _ => return Err(bad_geometry(path, lno)),
        }
        if polygons.len() >= limit {
            break;
        }
    }
    Ok(polygons)
}

/// Write points as one `POINT` WKT per line.
pub fn dump_points(path: &Path, points: &[Point<Coord>]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for p in points {
        writeln!(writer, "{}", p.wkt_string())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write boxes as one rectangular `POLYGON` WKT per line.
pub fn dump_boxes(path: &Path, boxes: &[Rect<Coord>]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for b in boxes {
        writeln!(writer, "{}", b.to_polygon().wkt_string())?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_line(path: &Path, lno: usize, line: &str) -> Result<Geometry<Coord>> {
    let parsed = Wkt::<Coord>::from_str(line).map_err(|_| bad_geometry(path, lno))?;
    Geometry::try_from(parsed).map_err(|_| bad_geometry(path, lno))
}

fn bad_geometry(path: &Path, lno: usize) -> GeomarkError {
    GeomarkError::BadGeometry {
        path: path.display().to_string(),
        line: lno,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn polygons_load_as_bounding_boxes() {
        let file = write_temp(
            "POLYGON((0 0,4 0,4 3,0 3,0 0))\n\
             \n\
             MULTIPOLYGON(((10 10,12 10,12 12,10 12,10 10)),((20 20,21 20,21 21,20 21,20 20)))\n",
        );
        let boxes = load_boxes(file.path(), usize::MAX).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].min().x, 0.0);
        assert_eq!(boxes[0].max().x, 4.0);
        assert_eq!(boxes[0].max().y, 3.0);
        // multipolygon collapses to the envelope over all parts
        assert_eq!(boxes[1].min().x, 10.0);
        assert_eq!(boxes[1].max().x, 21.0);
    }

    #[test]
    fn limit_caps_loaded_boxes() {
        let file = write_temp(
            "POLYGON((0 0,1 0,1 1,0 1,0 0))\n\
             POLYGON((2 2,3 2,3 3,2 3,2 2))\n\
             POLYGON((4 4,5 4,5 5,4 5,4 4))\n",
        );
        let boxes = load_boxes(file.path(), 2).unwrap();
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn points_load_from_points_and_polygon_vertices() {
        let file = write_temp("POINT(1 2)\nPOLYGON((0 0,1 0,1 1,0 1,0 0))\n");
        let points = load_points(file.path(), usize::MAX).unwrap();
        // one POINT plus the five vertices of the closed ring
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], Point::new(1.0, 2.0));
    }

    #[test]
    fn malformed_lines_are_fatal() {
        let file = write_temp("POLYGON((0 0,1 0,1 1,0 1,0 0))\nnot a geometry\n");
        let err = load_boxes(file.path(), usize::MAX).unwrap_err();
        assert!(matches!(err, GeomarkError::BadGeometry { line: 2, .. }));
    }

    #[test]
    fn unsupported_kinds_are_fatal_for_boxes() {
        let file = write_temp("POINT(1 2)\n");
        assert!(load_boxes(file.path(), usize::MAX).is_err());
    }

    #[test]
    fn dumped_boxes_load_back_identically() {
        let data = vec![
            Rect::new(geo::coord! { x: 0.5, y: 1.5 }, geo::coord! { x: 2.0, y: 4.0 }),
            Rect::new(geo::coord! { x: -3.0, y: -1.0 }, geo::coord! { x: 0.0, y: 0.25 }),
        ];
        let file = tempfile::NamedTempFile::new().unwrap();
        dump_boxes(file.path(), &data).unwrap();
        let loaded = load_boxes(file.path(), usize::MAX).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn dumped_points_load_back_identically() {
        let data = vec![Point::new(1.25, -2.5), Point::new(0.0, 9.75)];
        let file = tempfile::NamedTempFile::new().unwrap();
        dump_points(file.path(), &data).unwrap();
        let loaded = load_points(file.path(), usize::MAX).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn polygons_load_with_their_rings() {
        let file = write_temp("POLYGON((0 0,4 0,4 3,0 3,0 0))\n");
        let polygons = load_polygons(file.path(), usize::MAX).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].exterior().0.len(), 5);
    }
}
