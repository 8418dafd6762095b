//! Binary geometry caches.
//!
//! Parsing large WKT files dominates startup, so parsed datasets can be
//! cached next to the benchmark in a trivial binary layout: a leading `u64`
//! checksum sentinel, a record count, raw fixed-width little-endian `f64`
//! records, and a trailing repeat of the sentinel. The format makes no
//! attempt at portability across numeric widths or endianness; it is a local
//! cache, nothing more. A wrong sentinel or truncated payload is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};
use geo::{Point, Rect, coord};
use log::info;

use crate::error::{GeomarkError, Result};
use crate::geom::Coord;
use crate::loader;

/// Sentinel written at both ends of every cache file.
pub const CACHE_MAGIC: u64 = 0xabcd_abcd;

const HEADER_BYTES: usize = 2 * 8;
const TRAILER_BYTES: usize = 8;
const BOX_RECORD_BYTES: usize = 4 * 8;
const POINT_RECORD_BYTES: usize = 2 * 8;

/// Load boxes through the cache in `cache_dir`, parsing WKT on a miss.
pub fn load_boxes_cached(path: &Path, cache_dir: &Path, limit: usize) -> Result<Vec<Rect<Coord>>> {
    let cache_path = cache_file(path, cache_dir, limit)?;
    if cache_path.is_file() {
        let boxes = read_box_cache(&cache_path)?;
        info!(
            "read {} geometries from cache {}",
            boxes.len(),
            cache_path.display()
        );
        return Ok(boxes);
    }
    let boxes = loader::load_boxes(path, limit)?;
    write_box_cache(&cache_path, &boxes)?;
    info!(
        "cached {} geometries at {}",
        boxes.len(),
        cache_path.display()
    );
    Ok(boxes)
}

/// Load points through the cache in `cache_dir`, parsing WKT on a miss.
pub fn load_points_cached(
    path: &Path,
    cache_dir: &Path,
    limit: usize,
) -> Result<Vec<Point<Coord>>> {
    let cache_path = cache_file(path, cache_dir, limit)?;
    if cache_path.is_file() {
        let points = read_point_cache(&cache_path)?;
        info!(
            "read {} points from cache {}",
            points.len(),
            cache_path.display()
        );
        return Ok(points);
    }
    let points = loader::load_points(path, limit)?;
    write_point_cache(&cache_path, &points)?;
    info!("cached {} points at {}", points.len(), cache_path.display());
    Ok(points)
}

pub fn write_box_cache(path: &Path, boxes: &[Rect<Coord>]) -> Result<()> {
    let mut buf =
        BytesMut::with_capacity(HEADER_BYTES + boxes.len() * BOX_RECORD_BYTES + TRAILER_BYTES);
    buf.put_u64_le(CACHE_MAGIC);
    buf.put_u64_le(boxes.len() as u64);
    for b in boxes {
        buf.put_f64_le(b.min().x);
        buf.put_f64_le(b.min().y);
        buf.put_f64_le(b.max().x);
        buf.put_f64_le(b.max().y);
    }
    buf.put_u64_le(CACHE_MAGIC);
    fs::write(path, &buf)?;
    Ok(())
}

pub fn read_box_cache(path: &Path) -> Result<Vec<Rect<Coord>>> {
    let contents = fs::read(path)?;
    let mut buf = contents.as_slice();
    let count = read_header(&mut buf, path, BOX_RECORD_BYTES)?;

    let mut boxes = Vec::with_capacity(count);
    for _ in 0..count {
        let min_x = buf.get_f64_le();
        let min_y = buf.get_f64_le();
        let max_x = buf.get_f64_le();
        let max_y = buf.get_f64_le();
        boxes.push(Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: max_x, y: max_y },
        ));
    }
    read_trailer(&mut buf, path)?;
    Ok(boxes)
}

pub fn write_point_cache(path: &Path, points: &[Point<Coord>]) -> Result<()> {
    let mut buf =
        BytesMut::with_capacity(HEADER_BYTES + points.len() * POINT_RECORD_BYTES + TRAILER_BYTES);
    buf.put_u64_le(CACHE_MAGIC);
    buf.put_u64_le(points.len() as u64);
    for p in points {
        buf.put_f64_le(p.x());
        buf.put_f64_le(p.y());
    }
    buf.put_u64_le(CACHE_MAGIC);
    fs::write(path, &buf)?;
    Ok(())
}

pub fn read_point_cache(path: &Path) -> Result<Vec<Point<Coord>>> {
    let contents = fs::read(path)?;
    let mut buf = contents.as_slice();
    let count = read_header(&mut buf, path, POINT_RECORD_BYTES)?;

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = buf.get_f64_le();
        let y = buf.get_f64_le();
        points.push(Point::new(x, y));
    }
    read_trailer(&mut buf, path)?;
    Ok(points)
}

/// Validate the leading sentinel and that the payload length matches the
/// declared record count exactly. Returns the record count.
fn read_header(buf: &mut &[u8], path: &Path, record_bytes: usize) -> Result<usize> {
    if buf.remaining() < HEADER_BYTES {
        return Err(bad_cache(path));
    }
    if buf.get_u64_le() != CACHE_MAGIC {
        return Err(bad_cache(path));
    }
    let count = buf.get_u64_le() as usize;
    let expected = count
        .checked_mul(record_bytes)
        .and_then(|n| n.checked_add(TRAILER_BYTES))
        .ok_or_else(|| bad_cache(path))?;
    if buf.remaining() != expected {
        return Err(bad_cache(path));
    }
    Ok(count)
}

fn read_trailer(buf: &mut &[u8], path: &Path) -> Result<()> {
    if buf.get_u64_le() != CACHE_MAGIC {
        return Err(bad_cache(path));
    }
    Ok(())
}

fn bad_cache(path: &Path) -> GeomarkError {
    GeomarkError::BadCache {
        path: path.display().to_string(),
    }
}

/// Cache file path for `path`, creating `cache_dir` if needed. The source
/// path is flattened into the file name; a read limit is appended so a
/// truncated cache is never mistaken for the full dataset.
fn cache_file(path: &Path, cache_dir: &Path, limit: usize) -> Result<PathBuf> {
    fs::create_dir_all(cache_dir)?;
    let mut escaped: String = path
        .to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    if limit != usize::MAX {
        escaped = format!("{escaped}-{limit}");
    }
    Ok(cache_dir.join(format!("{escaped}.bin")))
}
