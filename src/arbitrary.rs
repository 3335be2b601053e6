//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! The generated coordinates are biased towards coincidences: a coordinate
//! has a good chance of being equal (or very nearly equal) to the previous
//! one, because that's where sweep algorithms tend to go wrong.

use arbitrary::Unstructured;
use kurbo::Point;

use crate::{Box3, Building, GeometryModel, Point3, Polygon2, Segment2};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate a float in some range, but give it a chance to be equal or close to another float.
pub fn another_float_in_range(
    orig: f64,
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    match u.int_in_range(0..=3u8)? {
        0 => Ok(orig),
        1 => {
            let ulps: i32 = u.int_in_range(-32..=32)?;
            let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
            Ok((orig * scale).clamp(start, end))
        }
        _ => float_in_range(start, end, u),
    }
}

// Coordinates are either small integers (lots of exact coincidences) or
// arbitrary floats in a moderate range.
fn coord(prev: f64, u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    if u.arbitrary()? {
        Ok(f64::from(u.int_in_range(-8..=8i8)?))
    } else {
        another_float_in_range(prev, -100.0, 100.0, u)
    }
}

/// Generate an arbitrary point in the plane.
pub fn point(prev: Point, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(coord(prev.x, u)?, coord(prev.y, u)?))
}

/// Generate an arbitrary point in space.
pub fn point3(prev: Point3, u: &mut Unstructured<'_>) -> Result<Point3, arbitrary::Error> {
    Ok(Point3::new(
        coord(prev.x, u)?,
        coord(prev.y, u)?,
        coord(prev.z, u)?,
    ))
}

/// Generate an arbitrary segment, with a chance of sharing an endpoint with `prev`.
pub fn segment(prev: &Segment2, u: &mut Unstructured<'_>) -> Result<Segment2, arbitrary::Error> {
    let start = if u.ratio(1, 4)? {
        prev.end
    } else {
        point(prev.start, u)?
    };
    let end = point(prev.end, u)?;
    Ok(Segment2::new(start, end))
}

/// Generate a model containing only segments.
pub fn segments(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    let mut prev = Segment2::new((0.0, 0.0), (1.0, 1.0));
    for _ in 0..u.int_in_range(0..=24)? {
        prev = segment(&prev, u)?;
        ret.add_segment(prev)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(ret)
}

/// Generate a model containing only segments with small integer coordinates.
///
/// These have lots of exactly-coincident endpoints, overlaps, and concurrent
/// crossings, but no near misses.
pub fn grid_segments(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    let grid_point = |u: &mut Unstructured<'_>| -> Result<Point, arbitrary::Error> {
        Ok(Point::new(
            f64::from(u.int_in_range(0..=6u8)?),
            f64::from(u.int_in_range(0..=6u8)?),
        ))
    };
    for _ in 0..u.int_in_range(0..=16)? {
        let s = Segment2::new(grid_point(u)?, grid_point(u)?);
        ret.add_segment(s)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(ret)
}

/// Generate a model containing only boxes.
pub fn boxes(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    let mut prev = Point3::new(0.0, 0.0, 0.0);
    for _ in 0..u.int_in_range(0..=16)? {
        let a = point3(prev, u)?;
        let b = point3(a, u)?;
        prev = b;
        let b = Box3::from_corners(a, b).map_err(|_| arbitrary::Error::IncorrectFormat)?;
        ret.add_box(b);
    }
    Ok(ret)
}

/// Generate a model containing only polygons.
pub fn polygons(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    for _ in 0..u.int_in_range(0..=4)? {
        let mut prev = Point::ZERO;
        let mut vertices = Vec::new();
        for _ in 0..u.int_in_range(3..=12)? {
            prev = point(prev, u)?;
            vertices.push(prev);
        }
        let p = Polygon2::new(vertices).map_err(|_| arbitrary::Error::IncorrectFormat)?;
        ret.add_polygon(p);
    }
    Ok(ret)
}

/// Generate a model containing only points.
pub fn points(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    let mut prev = Point3::new(0.0, 0.0, 0.0);
    for _ in 0..u.int_in_range(0..=64)? {
        prev = point3(prev, u)?;
        ret.add_point(prev)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(ret)
}

/// Generate a model containing only buildings.
pub fn buildings(u: &mut Unstructured<'_>) -> Result<GeometryModel, arbitrary::Error> {
    let mut ret = GeometryModel::new();
    let mut prev = 0.0;
    for _ in 0..u.int_in_range(0..=24)? {
        let a = coord(prev, u)?;
        let b = coord(a, u)?;
        prev = b;
        let height = f64::from(u.int_in_range(0..=10u8)?);
        let b = Building::new(a.min(b), a.max(b), height)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
        ret.add_building(b);
    }
    Ok(ret)
}
