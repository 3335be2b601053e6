//! Utilities for generating examples, benchmarks, and test cases.
//!
//! Everything here is deterministic: the same arguments always give the same model.

use kurbo::Point;

use crate::{Box3, Building, GeometryModel, Point3, Polygon2, Segment2};

/// Generate an `n` by `n` by `n` grid of overlapping cubes.
///
/// Each cube has side length `size`, and consecutive cubes are `offset` apart
/// along each axis, so they overlap whenever `offset < size`.
pub fn cube_grid(n: usize, size: f64, offset: f64) -> GeometryModel {
    let mut ret = GeometryModel::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let min = Point3::new(i as f64 * offset, j as f64 * offset, k as f64 * offset);
                let max = Point3::new(min.x + size, min.y + size, min.z + size);
                // Every coordinate is finite and min <= max, so this can't fail.
                if let Ok(b) = Box3::new(min, max) {
                    ret.add_box(b);
                }
            }
        }
    }
    ret
}

/// Generate `n` long, skinny boxes going along each of the three axes.
///
/// Every box along one axis meets every box along the other two, so the
/// volume sweep has lots of overlapping cross-sections to deal with.
pub fn jackstraws(n: usize) -> GeometryModel {
    let len = 10.0 * n as f64;
    let mut ret = GeometryModel::new();
    for i in 0..n {
        let a = 10.0 * i as f64;
        let corners = [
            ((0.0, a, a), (len, a + 5.0, a + 5.0)),
            ((a, 0.0, a), (a + 5.0, len, a + 5.0)),
            ((a, a, 0.0), (a + 5.0, a + 5.0, len)),
        ];
        for (min, max) in corners {
            if let Ok(b) = Box3::new(min, max) {
                ret.add_box(b);
            }
        }
    }
    ret
}

/// Generate `n` segments going from bottom-left to top-right, and `n` more
/// going from top-left to bottom-right.
///
/// Every segment in the first family crosses every segment in the second,
/// so there are `n * n` intersections.
pub fn slanties(n: usize) -> GeometryModel {
    let h = 20.0 * n as f64;
    let mut ret = GeometryModel::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        let up = Segment2::new((x_off, 0.0), (x_off + h, h));
        let down = Segment2::new((x_off + h, 0.0), (x_off, h));
        for s in [up, down] {
            // The coordinates are finite, so this can't fail.
            let _ = ret.add_segment(s);
        }
    }
    ret
}

/// Generate `n` nearly-parallel segments that mostly don't intersect.
///
/// This is the good case for a sweep-line algorithm: the brute-force
/// algorithm still has to look at all `n * n` pairs.
pub fn sparse_segments(n: usize) -> GeometryModel {
    let mut ret = GeometryModel::new();
    for i in 0..n {
        let y = 3.0 * i as f64;
        let x = 7.0 * (i % 5) as f64;
        let _ = ret.add_segment(Segment2::new((x, y), (x + 50.0, y + 1.0)));
    }
    ret
}

/// Generate an `n` by `n` grid of squares, each of size `size`, spaced
/// `offset` apart.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated up by `slant`, so that
/// none of the edges are horizontal.
pub fn squares(n: usize, size: f64, offset: f64, slant: f64) -> GeometryModel {
    let mut polygons = Vec::new();
    for i in 0..n {
        let x = i as f64 * offset;
        for j in 0..n {
            let y = j as f64 * offset;
            let vertices = [
                Point::new(x, y),
                Point::new(x + size, y + slant),
                Point::new(x + size, y + size + slant),
                Point::new(x, y + size),
            ];
            if let Ok(p) = Polygon2::new(vertices) {
                polygons.push(p);
            }
        }
    }
    GeometryModel::from_polygons(polygons)
}

/// Generate a star-shaped polygon with `n` points, centered at the origin.
///
/// The star is concave, so most scanlines cross it in several spans.
pub fn star(n: usize, inner: f64, outer: f64) -> GeometryModel {
    let n = n.max(2);
    let vertices = (0..2 * n).map(|i| {
        let angle = std::f64::consts::PI * i as f64 / n as f64;
        let r = if i % 2 == 0 { outer } else { inner };
        Point::new(r * angle.cos(), r * angle.sin())
    });
    GeometryModel::from_polygons(Polygon2::new(vertices))
}

/// Generate `n` points along a spiral that winds around the `z` axis while climbing it.
///
/// Consecutive points are close together, but they aren't close in their
/// `x` coordinates, which is what the closest-pair search sorts by.
pub fn spiral(n: usize) -> GeometryModel {
    let points = (0..n).map(|i| {
        let t = i as f64 * 0.5;
        Point3::new(t * t.cos(), t * t.sin(), t * 0.1)
    });
    // The coordinates are finite, so this can't fail.
    GeometryModel::from_points(points).unwrap_or_default()
}

/// Generate `n` buildings of varying heights, each overlapping the next few.
pub fn city(n: usize) -> GeometryModel {
    let buildings = (0..n).filter_map(|i| {
        let left = 3.0 * i as f64;
        let right = left + 4.0 + (i % 7) as f64;
        let height = 1.0 + ((i * 37) % 23) as f64;
        Building::new(left, right, height).ok()
    });
    GeometryModel::from_buildings(buildings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(cube_grid(3, 2.0, 1.5).boxes().len(), 27);
        assert_eq!(jackstraws(4).boxes().len(), 12);
        assert_eq!(slanties(5).segments().len(), 10);
        assert_eq!(sparse_segments(6).segments().len(), 6);
        assert_eq!(squares(3, 30.0, 40.0, 1.0).polygons().len(), 9);
        assert_eq!(star(5, 1.0, 2.0).polygons()[crate::PolyIdx(0)].vertices().len(), 10);
        assert_eq!(spiral(100).points().len(), 100);
        assert_eq!(city(10).buildings().len(), 10);
    }

    #[test]
    fn slanties_cross() {
        let ret = crate::intersections::intersections(&slanties(4)).unwrap();
        assert_eq!(ret.pairs.len(), 16);
    }
}
