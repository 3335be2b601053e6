//! The exact area of a union of axis-aligned rectangles.

use kurbo::Rect;

fn compressed_axis(coords: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut ret: Vec<f64> = coords.collect();
    ret.sort_by(f64::total_cmp);
    ret.dedup();
    ret
}

/// Computes the area of the union of some rectangles.
///
/// The rectangles' edges cut the plane into a grid of cells, each of which is
/// either entirely covered or entirely uncovered. We count how many rectangles
/// cover each cell using a two-dimensional difference array, and add up the
/// areas of the covered cells. This takes `O(n^2)` time for `n` rectangles,
/// and the result is exact up to the rounding in the final sum.
///
/// Rectangles with zero area are ignored, as are rectangles with negative
/// widths or heights.
pub fn union_area(rects: &[Rect]) -> f64 {
    let rects: Vec<&Rect> = rects
        .iter()
        .filter(|r| r.x0 < r.x1 && r.y0 < r.y1)
        .collect();
    if rects.is_empty() {
        return 0.0;
    }

    let xs = compressed_axis(rects.iter().flat_map(|r| [r.x0, r.x1]));
    let ys = compressed_axis(rects.iter().flat_map(|r| [r.y0, r.y1]));
    let width = xs.len();

    // coverage[j * width + i] counts the rectangles covering the cell whose
    // bottom-left corner is (xs[i], ys[j]). It starts out as a difference array.
    let mut coverage = vec![0i32; width * ys.len()];
    for r in &rects {
        let i0 = xs.partition_point(|&x| x < r.x0);
        let i1 = xs.partition_point(|&x| x < r.x1);
        let j0 = ys.partition_point(|&y| y < r.y0);
        let j1 = ys.partition_point(|&y| y < r.y1);
        coverage[j0 * width + i0] += 1;
        coverage[j0 * width + i1] -= 1;
        coverage[j1 * width + i0] -= 1;
        coverage[j1 * width + i1] += 1;
    }

    for row in coverage.chunks_exact_mut(width) {
        for i in 1..width {
            row[i] += row[i - 1];
        }
    }
    for j in 1..ys.len() {
        for i in 0..width {
            coverage[j * width + i] += coverage[(j - 1) * width + i];
        }
    }

    let mut area = 0.0;
    for (j, y) in ys.windows(2).enumerate() {
        let height = y[1] - y[0];
        for (i, x) in xs.windows(2).enumerate() {
            if coverage[j * width + i] > 0 {
                area += (x[1] - x[0]) * height;
            }
        }
    }
    area
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::num::tests::Reasonable;

    #[test]
    fn empty() {
        assert_eq!(union_area(&[]), 0.0);
        assert_eq!(union_area(&[Rect::new(0.0, 0.0, 0.0, 5.0)]), 0.0);
    }

    #[test]
    fn overlapping() {
        let rects = [Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(1.0, 1.0, 3.0, 3.0)];
        assert_eq!(union_area(&rects), 7.0);
    }

    #[test]
    fn nested_and_duplicated() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(union_area(&[outer, inner, outer]), 16.0);
    }

    #[test]
    fn cross() {
        // A plus sign: two 3x1 bars overlapping in a unit square.
        let rects = [Rect::new(0.0, 1.0, 3.0, 2.0), Rect::new(1.0, 0.0, 2.0, 3.0)];
        assert_eq!(union_area(&rects), 5.0);
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (
            f64::reasonable(),
            f64::reasonable(),
            f64::reasonable(),
            f64::reasonable(),
        )
            .prop_map(|(x0, y0, x1, y1)| Rect::new(x0, y0, x1, y1).abs())
    }

    proptest! {
        #[test]
        fn two_rects_inclusion_exclusion(a in rect(), b in rect()) {
            let expected = a.area() + b.area() - a.intersect(b).area();
            let computed = union_area(&[a, b]);
            prop_assert!((expected - computed).abs() <= 1e-9 * (1.0 + expected));
        }

        #[test]
        fn order_independent(mut rects in prop::collection::vec(rect(), 0..8)) {
            let forward = union_area(&rects);
            rects.reverse();
            let backward = union_area(&rects);
            prop_assert!((forward - backward).abs() <= 1e-9 * (1.0 + forward));
            let sum: f64 = rects.iter().map(|r| r.area()).sum();
            prop_assert!(forward <= sum * (1.0 + 1e-12) + 1e-9);
        }
    }
}
