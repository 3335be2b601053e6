//! Geometric primitives: boxes, segments, polygons, points, and buildings.
//!
//! Two-dimensional points are [`kurbo::Point`]s. All of these types are
//! plain values: once they are placed in a [`GeometryModel`](crate::GeometryModel)
//! nothing mutates them.

use kurbo::{BezPath, Point, Rect};

use crate::{num::CheapOrderedFloat, Error};

/// One of the three coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// The horizontal axis, along which the volume sweep moves.
    X,
    /// The second axis.
    Y,
    /// The third axis.
    Z,
}

pub(crate) fn check_finite(coords: impl IntoIterator<Item = f64>) -> Result<(), Error> {
    for c in coords {
        if c.is_nan() {
            return Err(Error::NaN);
        }
        if c.is_infinite() {
            return Err(Error::Infinity);
        }
    }
    Ok(())
}

/// A three-dimensional point.
///
/// Deserializing a point fails if any coordinate isn't finite.
#[derive(Clone, Copy, PartialEq, serde::Serialize)]
pub struct Point3 {
    /// First coordinate.
    pub x: f64,
    /// Second coordinate.
    pub y: f64,
    /// Third coordinate.
    pub z: f64,
}

impl std::fmt::Debug for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?}, {:?})", self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3 { x, y, z }
    }
}

impl Point3 {
    /// Creates a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        debug_assert!(x.is_finite() && y.is_finite() && z.is_finite());
        Point3 { x, y, z }
    }

    /// The square of the Euclidean distance between `self` and `other`.
    pub fn distance_squared(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// The Euclidean distance between `self` and `other`.
    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub(crate) fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl<'de> serde::Deserialize<'de> for Point3 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            x: f64,
            y: f64,
            z: f64,
        }

        let Raw { x, y, z } = Raw::deserialize(deserializer)?;
        check_finite([x, y, z]).map_err(serde::de::Error::custom)?;
        Ok(Point3 { x, y, z })
    }
}

/// An axis-aligned box, given by its minimal and maximal corners.
///
/// `min` is less than or equal to `max` on every axis; this is checked on
/// construction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Box3 {
    min: Point3,
    max: Point3,
}

impl Box3 {
    /// Creates a box from its minimal and maximal corners.
    ///
    /// Fails if `min` is larger than `max` on some axis.
    pub fn new(min: impl Into<Point3>, max: impl Into<Point3>) -> Result<Self, Error> {
        let min = min.into();
        let max = max.into();
        check_finite(min.coords().into_iter().chain(max.coords()))?;
        for (axis, (lo, hi)) in [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .zip(min.coords().into_iter().zip(max.coords()))
        {
            if lo > hi {
                return Err(Error::InvertedBox { axis });
            }
        }
        Ok(Box3 { min, max })
    }

    /// Creates the smallest box containing two opposite corners, given in any order.
    pub fn from_corners(a: impl Into<Point3>, b: impl Into<Point3>) -> Result<Self, Error> {
        let a = a.into();
        let b = b.into();
        check_finite(a.coords().into_iter().chain(b.coords()))?;
        Box3::new(
            Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    }

    /// The minimal corner.
    pub fn min(&self) -> Point3 {
        self.min
    }

    /// The maximal corner.
    pub fn max(&self) -> Point3 {
        self.max
    }

    /// The volume of this box.
    pub fn volume(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y) * (self.max.z - self.min.z)
    }

    /// Does this box have zero extent along some axis?
    pub fn is_degenerate(&self) -> bool {
        self.min.x == self.max.x || self.min.y == self.max.y || self.min.z == self.max.z
    }

    /// The projection of this box onto the `(y, z)` plane.
    ///
    /// In the returned rectangle, `y` plays the role of kurbo's horizontal
    /// coordinate and `z` the role of its vertical one.
    pub fn yz_rect(&self) -> Rect {
        Rect::new(self.min.y, self.min.z, self.max.y, self.max.z)
    }

    /// The volume of the intersection of two boxes.
    pub fn overlap_volume(&self, other: &Box3) -> f64 {
        let extent =
            |lo0: f64, hi0: f64, lo1: f64, hi1: f64| (hi0.min(hi1) - lo0.max(lo1)).max(0.0);
        extent(self.min.x, self.max.x, other.min.x, other.max.x)
            * extent(self.min.y, self.max.y, other.min.y, other.max.y)
            * extent(self.min.z, self.max.z, other.min.z, other.max.z)
    }

    /// Is the point inside this box?
    ///
    /// Boxes are half-open: they contain their minimal faces but not their maximal ones.
    pub fn contains(&self, p: &Point3) -> bool {
        (self.min.x..self.max.x).contains(&p.x)
            && (self.min.y..self.max.y).contains(&p.y)
            && (self.min.z..self.max.z).contains(&p.z)
    }
}

impl<'de> serde::Deserialize<'de> for Box3 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            min: Point3,
            max: Point3,
        }

        let raw = Raw::deserialize(deserializer)?;
        Box3::new(raw.min, raw.max).map_err(serde::de::Error::custom)
    }
}

/// A line segment in the plane.
///
/// The endpoints are kept in the order they were given. Segments whose
/// endpoints coincide are allowed; they behave like a single point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Segment2 {
    /// The starting point.
    pub start: Point,
    /// The ending point.
    pub end: Point,
}

impl Segment2 {
    /// Creates a new segment.
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Segment2 {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Does this segment have zero length?
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// The endpoints, ordered by `x` and then by `y`.
    pub fn left_to_right(&self) -> (Point, Point) {
        let key = |p: &Point| (CheapOrderedFloat::from(p.x), CheapOrderedFloat::from(p.y));
        if key(&self.start) <= key(&self.end) {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// This segment as a kurbo line.
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.start, self.end)
    }
}

impl<'de> serde::Deserialize<'de> for Segment2 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: Point,
            end: Point,
        }

        let Raw { start, end } = Raw::deserialize(deserializer)?;
        check_finite([start.x, start.y, end.x, end.y]).map_err(serde::de::Error::custom)?;
        Ok(Segment2 { start, end })
    }
}

/// A horizontal run of filled pixels (or whatever the renderer likes), from `x0` to `x1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// The left end.
    pub x0: f64,
    /// The right end.
    pub x1: f64,
}

impl Span {
    /// The width of this span.
    pub fn len(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Is this span empty?
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0
    }
}

/// The horizontal position where the non-horizontal edge from `lo` to `hi`
/// crosses height `y`.
///
/// `lo` must be the endpoint with the smaller `y` coordinate.
pub(crate) fn edge_crossing(lo: Point, hi: Point, y: f64) -> f64 {
    debug_assert!(lo.y < hi.y);
    let t = ((y - lo.y) / (hi.y - lo.y)).clamp(0.0, 1.0);
    lo.x + t * (hi.x - lo.x)
}

/// Pairs up sorted scanline crossings into spans, using the even-odd rule.
pub(crate) fn pair_crossings(crossings: &mut [f64]) -> Vec<Span> {
    crossings.sort_by_key(|x| CheapOrderedFloat::from(*x));
    crossings
        .chunks_exact(2)
        .map(|pair| Span {
            x0: pair[0],
            x1: pair[1],
        })
        .collect()
}

/// A closed polygon.
///
/// The last vertex is implicitly connected to the first. We assume, but don't
/// check, that the polygon doesn't intersect itself; if it does, filling uses
/// the even-odd rule anyway.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Polygon2 {
    vertices: Vec<Point>,
}

impl Polygon2 {
    /// Creates a polygon from at least three vertices.
    pub fn new<P: Into<Point>>(vertices: impl IntoIterator<Item = P>) -> Result<Self, Error> {
        let vertices: Vec<Point> = vertices.into_iter().map(Into::into).collect();
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices {
                found: vertices.len(),
            });
        }
        check_finite(vertices.iter().flat_map(|p| [p.x, p.y]))?;
        Ok(Polygon2 { vertices })
    }

    /// The vertices, in order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Iterates over the edges, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// The smallest and largest vertical coordinates of the vertices.
    pub fn y_range(&self) -> (f64, f64) {
        self.vertices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            })
    }

    /// The filled spans of this polygon along the horizontal line at height `y`.
    ///
    /// An edge counts as crossing the line if its lower endpoint is at or below
    /// `y` and its upper endpoint is strictly above; horizontal edges never count.
    /// The crossings are paired up left-to-right.
    pub fn spans_at(&self, y: f64) -> Vec<Span> {
        let mut crossings: Vec<f64> = self
            .edges()
            .filter_map(|(a, b)| {
                let (lo, hi) = if a.y <= b.y { (a, b) } else { (b, a) };
                (lo.y <= y && y < hi.y).then(|| edge_crossing(lo, hi, y))
            })
            .collect();
        pair_crossings(&mut crossings)
    }

    /// The outline of this polygon, as a closed kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut vertices = self.vertices.iter();
        if let Some(first) = vertices.next() {
            path.move_to(*first);
            for v in vertices {
                path.line_to(*v);
            }
            path.close_path();
        }
        path
    }
}

impl<'de> serde::Deserialize<'de> for Polygon2 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let vertices = Vec::<Point>::deserialize(deserializer)?;
        Polygon2::new(vertices).map_err(serde::de::Error::custom)
    }
}

/// A building for the skyline: a rectangle standing on the ground.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Building {
    left: f64,
    right: f64,
    height: f64,
}

impl Building {
    /// Creates a building covering `[left, right]`, of height `height`.
    ///
    /// Fails if the interval is backwards or the height is negative. Zero
    /// widths and zero heights are fine, although such buildings don't
    /// appear in the skyline.
    pub fn new(left: f64, right: f64, height: f64) -> Result<Self, Error> {
        check_finite([left, right, height])?;
        if left > right {
            return Err(Error::InvertedInterval);
        }
        if height < 0.0 {
            return Err(Error::NegativeHeight);
        }
        Ok(Building {
            left,
            right,
            height,
        })
    }

    /// The left edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// The right edge.
    pub fn right(&self) -> f64 {
        self.right
    }

    /// The height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Is this building invisible, because it has no width or no height?
    pub fn is_degenerate(&self) -> bool {
        self.left == self.right || self.height == 0.0
    }

    /// The height of this building at horizontal position `x`, or zero if `x` is outside it.
    ///
    /// Buildings are half-open: they cover their left edge but not their right one.
    pub fn height_at(&self, x: f64) -> f64 {
        if self.left <= x && x < self.right {
            self.height
        } else {
            0.0
        }
    }
}

impl<'de> serde::Deserialize<'de> for Building {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            left: f64,
            right: f64,
            height: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Building::new(raw.left, raw.right, raw.height).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;
    use kurbo::Shape as _;
    use proptest::prelude::*;

    use super::*;
    use crate::num::tests::Reasonable;

    impl Reasonable for Point3 {
        type Strategy = BoxedStrategy<Point3>;

        fn reasonable() -> Self::Strategy {
            (f64::reasonable(), f64::reasonable(), f64::reasonable())
                .prop_map(|(x, y, z)| Point3::new(x, y, z))
                .boxed()
        }
    }

    #[test]
    fn box_invariants() {
        assert!(Box3::new((0.0, 0.0, 0.0), (1.0, 2.0, 3.0)).is_ok());
        assert_matches!(
            Box3::new((0.0, 0.0, 0.0), (1.0, -2.0, 3.0)),
            Err(Error::InvertedBox { axis: Axis::Y })
        );
        assert_matches!(
            Box3::new((0.0, 0.0, f64::NAN), (1.0, 2.0, 3.0)),
            Err(Error::NaN)
        );

        let b = Box3::from_corners((1.0, 0.0, 5.0), (0.0, 2.0, 3.0)).unwrap();
        assert_eq!(b.min(), Point3::new(0.0, 0.0, 3.0));
        assert_eq!(b.max(), Point3::new(1.0, 2.0, 5.0));
        assert_eq!(b.volume(), 4.0);
        assert!(!b.is_degenerate());
        assert!(Box3::new((0.0, 0.0, 0.0), (1.0, 0.0, 1.0))
            .unwrap()
            .is_degenerate());
    }

    #[test]
    fn building_invariants() {
        assert_matches!(Building::new(1.0, 0.0, 1.0), Err(Error::InvertedInterval));
        assert_matches!(Building::new(0.0, 1.0, -1.0), Err(Error::NegativeHeight));
        assert_matches!(
            Building::new(0.0, f64::INFINITY, 1.0),
            Err(Error::Infinity)
        );
        assert!(Building::new(1.0, 1.0, 3.0).unwrap().is_degenerate());
        assert!(Building::new(1.0, 2.0, 0.0).unwrap().is_degenerate());
        assert_eq!(Building::new(1.0, 2.0, 3.0).unwrap().height_at(2.0), 0.0);
    }

    #[test]
    fn polygon_needs_three_vertices() {
        assert_matches!(
            Polygon2::new([(0.0, 0.0), (1.0, 1.0)]),
            Err(Error::TooFewVertices { found: 2 })
        );
    }

    #[test]
    fn square_spans() {
        let square = Polygon2::new([(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]).unwrap();
        assert_eq!(square.spans_at(0.0), vec![Span { x0: 0.0, x1: 2.0 }]);
        assert_eq!(square.spans_at(1.0), vec![Span { x0: 0.0, x1: 2.0 }]);
        // The top edge is excluded by the half-open rule.
        assert!(square.spans_at(2.0).is_empty());
        assert!(square.spans_at(-1.0).is_empty());
    }

    #[test]
    fn concave_spans() {
        // A "U" shape: two prongs joined at the bottom.
        let u = Polygon2::new([
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ])
        .unwrap();
        assert_eq!(u.spans_at(0.5), vec![Span { x0: 0.0, x1: 3.0 }]);
        assert_eq!(
            u.spans_at(2.0),
            vec![Span { x0: 0.0, x1: 1.0 }, Span { x0: 2.0, x1: 3.0 }]
        );
    }

    #[test]
    fn bez_path_area() {
        let tri = Polygon2::new([(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]).unwrap();
        assert!((tri.to_bez_path().area().abs() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn segment_orientation() {
        let s = Segment2::new((3.0, 1.0), (1.0, 2.0));
        assert_eq!(s.left_to_right(), (Point::new(1.0, 2.0), Point::new(3.0, 1.0)));
        let v = Segment2::new((1.0, 5.0), (1.0, 2.0));
        assert_eq!(v.left_to_right(), (Point::new(1.0, 2.0), Point::new(1.0, 5.0)));
        assert!(Segment2::new((1.0, 1.0), (1.0, 1.0)).is_degenerate());
    }

    fn from_seq<'de, T: serde::Deserialize<'de>>(
        items: Vec<Vec<f64>>,
    ) -> Result<T, serde::de::value::Error> {
        use serde::de::value::SeqDeserializer;
        T::deserialize(SeqDeserializer::<_, serde::de::value::Error>::new(items.into_iter()))
    }

    #[test]
    fn deserialize_checks_coordinates() {
        use serde::{de::value::SeqDeserializer, Deserialize};
        type De<I> = SeqDeserializer<I, serde::de::value::Error>;

        let p = Point3::deserialize(De::new([1.0, 2.0, 3.0].into_iter())).unwrap();
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
        assert!(Point3::deserialize(De::new([1.0, f64::NAN, 3.0].into_iter())).is_err());
        assert!(Point3::deserialize(De::new([f64::INFINITY, 2.0, 3.0].into_iter())).is_err());

        let s: Segment2 = from_seq(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(s, Segment2::new((0.0, 0.0), (1.0, 1.0)));
        assert!(from_seq::<Segment2>(vec![vec![0.0, f64::NAN], vec![1.0, 1.0]]).is_err());
        assert!(from_seq::<Segment2>(vec![vec![0.0, 0.0], vec![f64::NEG_INFINITY, 1.0]]).is_err());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            a in Point3::reasonable(),
            b in Point3::reasonable(),
            c in Point3::reasonable(),
            d in Point3::reasonable(),
        ) {
            let b0 = Box3::from_corners(a, b).unwrap();
            let b1 = Box3::from_corners(c, d).unwrap();
            let v01 = b0.overlap_volume(&b1);
            let v10 = b1.overlap_volume(&b0);
            prop_assert_eq!(v01, v10);
            prop_assert!(v01 <= b0.volume().min(b1.volume()) * (1.0 + 1e-12));
        }
    }
}
