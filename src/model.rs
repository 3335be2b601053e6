//! The geometry model: the collections of primitives that the algorithms run on.

use crate::{
    geom::{check_finite, Box3, Building, Point3, Polygon2, Segment2},
    Error,
};

typed_vec!(
    /// An arena of boxes, indexed by [`BoxIdx`].
    Boxes,
    /// An index into [`Boxes`].
    BoxIdx,
    "b"
);
typed_vec!(
    /// An arena of segments, indexed by [`SegIdx`].
    Segments,
    /// An index into [`Segments`].
    SegIdx,
    "s"
);
typed_vec!(
    /// An arena of polygons, indexed by [`PolyIdx`].
    Polygons,
    /// An index into [`Polygons`].
    PolyIdx,
    "poly"
);
typed_vec!(
    /// An arena of points, indexed by [`PointIdx`].
    Points,
    /// An index into [`Points`].
    PointIdx,
    "p"
);
typed_vec!(
    /// An arena of buildings, indexed by [`BuildingIdx`].
    Buildings,
    /// An index into [`Buildings`].
    BuildingIdx,
    "bldg"
);

/// All the geometry that a computation might look at.
///
/// A model owns its primitives and hands out typed indices for them. The
/// algorithms only ever borrow a model, so a model can be shared between any
/// number of (sequential or concurrent) computations.
///
/// Every coordinate in a model is finite: the `add_*` methods check.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeometryModel {
    boxes: Boxes<Box3>,
    segments: Segments<Segment2>,
    polygons: Polygons<Polygon2>,
    points: Points<Point3>,
    buildings: Buildings<Building>,
}

impl GeometryModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a box.
    pub fn add_box(&mut self, b: Box3) -> BoxIdx {
        self.boxes.push(b)
    }

    /// Adds a segment, failing if it has a non-finite coordinate.
    pub fn add_segment(&mut self, s: Segment2) -> Result<SegIdx, Error> {
        check_finite([s.start.x, s.start.y, s.end.x, s.end.y])?;
        Ok(self.segments.push(s))
    }

    /// Adds a polygon.
    pub fn add_polygon(&mut self, p: Polygon2) -> PolyIdx {
        self.polygons.push(p)
    }

    /// Adds a point, failing if it has a non-finite coordinate.
    pub fn add_point(&mut self, p: Point3) -> Result<PointIdx, Error> {
        check_finite(p.coords())?;
        Ok(self.points.push(p))
    }

    /// Adds a building.
    pub fn add_building(&mut self, b: Building) -> BuildingIdx {
        self.buildings.push(b)
    }

    /// A model containing just some boxes.
    pub fn from_boxes(boxes: impl IntoIterator<Item = Box3>) -> Self {
        GeometryModel {
            boxes: boxes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A model containing just some segments.
    pub fn from_segments<S: Into<Segment2>>(
        segments: impl IntoIterator<Item = S>,
    ) -> Result<Self, Error> {
        let mut ret = Self::default();
        for s in segments {
            ret.add_segment(s.into())?;
        }
        Ok(ret)
    }

    /// A model containing just some polygons.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Polygon2>) -> Self {
        GeometryModel {
            polygons: polygons.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A model containing just some points.
    pub fn from_points<P: Into<Point3>>(
        points: impl IntoIterator<Item = P>,
    ) -> Result<Self, Error> {
        let mut ret = Self::default();
        for p in points {
            ret.add_point(p.into())?;
        }
        Ok(ret)
    }

    /// A model containing just some buildings.
    pub fn from_buildings(buildings: impl IntoIterator<Item = Building>) -> Self {
        GeometryModel {
            buildings: buildings.into_iter().collect(),
            ..Self::default()
        }
    }

    /// The boxes.
    pub fn boxes(&self) -> &Boxes<Box3> {
        &self.boxes
    }

    /// The segments.
    pub fn segments(&self) -> &Segments<Segment2> {
        &self.segments
    }

    /// The polygons.
    pub fn polygons(&self) -> &Polygons<Polygon2> {
        &self.polygons
    }

    /// The points.
    pub fn points(&self) -> &Points<Point3> {
        &self.points
    }

    /// The buildings.
    pub fn buildings(&self) -> &Buildings<Building> {
        &self.buildings
    }
}

impl From<((f64, f64), (f64, f64))> for Segment2 {
    fn from((start, end): ((f64, f64), (f64, f64))) -> Self {
        Segment2::new(start, end)
    }
}
