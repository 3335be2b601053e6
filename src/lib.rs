#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod area;
pub mod closest_pair;
mod config;
pub mod fill;
mod geom;
pub mod intersections;
mod model;
mod num;
pub mod skyline;
pub mod sweep;
pub mod volume;

#[cfg(feature = "generators")]
pub mod generators;

// pub so that we can use it in fuzz tests, but it's really private
#[doc(hidden)]
pub mod treevec;

pub use config::Config;
pub use geom::{Axis, Box3, Building, Point3, Polygon2, Segment2, Span};
pub use kurbo::Point;
pub use model::{
    BoxIdx, Boxes, BuildingIdx, Buildings, GeometryModel, PointIdx, Points, PolyIdx, Polygons,
    SegIdx, Segments,
};

use closest_pair::{ClosestPairStep, ClosestPairSteps, PointPair};
use fill::{FillResult, FillSteps, ScanlineStep};
use intersections::{IntersectionStep, IntersectionSteps, Intersections};
use skyline::{SkylineStep, SkylineSteps, SkylineVertex};
use volume::{VolumeStep, VolumeSteps};

#[derive(Clone, Copy, Debug, PartialEq)]
/// The input was faulty.
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// A box had its minimal corner above its maximal corner.
    InvertedBox {
        /// The axis along which the corners were the wrong way around.
        axis: Axis,
    },
    /// A polygon didn't have enough vertices.
    TooFewVertices {
        /// The number of vertices it did have.
        found: usize,
    },
    /// A building had its left edge to the right of its right edge.
    InvertedInterval,
    /// A building had a negative height.
    NegativeHeight,
    /// There weren't enough primitives for the computation to make sense.
    InsufficientInput {
        /// The minimum number of primitives needed.
        needed: usize,
        /// The number of primitives there were.
        found: usize,
    },
    /// Some configuration parameter was out of range.
    InvalidConfig(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::InvertedBox { axis } => {
                write!(f, "a box had min > max along the {axis:?} axis")
            }
            Error::TooFewVertices { found } => {
                write!(f, "a polygon had {found} vertices, but it needs at least 3")
            }
            Error::InvertedInterval => write!(f, "a building had left > right"),
            Error::NegativeHeight => write!(f, "a building had a negative height"),
            Error::InsufficientInput { needed, found } => {
                write!(f, "needed at least {needed} inputs, but found {found}")
            }
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// The algorithms that can run on a [`GeometryModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Algorithm {
    /// The volume of the union of the boxes. See [`volume`].
    VolumeUnion,
    /// The intersection points of the segments. See [`intersections`].
    SegmentIntersection,
    /// Scanline filling of the polygons. See [`fill`].
    PolygonFill,
    /// The closest pair of points. See [`closest_pair`].
    ClosestPair,
    /// The skyline of the buildings. See [`skyline`].
    Skyline,
}

impl Algorithm {
    /// All the algorithms.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::VolumeUnion,
        Algorithm::SegmentIntersection,
        Algorithm::PolygonFill,
        Algorithm::ClosestPair,
        Algorithm::Skyline,
    ];
}

/// The final result of some [`Algorithm`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Outcome {
    /// The volume of the union of the boxes.
    Volume(f64),
    /// The intersection points of the segments.
    Intersections(Intersections),
    /// The filled spans of the polygons.
    Fill(FillResult),
    /// The closest pair of points.
    ClosestPair(PointPair),
    /// The outline of the buildings.
    Skyline(Vec<SkylineVertex>),
}

/// A snapshot of some [`Algorithm`] in progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Snapshot {
    /// See [`VolumeStep`].
    Volume(VolumeStep),
    /// See [`IntersectionStep`].
    Intersection(IntersectionStep),
    /// See [`ScanlineStep`].
    Scanline(ScanlineStep),
    /// See [`ClosestPairStep`].
    ClosestPair(ClosestPairStep),
    /// See [`SkylineStep`].
    Skyline(SkylineStep),
}

/// The snapshots of some [`Algorithm`], as a lazy iterator.
///
/// This wraps the algorithm-specific [`StepSequence`](sweep::StepSequence)s,
/// which you can also get directly from each algorithm's module.
#[derive(Clone, Debug)]
pub enum Steps<'a> {
    /// See [`volume::union_volume_steps`].
    Volume(VolumeSteps<'a>),
    /// See [`intersections::intersection_steps`].
    Intersection(IntersectionSteps),
    /// See [`fill::fill_steps`].
    Scanline(FillSteps<'a>),
    /// See [`closest_pair::closest_pair_steps`].
    ClosestPair(ClosestPairSteps<'a>),
    /// See [`skyline::skyline_steps`].
    Skyline(SkylineSteps<'a>),
}

impl Steps<'_> {
    /// Rewinds to the first snapshot.
    pub fn restart(&mut self) {
        match self {
            Steps::Volume(s) => s.restart(),
            Steps::Intersection(s) => s.restart(),
            Steps::Scanline(s) => s.restart(),
            Steps::ClosestPair(s) => s.restart(),
            Steps::Skyline(s) => s.restart(),
        }
    }

    /// How many snapshots have been produced since the start (or the last restart).
    pub fn position(&self) -> usize {
        match self {
            Steps::Volume(s) => s.position(),
            Steps::Intersection(s) => s.position(),
            Steps::Scanline(s) => s.position(),
            Steps::ClosestPair(s) => s.position(),
            Steps::Skyline(s) => s.position(),
        }
    }
}

impl Iterator for Steps<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        match self {
            Steps::Volume(s) => s.next().map(Snapshot::Volume),
            Steps::Intersection(s) => s.next().map(Snapshot::Intersection),
            Steps::Scanline(s) => s.next().map(Snapshot::Scanline),
            Steps::ClosestPair(s) => s.next().map(Snapshot::ClosestPair),
            Steps::Skyline(s) => s.next().map(Snapshot::Skyline),
        }
    }
}

impl std::iter::FusedIterator for Steps<'_> {}

impl GeometryModel {
    /// Runs an algorithm to completion on this model.
    pub fn compute_final(&self, algorithm: Algorithm, config: &Config) -> Result<Outcome, Error> {
        Ok(match algorithm {
            Algorithm::VolumeUnion => Outcome::Volume(volume::union_volume_with(self, config)?),
            Algorithm::SegmentIntersection => {
                Outcome::Intersections(intersections::intersections_with(self, config)?)
            }
            Algorithm::PolygonFill => Outcome::Fill(fill::fill_with(self, config)?),
            Algorithm::ClosestPair => {
                Outcome::ClosestPair(closest_pair::closest_pair_with(self, config)?)
            }
            Algorithm::Skyline => Outcome::Skyline(skyline::skyline_with(self, config)?),
        })
    }

    /// Returns the snapshots of an algorithm running on this model.
    ///
    /// No work is done until the first snapshot is requested.
    pub fn compute_steps(&self, algorithm: Algorithm, config: &Config) -> Result<Steps<'_>, Error> {
        Ok(match algorithm {
            Algorithm::VolumeUnion => Steps::Volume(volume::union_volume_steps_with(self, config)?),
            Algorithm::SegmentIntersection => {
                Steps::Intersection(intersections::intersection_steps_with(self, config)?)
            }
            Algorithm::PolygonFill => Steps::Scanline(fill::fill_steps_with(self, config)?),
            Algorithm::ClosestPair => {
                Steps::ClosestPair(closest_pair::closest_pair_steps_with(self, config)?)
            }
            Algorithm::Skyline => Steps::Skyline(skyline::skyline_steps_with(self, config)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mixed_model() -> GeometryModel {
        let mut m = GeometryModel::new();
        m.add_box(Box3::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0)).unwrap());
        m.add_segment(Segment2::new((0.0, 0.0), (4.0, 4.0))).unwrap();
        m.add_segment(Segment2::new((0.0, 4.0), (4.0, 0.0))).unwrap();
        m.add_polygon(Polygon2::new([(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]).unwrap());
        m.add_point(Point3::new(0.0, 0.0, 0.0)).unwrap();
        m.add_point(Point3::new(0.0, 3.0, 4.0)).unwrap();
        m.add_building(Building::new(0.0, 2.0, 1.0).unwrap());
        m
    }

    #[test]
    fn dispatch() {
        let m = mixed_model();
        let config = Config::default();
        assert_eq!(
            m.compute_final(Algorithm::VolumeUnion, &config).unwrap(),
            Outcome::Volume(1.0)
        );
        assert_matches!(
            m.compute_final(Algorithm::SegmentIntersection, &config),
            Ok(Outcome::Intersections(Intersections { points, .. }))
                if points == vec![Point::new(2.0, 2.0)]
        );
        assert_matches!(
            m.compute_final(Algorithm::ClosestPair, &config),
            Ok(Outcome::ClosestPair(PointPair { distance, .. })) if distance == 5.0
        );
        assert_eq!(
            m.compute_final(Algorithm::Skyline, &config).unwrap(),
            Outcome::Skyline(vec![
                SkylineVertex { x: 0.0, height: 1.0 },
                SkylineVertex { x: 2.0, height: 0.0 },
            ])
        );
    }

    #[test]
    fn steps_match_final() {
        let m = mixed_model();
        let config = Config::default();
        for algorithm in Algorithm::ALL {
            let mut steps = m.compute_steps(algorithm, &config).unwrap();
            let snapshots: Vec<_> = steps.by_ref().collect();
            assert!(!snapshots.is_empty(), "{algorithm:?}");
            assert_eq!(steps.position(), snapshots.len());
            assert_eq!(steps.next(), None);

            steps.restart();
            assert_eq!(steps.collect::<Vec<_>>(), snapshots, "{algorithm:?}");

            let last = snapshots.last().unwrap();
            match (m.compute_final(algorithm, &config).unwrap(), last) {
                (Outcome::Volume(v), Snapshot::Volume(step)) => assert_eq!(v, step.volume),
                (Outcome::Intersections(i), Snapshot::Intersection(step)) => {
                    assert_eq!(i.points, step.found)
                }
                (Outcome::Fill(f), Snapshot::Scanline(step)) => {
                    let last_rows: Vec<_> = f
                        .polygons
                        .iter()
                        .map(|rows| rows.last().unwrap().spans.clone())
                        .collect();
                    assert_eq!(last_rows, step.spans);
                }
                (Outcome::ClosestPair(p), Snapshot::ClosestPair(step)) => {
                    assert_eq!(Some(p), step.best)
                }
                (Outcome::Skyline(s), Snapshot::Skyline(step)) => assert_eq!(s, step.outline),
                (outcome, snapshot) => panic!("mismatched {outcome:?} and {snapshot:?}"),
            }
        }
    }

    #[test]
    fn empty_model() {
        let m = GeometryModel::new();
        let config = Config::default();
        assert_eq!(
            m.compute_final(Algorithm::VolumeUnion, &config).unwrap(),
            Outcome::Volume(0.0)
        );
        assert_eq!(
            m.compute_final(Algorithm::Skyline, &config).unwrap(),
            Outcome::Skyline(vec![])
        );
        assert_matches!(
            m.compute_final(Algorithm::ClosestPair, &config),
            Err(Error::InsufficientInput { needed: 2, found: 0 })
        );
        assert_matches!(
            m.compute_steps(Algorithm::ClosestPair, &config),
            Err(Error::InsufficientInput { .. })
        );
    }

    #[test]
    fn bad_config() {
        let m = mixed_model();
        let config = Config {
            scanline_step: -1.0,
            ..Config::default()
        };
        for algorithm in Algorithm::ALL {
            assert_matches!(
                m.compute_final(algorithm, &config),
                Err(Error::InvalidConfig(_))
            );
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::InsufficientInput { needed: 2, found: 1 }.to_string(),
            "needed at least 2 inputs, but found 1"
        );
        assert_eq!(
            Error::InvertedBox { axis: Axis::Z }.to_string(),
            "a box had min > max along the Z axis"
        );
    }
}
