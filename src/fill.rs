//! Scanline polygon filling.
//!
//! We sweep a horizontal line upwards through the polygons, keeping a set of
//! active edges for each polygon. Whenever the sweep line passes a scanline,
//! the active edges are intersected with it and the crossings are paired up
//! into filled spans using the even-odd rule.
//!
//! An edge is active on the half-open range from its lower endpoint
//! (inclusive) to its upper endpoint (exclusive), and horizontal edges are
//! never active. That means a vertex shared by two edges is counted once if
//! the polygon passes through it, and either zero or two times if it's a
//! local extremum, which is exactly what the even-odd rule wants.
//!
//! Heights are compared exactly: an edge that starts or ends within `eps` of
//! a scanline but not on it gets the same treatment as in
//! [`Polygon2::spans_at`].

use std::collections::BTreeSet;

use kurbo::Point;

use crate::{
    geom::{edge_crossing, pair_crossings, Polygon2, Span},
    model::{PolyIdx, Polygons},
    sweep::{Event, EventKind, EventQueue, StepSequence, SweepHandler, Sweeper},
    Config, Error, GeometryModel,
};

/// The spans of one polygon along one scanline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Row {
    /// The height of the scanline.
    pub y: f64,
    /// The filled spans, from left to right.
    pub spans: Vec<Span>,
}

/// The result of filling some polygons.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillResult {
    /// For each polygon, its rows from bottom to top.
    ///
    /// Every polygon has a row for every scanline, even scanlines that miss it.
    pub polygons: Vec<Vec<Row>>,
}

/// A snapshot of the fill sweep, taken at a scanline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScanlineStep {
    /// The height of the scanline.
    pub y: f64,
    /// For each polygon, its filled spans along this scanline.
    pub spans: Vec<Vec<Span>>,
}

/// Where the scanlines go.
#[derive(Clone, Copy, Debug)]
struct Scanlines {
    first: f64,
    step: f64,
    count: usize,
}

// More scanlines than this is surely a mistake in the config.
const MAX_SCANLINES: f64 = (1u64 << 24) as f64;

impl Scanlines {
    fn new(polygons: &Polygons<Polygon2>, config: &Config) -> Result<Self, Error> {
        let (y_min, y_max) = polygons
            .as_slice()
            .iter()
            .map(Polygon2::y_range)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (y0, y1)| {
                (lo.min(y0), hi.max(y1))
            });
        if y_min > y_max {
            return Ok(Scanlines {
                first: 0.0,
                step: config.scanline_step,
                count: 0,
            });
        }

        let step = config.scanline_step;
        let origin = config.scanline_origin.unwrap_or(y_min);
        let k0 = ((y_min - origin) / step).ceil();
        let k1 = ((y_max - origin) / step).floor();
        // Not finite if the step is tiny compared to the polygons.
        let count = k1 - k0 + 1.0;
        if !count.is_finite() || count > MAX_SCANLINES {
            return Err(Error::InvalidConfig("too many scanlines"));
        }
        Ok(Scanlines {
            first: origin + k0 * step,
            step,
            count: count.max(0.0) as usize,
        })
    }

    fn y(&self, row: usize) -> f64 {
        self.first + row as f64 * self.step
    }
}

// The endpoints of a non-horizontal edge, lower one first.
fn upward(a: Point, b: Point) -> Option<(Point, Point)> {
    if a.y < b.y {
        Some((a, b))
    } else if b.y < a.y {
        Some((b, a))
    } else {
        None
    }
}

/// The fill sweep's state.
#[derive(Clone, Debug)]
pub struct FillSweep<'a> {
    polygons: &'a Polygons<Polygon2>,
    scanlines: Scanlines,
    // For each polygon, the indices of its active edges.
    active: Vec<BTreeSet<usize>>,
    // The scanline handled in the current step, if there was one.
    current: Option<usize>,
    spans: Vec<Vec<Span>>,
    rows: Vec<Vec<Row>>,
}

impl<'a> FillSweep<'a> {
    fn new(polygons: &'a Polygons<Polygon2>, scanlines: Scanlines) -> Self {
        let n = polygons.len();
        FillSweep {
            polygons,
            scanlines,
            active: vec![BTreeSet::new(); n],
            current: None,
            spans: vec![Vec::new(); n],
            rows: vec![Vec::new(); n],
        }
    }

    fn events(&self) -> Vec<Event> {
        let mut ret = Vec::new();
        for (polygon, poly) in self.polygons.iter() {
            for (edge, (a, b)) in poly.edges().enumerate() {
                if let Some((lo, hi)) = upward(a, b) {
                    ret.push(Event::new(lo.y, EventKind::EdgeStart { polygon, edge }));
                    ret.push(Event::new(hi.y, EventKind::EdgeEnd { polygon, edge }));
                }
            }
        }
        ret.extend((0..self.scanlines.count).map(|row| {
            Event::new(self.scanlines.y(row), EventKind::Scanline(row))
        }));
        ret
    }

    fn edge(&self, polygon: PolyIdx, edge: usize) -> (Point, Point) {
        let vertices = self.polygons[polygon].vertices();
        let a = vertices[edge];
        let b = vertices[(edge + 1) % vertices.len()];
        if a.y <= b.y {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn scan(&mut self, row: usize) {
        let y = self.scanlines.y(row);
        for (polygon, _) in self.polygons.iter() {
            let mut crossings: Vec<f64> = self.active[polygon.0]
                .iter()
                .map(|&edge| {
                    let (lo, hi) = self.edge(polygon, edge);
                    edge_crossing(lo, hi, y)
                })
                .collect();
            let spans = pair_crossings(&mut crossings);
            self.rows[polygon.0].push(Row {
                y,
                spans: spans.clone(),
            });
            self.spans[polygon.0] = spans;
        }
        self.current = Some(row);
    }

    fn into_result(self) -> FillResult {
        FillResult {
            polygons: self.rows,
        }
    }
}

impl SweepHandler for FillSweep<'_> {
    type Snapshot = ScanlineStep;

    fn advance(&mut self, _y: f64) {
        self.current = None;
    }

    fn handle(&mut self, event: &Event, _queue: &mut EventQueue) {
        match event.kind {
            EventKind::EdgeStart { polygon, edge } => {
                self.active[polygon.0].insert(edge);
            }
            EventKind::EdgeEnd { polygon, edge } => {
                self.active[polygon.0].remove(&edge);
            }
            EventKind::Scanline(row) => self.scan(row),
            kind => unreachable!("unexpected event {kind:?} in the fill sweep"),
        }
    }

    fn finish(&mut self, _y: f64) -> bool {
        self.current.is_some()
    }

    fn snapshot(&self, y: f64) -> ScanlineStep {
        ScanlineStep {
            y: self.current.map_or(y, |row| self.scanlines.y(row)),
            spans: self.spans.clone(),
        }
    }
}

fn sweeper<'a>(model: &'a GeometryModel, config: &Config) -> Result<Sweeper<FillSweep<'a>>, Error> {
    config.validate()?;
    let polygons = model.polygons();
    let scanlines = Scanlines::new(polygons, config)?;
    tracing::debug!(
        polygons = polygons.len(),
        scanlines = scanlines.count,
        first = scanlines.first,
        "starting fill sweep"
    );
    let handler = FillSweep::new(polygons, scanlines);
    let events = handler.events();
    Ok(Sweeper::new(handler, events, config.eps))
}

/// A sequence of snapshots of the fill sweep.
pub type FillSteps<'a> = StepSequence<Sweeper<FillSweep<'a>>>;

/// Fills all the polygons in the model.
pub fn fill(model: &GeometryModel) -> Result<FillResult, Error> {
    fill_with(model, &Config::default())
}

/// Fills all the polygons in the model, with scanlines placed according to `config`.
pub fn fill_with(model: &GeometryModel, config: &Config) -> Result<FillResult, Error> {
    let ret = sweeper(model, config)?.run().into_result();
    tracing::debug!(
        spans = ret
            .polygons
            .iter()
            .flatten()
            .map(|row| row.spans.len())
            .sum::<usize>(),
        "finished fill sweep"
    );
    Ok(ret)
}

/// Returns the steps of the fill sweep, one per scanline.
pub fn fill_steps(model: &GeometryModel) -> Result<FillSteps<'_>, Error> {
    fill_steps_with(model, &Config::default())
}

/// Returns the steps of the fill sweep, one per scanline.
pub fn fill_steps_with<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<FillSteps<'a>, Error> {
    Ok(StepSequence::new(sweeper(model, config)?))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    fn polygon(vertices: &[(f64, f64)]) -> Polygon2 {
        Polygon2::new(vertices.iter().copied()).unwrap()
    }

    fn square() -> Polygon2 {
        polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)])
    }

    fn span(x0: f64, x1: f64) -> Span {
        Span { x0, x1 }
    }

    #[test]
    fn empty() {
        let m = GeometryModel::new();
        assert_eq!(fill(&m).unwrap(), FillResult::default());
        assert_eq!(fill_steps(&m).unwrap().count(), 0);
    }

    #[test]
    fn square_rows() {
        let m = GeometryModel::from_polygons([square()]);
        let ret = fill(&m).unwrap();
        assert_eq!(ret.polygons.len(), 1);
        let rows = &ret.polygons[0];
        assert_eq!(
            rows.iter().map(|r| r.y).collect::<Vec<_>>(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0]
        );
        for row in &rows[..4] {
            assert_eq!(row.spans, vec![span(0.0, 4.0)]);
        }
        // The top edge is excluded.
        assert!(rows[4].spans.is_empty());
    }

    #[test]
    fn triangle_chord() {
        let m = GeometryModel::from_polygons([polygon(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)])]);
        let ret = fill(&m).unwrap();
        let row = &ret.polygons[0][2];
        assert_eq!(row.y, 2.0);
        assert_eq!(row.spans, vec![span(1.0, 3.0)]);
    }

    #[test]
    fn overlapping_polygons_are_separate() {
        let other = polygon(&[(2.0, 1.0), (6.0, 1.0), (6.0, 3.0), (2.0, 3.0)]);
        let m = GeometryModel::from_polygons([square(), other]);
        let steps: Vec<_> = fill_steps(&m).unwrap().collect();
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[1],
            ScanlineStep {
                y: 1.0,
                spans: vec![vec![span(0.0, 4.0)], vec![span(2.0, 6.0)]],
            }
        );
        assert_eq!(steps[0].spans[1], vec![]);
    }

    #[test]
    fn aligned_scanlines() {
        let m = GeometryModel::from_polygons([square()]);
        let config = Config {
            scanline_origin: Some(0.5),
            ..Config::default()
        };
        let ys: Vec<_> = fill_steps_with(&m, &config).unwrap().map(|s| s.y).collect();
        assert_eq!(ys, vec![0.5, 1.5, 2.5, 3.5]);

        let config = Config {
            scanline_step: 3.0,
            scanline_origin: Some(-100.0),
            ..Config::default()
        };
        let ys: Vec<_> = fill_steps_with(&m, &config).unwrap().map(|s| s.y).collect();
        assert_eq!(ys, vec![2.0]);
    }

    #[test]
    fn too_many_scanlines() {
        let m = GeometryModel::from_polygons([polygon(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1e12)])]);
        let config = Config {
            scanline_step: 1e-9,
            ..Config::default()
        };
        assert_matches!(
            fill_steps_with(&m, &config),
            Err(Error::InvalidConfig("too many scanlines"))
        );
        assert_matches!(fill_with(&m, &config), Err(Error::InvalidConfig(_)));

        // The origin is far away, but there are still only a few scanlines.
        let config = Config {
            scanline_origin: Some(-1e300),
            ..Config::default()
        };
        assert!(fill_with(&GeometryModel::from_polygons([square()]), &config).is_ok());
    }

    #[test]
    fn vertices_near_scanlines() {
        // The triangle's vertices are all just above a scanline, closer than eps.
        let d = 5e-10;
        let triangle = polygon(&[(0.0, 1.0 + d), (2.0, 1.0 + d), (1.0, 3.0 + d)]);
        let m = GeometryModel::from_polygons([square(), triangle.clone()]);
        let rows = &fill(&m).unwrap().polygons[1];
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert_eq!(row.spans, triangle.spans_at(row.y));
        }
        assert!(rows[1].spans.is_empty());
        assert_eq!(rows[3].spans.len(), 1);
    }

    #[test]
    fn self_intersecting() {
        // A bow tie: even-odd gives two spans below the crossing.
        let bow_tie = polygon(&[(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0)]);
        let m = GeometryModel::from_polygons([bow_tie]);
        let ret = fill(&m).unwrap();
        assert_eq!(ret.polygons[0][1].spans, vec![span(0.0, 1.0), span(3.0, 4.0)]);
    }

    // Small polygons with vertices on a half-integer grid, so that lots of
    // vertices land exactly on scanlines.
    fn polygon_strategy() -> impl Strategy<Value = Polygon2> {
        let coord = (-20..20i32).prop_map(|c| f64::from(c) / 2.0);
        prop::collection::vec((coord.clone(), coord), 3..10)
            .prop_map(|vs| Polygon2::new(vs).unwrap())
    }

    proptest! {
        #[test]
        fn matches_direct_evaluation(polys in prop::collection::vec(polygon_strategy(), 1..4)) {
            let m = GeometryModel::from_polygons(polys.clone());
            let ret = fill_with(&m, &Config::with_eps(0.0)).unwrap();
            for (poly, rows) in polys.iter().zip(&ret.polygons) {
                for row in rows {
                    prop_assert_eq!(&row.spans, &poly.spans_at(row.y));
                }
            }
            let row_counts: Vec<_> = ret.polygons.iter().map(Vec::len).collect();
            prop_assert!(row_counts.windows(2).all(|w| w[0] == w[1]));
        }
    }
}
