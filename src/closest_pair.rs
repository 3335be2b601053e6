//! The closest pair of points in three dimensions, by divide and conquer.
//!
//! The recursion is driven by an explicit stack of work items, so that the
//! search can be paused after every merge and inspected.

use std::collections::HashMap;

use crate::{
    geom::Point3,
    model::{PointIdx, Points},
    num::CheapOrderedFloat,
    sweep::{StepSequence, Stepper},
    Config, Error, GeometryModel,
};

/// Two points and the distance between them.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointPair {
    /// The point with the smaller index.
    pub first: PointIdx,
    /// The point with the larger index.
    pub second: PointIdx,
    /// The Euclidean distance between the two points.
    pub distance: f64,
}

/// A snapshot of the closest-pair search, taken after a merge.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClosestPairStep {
    /// The range of positions (in `x`-sorted order) that was just solved.
    pub range: (usize, usize),
    /// The `x` coordinate of the splitting plane, or `None` if the range was
    /// small enough to solve directly.
    pub split_x: Option<f64>,
    /// The closest pair found so far.
    pub best: Option<PointPair>,
}

// Below this many points, we just compare all pairs.
const BASE_CASE: usize = 3;

#[derive(Clone, Copy, Debug)]
enum Frame {
    Solve { lo: usize, hi: usize },
    Merge { lo: usize, mid: usize, hi: usize },
}

// The points of a merge strip, bucketed by their (y, z) cell.
struct StripGrid {
    origin: (f64, f64),
    side: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl StripGrid {
    fn new(points: &Points<Point3>, strip: &[PointIdx], side: f64) -> Self {
        let origin = strip.iter().fold((f64::INFINITY, f64::INFINITY), |(y, z), &idx| {
            (y.min(points[idx].y), z.min(points[idx].z))
        });
        let mut grid = StripGrid {
            origin,
            side,
            cells: HashMap::new(),
        };
        for (pos, &idx) in strip.iter().enumerate() {
            let cell = grid.cell(&points[idx]);
            grid.cells.entry(cell).or_default().push(pos);
        }
        grid
    }

    // With an infinite side everything lands in cell (0, 0). The float to int
    // casts saturate, and they are monotone, so neighbouring points still land
    // in neighbouring cells.
    fn cell(&self, p: &Point3) -> (i64, i64) {
        let coord = |v: f64, origin: f64| {
            if self.side.is_finite() {
                ((v - origin) / self.side).floor() as i64
            } else {
                0
            }
        };
        (coord(p.y, self.origin.0), coord(p.z, self.origin.1))
    }

    // Strip positions of all the points in `p`'s cell and the cells around it.
    fn neighbours(&self, p: &Point3) -> impl Iterator<Item = usize> + '_ {
        let (cy, cz) = self.cell(p);
        (-1i64..=1)
            .flat_map(move |dy| (-1i64..=1).map(move |dz| (dy, dz)))
            .filter_map(move |(dy, dz)| {
                let y = cy.checked_add(dy)?;
                let z = cz.checked_add(dz)?;
                self.cells.get(&(y, z))
            })
            .flatten()
            .copied()
    }
}

/// The state of a closest-pair search.
#[derive(Clone, Debug)]
pub struct ClosestPairSearch<'a> {
    points: &'a Points<Point3>,
    // All the point indices, sorted by x (then y, then z, then index).
    order: Vec<PointIdx>,
    stack: Vec<Frame>,
    // The squared distance and the two points, smaller index first.
    best: Option<(f64, PointIdx, PointIdx)>,
}

impl<'a> ClosestPairSearch<'a> {
    fn new(points: &'a Points<Point3>) -> Self {
        let key = |idx: PointIdx| {
            let p = &points[idx];
            (
                CheapOrderedFloat::from(p.x),
                CheapOrderedFloat::from(p.y),
                CheapOrderedFloat::from(p.z),
                idx,
            )
        };
        let mut order: Vec<_> = points.indices().collect();
        order.sort_by_key(|&idx| key(idx));

        let stack = if order.len() >= 2 {
            vec![Frame::Solve {
                lo: 0,
                hi: order.len(),
            }]
        } else {
            Vec::new()
        };
        ClosestPairSearch {
            points,
            order,
            stack,
            best: None,
        }
    }

    /// The closest pair found so far.
    pub fn best(&self) -> Option<PointPair> {
        self.best.map(|(d, first, second)| PointPair {
            first,
            second,
            distance: d.sqrt(),
        })
    }

    fn best_distance(&self) -> f64 {
        self.best.map_or(f64::INFINITY, |(d, _, _)| d.sqrt())
    }

    fn consider(&mut self, a: PointIdx, b: PointIdx) {
        let d = self.points[a].distance_squared(&self.points[b]);
        if self.best.map_or(true, |(best, _, _)| d < best) {
            self.best = Some((d, a.min(b), a.max(b)));
        }
    }

    fn brute_force(&mut self, lo: usize, hi: usize) {
        for i in lo..hi {
            for j in (i + 1)..hi {
                let (a, b) = (self.order[i], self.order[j]);
                self.consider(a, b);
            }
        }
    }

    // Checks the pairs that straddle the split at `mid`.
    //
    // The strip is bucketed into `delta`-sized cells in (y, z). Each half has
    // no pair closer than `delta`, so every cell holds a bounded number of
    // points, and a pair closer than `delta` is always in neighbouring cells.
    fn merge(&mut self, lo: usize, mid: usize, hi: usize) -> f64 {
        let split_x = self.points[self.order[mid]].x;
        let delta = self.best_distance();
        if delta == 0.0 {
            // Nothing can be strictly closer.
            tracing::trace!(lo, hi, split_x, strip = 0, "merged");
            return split_x;
        }
        let mut strip: Vec<PointIdx> = self.order[lo..hi]
            .iter()
            .copied()
            .filter(|&idx| (self.points[idx].x - split_x).abs() < delta)
            .collect();
        strip.sort_by_key(|&idx| (CheapOrderedFloat::from(self.points[idx].y), idx));

        let grid = StripGrid::new(self.points, &strip, delta);
        let mut candidates = Vec::new();
        for (i, &a) in strip.iter().enumerate() {
            candidates.clear();
            candidates.extend(grid.neighbours(&self.points[a]).filter(|&j| j > i));
            candidates.sort_unstable();
            for &j in &candidates {
                self.consider(a, strip[j]);
            }
        }
        tracing::trace!(lo, hi, split_x, strip = strip.len(), "merged");
        split_x
    }

    // Works until the next merge (or the end), returning the range that was
    // solved and where it was split.
    fn work(&mut self) -> Option<((usize, usize), Option<f64>)> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Solve { lo, hi } if hi - lo <= BASE_CASE => {
                    self.brute_force(lo, hi);
                    if lo == 0 && hi == self.order.len() {
                        return Some(((lo, hi), None));
                    }
                }
                Frame::Solve { lo, hi } => {
                    let mid = lo + (hi - lo) / 2;
                    self.stack.push(Frame::Merge { lo, mid, hi });
                    self.stack.push(Frame::Solve { lo: mid, hi });
                    self.stack.push(Frame::Solve { lo, hi: mid });
                }
                Frame::Merge { lo, mid, hi } => {
                    let split_x = self.merge(lo, mid, hi);
                    return Some(((lo, hi), Some(split_x)));
                }
            }
        }
        None
    }

    fn run(mut self) -> Option<PointPair> {
        while self.work().is_some() {}
        self.best()
    }
}

impl Stepper for ClosestPairSearch<'_> {
    type Snapshot = ClosestPairStep;

    fn next_snapshot(&mut self) -> Option<ClosestPairStep> {
        let (range, split_x) = self.work()?;
        Some(ClosestPairStep {
            range,
            split_x,
            best: self.best(),
        })
    }
}

fn search<'a>(model: &'a GeometryModel, config: &Config) -> Result<ClosestPairSearch<'a>, Error> {
    config.validate()?;
    let points = model.points();
    if points.len() < 2 {
        return Err(Error::InsufficientInput {
            needed: 2,
            found: points.len(),
        });
    }
    tracing::debug!(points = points.len(), "starting closest pair search");
    Ok(ClosestPairSearch::new(points))
}

/// A sequence of snapshots of the closest-pair search.
pub type ClosestPairSteps<'a> = StepSequence<ClosestPairSearch<'a>>;

/// Finds the closest pair of points in the model.
///
/// If several pairs are equally close, the first one found wins. The search
/// visits the left half of each range before the right half, and then the
/// pairs straddling the split.
///
/// Fails with [`Error::InsufficientInput`] if there are fewer than two points.
pub fn closest_pair(model: &GeometryModel) -> Result<PointPair, Error> {
    closest_pair_with(model, &Config::default())
}

/// Finds the closest pair of points in the model.
pub fn closest_pair_with(model: &GeometryModel, config: &Config) -> Result<PointPair, Error> {
    let n = model.points().len();
    let ret = search(model, config)?.run().ok_or(Error::InsufficientInput {
        needed: 2,
        found: n,
    })?;
    tracing::debug!(
        first = ?ret.first,
        second = ?ret.second,
        distance = ret.distance,
        "finished closest pair search"
    );
    Ok(ret)
}

/// Returns the steps of the closest-pair search, one for each merge.
pub fn closest_pair_steps(model: &GeometryModel) -> Result<ClosestPairSteps<'_>, Error> {
    closest_pair_steps_with(model, &Config::default())
}

/// Returns the steps of the closest-pair search, one for each merge.
pub fn closest_pair_steps_with<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<ClosestPairSteps<'a>, Error> {
    Ok(StepSequence::new(search(model, config)?))
}

/// Finds the closest pair by comparing every pair of points.
///
/// Ties go to the pair whose indices come first lexicographically.
pub fn closest_pair_brute_force(model: &GeometryModel) -> Result<PointPair, Error> {
    let points = model.points();
    let mut best: Option<(f64, PointIdx, PointIdx)> = None;
    for (a, p) in points.iter() {
        for (b, q) in points.iter().skip(a.0 + 1) {
            let d = p.distance_squared(q);
            if best.map_or(true, |(best, _, _)| d < best) {
                best = Some((d, a, b));
            }
        }
    }
    best.map(|(d, first, second)| PointPair {
        first,
        second,
        distance: d.sqrt(),
    })
    .ok_or(Error::InsufficientInput {
        needed: 2,
        found: points.len(),
    })
}
