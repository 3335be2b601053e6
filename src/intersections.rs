//! All the intersections among a collection of line segments.
//!
//! This is a Bentley–Ottmann sweep: a vertical sweep line moves from left to
//! right, and we keep track of the segments crossing it, ordered from bottom
//! to top. Segments can only meet after they become neighbors in that order,
//! so we only ever need to compare neighbors; when neighbors are found to
//! meet, we schedule an [`IntersectionFound`](EventKind::IntersectionFound)
//! event for the sweep to handle when it gets there.
//!
//! Vertical segments (and zero-length ones) never enter the sweep line.
//! Instead, when the sweep reaches one of them, it looks up everything in the
//! sweep line that falls within its vertical extent.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashSet},
};

use arrayvec::ArrayVec;
use kurbo::Point;

use crate::{
    geom::Segment2,
    model::{SegIdx, Segments},
    num::approx_cmp,
    sweep::{Event, EventKind, EventQueue, StepSequence, SweepHandler, Sweeper},
    treevec::TreeVec,
    Config, Error, GeometryModel,
};

/// The places where two segments meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Hit {
    /// The segments meet at a single point, either crossing or touching.
    Point(Point),
    /// The segments are collinear, and they overlap between these two points.
    Overlap(Point, Point),
}

impl Hit {
    fn points(&self) -> ArrayVec<Point, 2> {
        match *self {
            Hit::Point(p) => [p].into_iter().collect(),
            Hit::Overlap(p, q) => ArrayVec::from([p, q]),
        }
    }

    // The leftmost point of the hit.
    fn first(&self) -> Point {
        match *self {
            Hit::Point(p) | Hit::Overlap(p, _) => p,
        }
    }
}

/// A segment, prepared for sweeping.
#[derive(Clone, Debug)]
pub(crate) struct SweepSegment {
    // The endpoints, ordered left to right.
    p0: Point,
    p1: Point,
    slope: f64,
    // Segments that are this narrow don't go in the sweep line.
    vertical: bool,
}

impl SweepSegment {
    fn new(seg: &Segment2, eps: f64) -> Self {
        let (p0, p1) = seg.left_to_right();
        let vertical = p1.x - p0.x <= eps;
        let slope = if vertical {
            f64::INFINITY
        } else {
            (p1.y - p0.y) / (p1.x - p0.x)
        };
        SweepSegment {
            p0,
            p1,
            slope,
            vertical,
        }
    }

    // The height of this segment at horizontal position `x`. Only meaningful
    // for non-vertical segments.
    fn y_at(&self, x: f64) -> f64 {
        if x <= self.p0.x {
            self.p0.y
        } else if x >= self.p1.x {
            self.p1.y
        } else {
            self.p0.y + (x - self.p0.x) * self.slope
        }
    }

    fn y_range(&self) -> (f64, f64) {
        (self.p0.y.min(self.p1.y), self.p0.y.max(self.p1.y))
    }
}

// Parameters within `eps` of the ends of the unit interval get moved to the end.
fn snap(t: f64, eps: f64) -> f64 {
    if t.abs() <= eps {
        0.0
    } else if (t - 1.0).abs() <= eps {
        1.0
    } else {
        t
    }
}

fn point_on_segment(p: Point, s: &SweepSegment, eps: f64) -> bool {
    let dir = s.p1 - s.p0;
    let t = ((p - s.p0).dot(dir) / dir.hypot2()).clamp(0.0, 1.0);
    (p - (s.p0 + dir * t)).hypot() <= eps
}

/// Finds where two segments meet.
///
/// This isn't symmetric in its arguments (because of rounding), so we always
/// call it with the segment with the smaller index first.
pub(crate) fn hit(s: &SweepSegment, t: &SweepSegment, eps: f64) -> Option<Hit> {
    let r = s.p1 - s.p0;
    let q = t.p1 - t.p0;
    let r2 = r.hypot2();
    let q2 = q.hypot2();

    match (r2 == 0.0, q2 == 0.0) {
        (true, true) => return ((s.p0 - t.p0).hypot() <= eps).then_some(Hit::Point(s.p0)),
        (true, false) => return point_on_segment(s.p0, t, eps).then_some(Hit::Point(s.p0)),
        (false, true) => return point_on_segment(t.p0, s, eps).then_some(Hit::Point(t.p0)),
        (false, false) => {}
    }

    let d = t.p0 - s.p0;
    let denom = r.cross(q);
    if denom.abs() <= eps * (r2 * q2).sqrt() {
        // Parallel. If they're also collinear, find the overlap by expressing
        // t's endpoints as parameters along s.
        if d.cross(r).abs() > eps * r2.sqrt() {
            return None;
        }
        let u0 = d.dot(r) / r2;
        let u1 = (t.p1 - s.p0).dot(r) / r2;
        let ((lo, lo_p), (hi, hi_p)) = if u0 <= u1 {
            ((u0, t.p0), (u1, t.p1))
        } else {
            ((u1, t.p1), (u0, t.p0))
        };
        let (lo, lo_p) = if lo > 0.0 { (lo, lo_p) } else { (0.0, s.p0) };
        let (hi, hi_p) = if hi < 1.0 { (hi, hi_p) } else { (1.0, s.p1) };

        return if hi < lo - eps {
            None
        } else if (hi_p - lo_p).hypot() <= eps {
            Some(Hit::Point(lo_p))
        } else {
            Some(Hit::Overlap(lo_p, hi_p))
        };
    }

    let a = snap(d.cross(q) / denom, eps);
    let b = snap(d.cross(r) / denom, eps);
    if !(0.0..=1.0).contains(&a) || !(0.0..=1.0).contains(&b) {
        return None;
    }

    // Touching at an endpoint: report the endpoint exactly.
    let p = if a == 0.0 {
        s.p0
    } else if a == 1.0 {
        s.p1
    } else if b == 0.0 {
        t.p0
    } else if b == 1.0 {
        t.p1
    } else {
        s.p0 + r * a
    };
    Some(Hit::Point(p))
}

// Sorts the points and drops every point within `eps` of one that was kept
// before it. Other points can sort in between two close points (if they have
// almost the same x), so we look back through everything kept within `eps` in x.
fn dedup_points(points: &mut Vec<Point>, eps: f64) {
    points.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
    let mut kept: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points.iter() {
        let close = kept
            .iter()
            .rev()
            .take_while(|q| p.x - q.x <= eps)
            .any(|q| (p.y - q.y).abs() <= eps);
        if !close {
            kept.push(p);
        }
    }
    *points = kept;
}

fn ordered(a: SegIdx, b: SegIdx) -> (SegIdx, SegIdx) {
    (a.min(b), a.max(b))
}

/// All the intersections among a collection of segments.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Intersections {
    /// The distinct intersection points, ordered by `x` and then by `y`.
    ///
    /// Two segments meeting at a single point (crossing or touching)
    /// contribute that point. Collinear segments that overlap contribute both
    /// ends of the overlap.
    pub points: Vec<Point>,
    /// The pairs of segments that meet, with the smaller index first, in
    /// increasing order.
    pub pairs: Vec<(SegIdx, SegIdx)>,
}

/// A snapshot of the intersection sweep.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct IntersectionStep {
    /// The position of the sweep line.
    pub x: f64,
    /// The segments crossing the sweep line (just to its right), from bottom to top.
    pub active: Vec<SegIdx>,
    /// The intersection points found so far.
    pub found: Vec<Point>,
}

/// The intersection sweep's state.
#[derive(Clone, Debug)]
pub struct IntersectionSweep {
    segments: Segments<SweepSegment>,
    eps: f64,
    x: f64,
    active: TreeVec<SegIdx, 16>,
    // Vertical segments that were already handled at the current position.
    verticals_here: Vec<SegIdx>,
    // Pairs that have been compared, whether or not they meet.
    checked: HashSet<(SegIdx, SegIdx)>,
    pairs: BTreeSet<(SegIdx, SegIdx)>,
    points: Vec<Point>,
}

impl IntersectionSweep {
    fn new(segments: &Segments<Segment2>, eps: f64) -> Self {
        IntersectionSweep {
            segments: segments
                .as_slice()
                .iter()
                .map(|s| SweepSegment::new(s, eps))
                .collect(),
            eps,
            x: f64::NEG_INFINITY,
            active: TreeVec::new(),
            verticals_here: Vec::new(),
            checked: HashSet::new(),
            pairs: BTreeSet::new(),
            points: Vec::new(),
        }
    }

    fn events(&self) -> Vec<Event> {
        let mut ret = Vec::with_capacity(2 * self.segments.len());
        for (idx, seg) in self.segments.iter() {
            ret.push(Event::new(seg.p0.x, EventKind::SegmentStart(idx)));
            if !seg.vertical {
                ret.push(Event::new(seg.p1.x, EventKind::SegmentEnd(idx)));
            }
        }
        ret
    }

    fn y_at(&self, seg: SegIdx) -> f64 {
        self.segments[seg].y_at(self.x)
    }

    // The sweep-line order at the current position: by height, then by slope
    // (because that's the order just to the right), then by index.
    fn cmp_at(&self, a: SegIdx, b: SegIdx) -> Ordering {
        let sa = &self.segments[a];
        let sb = &self.segments[b];
        approx_cmp(sa.y_at(self.x), sb.y_at(self.x), self.eps)
            .then_with(|| sa.slope.total_cmp(&sb.slope))
            .then(a.cmp(&b))
    }

    fn position_of(&self, seg: SegIdx) -> Option<usize> {
        let guess = self
            .active
            .partition_point(|&other| self.cmp_at(other, seg) == Ordering::Less);
        if self.active.get(guess) == Some(&seg) {
            Some(guess)
        } else {
            // The order can be slightly off near intersections, because of rounding.
            self.active.iter().position(|&other| other == seg)
        }
    }

    // Records the pair as meeting, if it does.
    fn record_pair(&mut self, a: SegIdx, b: SegIdx) {
        let key = ordered(a, b);
        if a == b || self.pairs.contains(&key) {
            return;
        }
        self.checked.insert(key);
        if let Some(hit) = hit(&self.segments[key.0], &self.segments[key.1], self.eps) {
            tracing::trace!(a = ?key.0, b = ?key.1, ?hit, "found intersection");
            self.pairs.insert(key);
            self.points.extend(hit.points());
        }
    }

    // Compares two segments that just became neighbors, and schedules an
    // event if they meet.
    fn check_neighbors(&mut self, a: SegIdx, b: SegIdx, queue: &mut EventQueue) {
        let key = ordered(a, b);
        if self.pairs.contains(&key) || !self.checked.insert(key) {
            return;
        }
        if let Some(hit) = hit(&self.segments[key.0], &self.segments[key.1], self.eps) {
            queue.push(Event::new(
                hit.first().x,
                EventKind::IntersectionFound(key.0, key.1),
            ));
        }
    }

    fn check_neighbors_at(&mut self, i: usize, queue: &mut EventQueue) {
        if let (Some(&a), Some(&b)) = (self.active.get(i), self.active.get(i + 1)) {
            self.check_neighbors(a, b, queue);
        }
    }

    fn start(&mut self, seg: SegIdx, queue: &mut EventQueue) {
        let pos = self
            .active
            .partition_point(|&other| self.cmp_at(other, seg) == Ordering::Less);
        self.active.insert(pos, seg);
        self.settle(self.segments[seg].p0, &[seg], queue);
    }

    fn end(&mut self, seg: SegIdx, queue: &mut EventQueue) {
        self.settle(self.segments[seg].p1, &[seg], queue);
        let Some(pos) = self.position_of(seg) else {
            return;
        };
        self.active.remove(pos);
        if pos > 0 {
            self.check_neighbors_at(pos - 1, queue);
        }
    }

    fn cross(&mut self, a: SegIdx, b: SegIdx, queue: &mut EventQueue) {
        self.record_pair(a, b);
        if let Some(hit) = hit(&self.segments[a], &self.segments[b], self.eps) {
            self.settle(hit.first(), &[a, b], queue);
        }
    }

    // Puts the run of segments passing through `p` into the order they take
    // just to the right of `p`, and records every pair in the run that meets.
    // The `members` are known to pass through `p`; the ones that already left
    // the sweep line are ignored.
    fn settle(&mut self, p: Point, members: &[SegIdx], queue: &mut EventQueue) {
        let mut positions = members.iter().filter_map(|&seg| self.position_of(seg));
        let Some(first) = positions.next() else {
            return;
        };
        let (first, last) =
            positions.fold((first, first), |(lo, hi), pos| (lo.min(pos), hi.max(pos)));

        let mut lo = self
            .active
            .partition_point(|&s| self.y_at(s) < p.y - self.eps)
            .min(first);
        while lo > 0 && (self.y_at(self.active[lo - 1]) - p.y).abs() <= self.eps {
            lo -= 1;
        }
        let mut hi = lo.max(last + 1);
        while hi < self.active.len() && self.y_at(self.active[hi]) <= p.y + self.eps {
            hi += 1;
        }

        let mut run: Vec<SegIdx> = self.active.range(lo..hi).copied().collect();
        run.sort_by(|&s, &t| {
            self.segments[s]
                .slope
                .total_cmp(&self.segments[t].slope)
                .then(s.cmp(&t))
        });
        for (i, &s) in run.iter().enumerate() {
            if let Some(slot) = self.active.get_mut(lo + i) {
                *slot = s;
            }
        }
        for (i, &s) in run.iter().enumerate() {
            for &t in &run[i + 1..] {
                self.record_pair(s, t);
            }
        }

        if lo > 0 {
            self.check_neighbors_at(lo - 1, queue);
        }
        self.check_neighbors_at(hi - 1, queue);
    }

    // A vertical segment looks up everything it touches.
    fn probe(&mut self, seg: SegIdx) {
        let (y0, y1) = self.segments[seg].y_range();
        let start = self
            .active
            .partition_point(|&s| self.y_at(s) < y0 - self.eps);
        let touched: Vec<SegIdx> = self
            .active
            .range(start..self.active.len())
            .copied()
            .take_while(|&s| self.y_at(s) <= y1 + self.eps)
            .collect();
        for other in touched {
            self.record_pair(seg, other);
        }

        let here = std::mem::take(&mut self.verticals_here);
        for &other in &here {
            self.record_pair(seg, other);
        }
        self.verticals_here = here;
        self.verticals_here.push(seg);
    }

    fn found_points(&self) -> Vec<Point> {
        let mut points = self.points.clone();
        dedup_points(&mut points, self.eps);
        points
    }

    fn into_intersections(self) -> Intersections {
        let mut points = self.points;
        dedup_points(&mut points, self.eps);
        Intersections {
            points,
            pairs: self.pairs.into_iter().collect(),
        }
    }
}

impl SweepHandler for IntersectionSweep {
    type Snapshot = IntersectionStep;

    fn priority(&self, event: &Event) -> u8 {
        match event.kind {
            EventKind::SegmentStart(seg) if self.segments[seg].vertical => 2,
            EventKind::SegmentEnd(_) => 3,
            kind => kind.default_priority(),
        }
    }

    fn advance(&mut self, x: f64) {
        self.x = x;
        self.verticals_here.clear();
    }

    fn handle(&mut self, event: &Event, queue: &mut EventQueue) {
        match event.kind {
            EventKind::SegmentStart(seg) if self.segments[seg].vertical => self.probe(seg),
            EventKind::SegmentStart(seg) => self.start(seg, queue),
            EventKind::SegmentEnd(seg) => self.end(seg, queue),
            EventKind::IntersectionFound(a, b) => self.cross(a, b, queue),
            kind => unreachable!("unexpected event {kind:?} in the intersection sweep"),
        }
    }

    fn snapshot(&self, x: f64) -> IntersectionStep {
        IntersectionStep {
            x,
            active: self.active.iter().copied().collect(),
            found: self.found_points(),
        }
    }

    fn check_invariants(&self) {
        self.active.check_invariants();
        let active: Vec<_> = self.active.iter().copied().collect();
        for w in active.windows(2) {
            assert!(
                self.y_at(w[0]) <= self.y_at(w[1]) + self.eps,
                "{:?} is above {:?} at x = {}",
                w[0],
                w[1],
                self.x
            );
        }
    }
}

fn sweeper(model: &GeometryModel, config: &Config) -> Result<Sweeper<IntersectionSweep>, Error> {
    config.validate()?;
    let handler = IntersectionSweep::new(model.segments(), config.eps);
    tracing::debug!(
        segments = handler.segments.len(),
        vertical = handler
            .segments
            .as_slice()
            .iter()
            .filter(|s| s.vertical)
            .count(),
        "starting intersection sweep"
    );
    let events = handler.events();
    Ok(Sweeper::new(handler, events, config.eps))
}

/// A sequence of snapshots of the intersection sweep.
pub type IntersectionSteps = StepSequence<Sweeper<IntersectionSweep>>;

/// Finds all intersections among the model's segments.
pub fn intersections(model: &GeometryModel) -> Result<Intersections, Error> {
    intersections_with(model, &Config::default())
}

/// Finds all intersections among the model's segments.
pub fn intersections_with(model: &GeometryModel, config: &Config) -> Result<Intersections, Error> {
    let ret = sweeper(model, config)?.run().into_intersections();
    tracing::debug!(
        points = ret.points.len(),
        pairs = ret.pairs.len(),
        "finished intersection sweep"
    );
    Ok(ret)
}

/// Returns the steps of the intersection sweep, one for each distinct
/// endpoint or intersection coordinate.
pub fn intersection_steps(model: &GeometryModel) -> Result<IntersectionSteps, Error> {
    intersection_steps_with(model, &Config::default())
}

/// Returns the steps of the intersection sweep, one for each distinct
/// endpoint or intersection coordinate.
pub fn intersection_steps_with(
    model: &GeometryModel,
    config: &Config,
) -> Result<IntersectionSteps, Error> {
    Ok(StepSequence::new(sweeper(model, config)?))
}

/// Finds all intersections by comparing every pair of segments.
///
/// This takes quadratic time; it's here as a reference for testing. The
/// result is defined in exactly the same way as the result of [`intersections`].
pub fn intersections_brute_force(
    model: &GeometryModel,
    config: &Config,
) -> Result<Intersections, Error> {
    config.validate()?;
    let eps = config.eps;
    let segments: Segments<SweepSegment> = model
        .segments()
        .as_slice()
        .iter()
        .map(|s| SweepSegment::new(s, eps))
        .collect();

    let mut ret = Intersections::default();
    for (i, s) in segments.iter() {
        for (j, t) in segments.iter().skip(i.0 + 1) {
            if let Some(hit) = hit(s, t, eps) {
                ret.pairs.push((i, j));
                ret.points.extend(hit.points());
            }
        }
    }
    dedup_points(&mut ret.points, eps);
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::num::tests::Reasonable;

    type Seg = ((f64, f64), (f64, f64));

    fn model(segs: &[Seg]) -> GeometryModel {
        GeometryModel::from_segments(segs.iter().copied()).unwrap()
    }

    fn points(segs: &[Seg]) -> Vec<Point> {
        intersections(&model(segs)).unwrap().points
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn empty() {
        let m = GeometryModel::new();
        assert_eq!(intersections(&m).unwrap(), Intersections::default());
        assert_eq!(intersection_steps(&m).unwrap().count(), 0);
    }

    #[test]
    fn x_shape() {
        let segs = [((0.0, 0.0), (4.0, 4.0)), ((0.0, 4.0), (4.0, 0.0))];
        let ret = intersections(&model(&segs)).unwrap();
        assert_eq!(ret.points, vec![p(2.0, 2.0)]);
        assert_eq!(ret.pairs, vec![(SegIdx(0), SegIdx(1))]);
    }

    #[test]
    fn x_shape_steps() {
        let m = model(&[((0.0, 0.0), (4.0, 4.0)), ((4.0, 0.0), (0.0, 4.0))]);
        let steps: Vec<_> = intersection_steps(&m).unwrap().collect();
        assert_eq!(
            steps,
            vec![
                IntersectionStep {
                    x: 0.0,
                    active: vec![SegIdx(0), SegIdx(1)],
                    found: vec![],
                },
                IntersectionStep {
                    x: 2.0,
                    active: vec![SegIdx(1), SegIdx(0)],
                    found: vec![p(2.0, 2.0)],
                },
                IntersectionStep {
                    x: 4.0,
                    active: vec![],
                    found: vec![p(2.0, 2.0)],
                },
            ]
        );
    }

    #[test]
    fn shared_endpoint() {
        assert_eq!(
            points(&[((0.0, 0.0), (2.0, 2.0)), ((4.0, 0.0), (2.0, 2.0))]),
            vec![p(2.0, 2.0)]
        );
    }

    #[test]
    fn parallel() {
        assert!(points(&[((0.0, 0.0), (2.0, 2.0)), ((0.0, 1.0), (2.0, 3.0))]).is_empty());
    }

    #[test]
    fn vertical() {
        assert_eq!(
            points(&[((1.0, -1.0), (1.0, 1.0)), ((0.0, 0.0), (2.0, 0.0))]),
            vec![p(1.0, 0.0)]
        );
        // Two vertical segments touching end to end.
        assert_eq!(
            points(&[((1.0, -1.0), (1.0, 1.0)), ((1.0, 3.0), (1.0, 1.0))]),
            vec![p(1.0, 1.0)]
        );
        // A vertical segment that misses.
        assert!(points(&[((1.0, 1.0), (1.0, 2.0)), ((0.0, 0.0), (2.0, 0.0))]).is_empty());
    }

    #[test]
    fn zero_length() {
        assert_eq!(
            points(&[((1.0, 1.0), (1.0, 1.0)), ((0.0, 0.0), (2.0, 2.0))]),
            vec![p(1.0, 1.0)]
        );
        assert!(points(&[((1.0, 1.5), (1.0, 1.5)), ((0.0, 0.0), (2.0, 2.0))]).is_empty());
    }

    #[test]
    fn collinear_overlap() {
        let segs = [((0.0, 0.0), (2.0, 2.0)), ((3.0, 3.0), (1.0, 1.0))];
        let ret = intersections(&model(&segs)).unwrap();
        assert_eq!(ret.points, vec![p(1.0, 1.0), p(2.0, 2.0)]);
        assert_eq!(ret.pairs.len(), 1);
    }

    #[test]
    fn concurrent() {
        let ret = intersections(&model(&[
            ((0.0, 0.0), (2.0, 2.0)),
            ((0.0, 2.0), (2.0, 0.0)),
            ((0.0, 1.0), (2.0, 1.0)),
        ]))
        .unwrap();
        assert_eq!(ret.points, vec![p(1.0, 1.0)]);
        assert_eq!(
            ret.pairs,
            vec![
                (SegIdx(0), SegIdx(1)),
                (SegIdx(0), SegIdx(2)),
                (SegIdx(1), SegIdx(2))
            ]
        );
    }

    #[test]
    fn nearly_touching_snaps_to_endpoint() {
        assert_eq!(
            points(&[((0.0, 0.0), (1.0, 0.0)), ((1.0 + 1e-12, -1.0), (1.0 + 1e-12, 1.0))]),
            vec![p(1.0, 0.0)]
        );
        assert!(intersections_with(
            &model(&[((0.0, 0.0), (1.0, 0.0)), ((1.0 + 1e-12, -1.0), (1.0 + 1e-12, 1.0))]),
            &Config::with_eps(0.0)
        )
        .unwrap()
        .points
        .is_empty());
    }

    #[test]
    fn dedup_looks_past_points_in_between() {
        // The middle point sorts between the other two, which are within eps.
        let mut pts = vec![p(2e-10, 1e-10), p(1e-10, 5.0), p(0.0, 0.0)];
        dedup_points(&mut pts, 1e-9);
        assert_eq!(pts, vec![p(0.0, 0.0), p(1e-10, 5.0)]);

        let mut pts = vec![p(0.0, 0.0), p(0.0, 0.0), p(0.0, 1e-9)];
        dedup_points(&mut pts, 0.0);
        assert_eq!(pts, vec![p(0.0, 0.0), p(0.0, 1e-9)]);
    }

    #[test]
    fn separated_by_a_short_segment() {
        // The third segment sits between the first two for a while.
        let ret = intersections(&model(&[
            ((0.0, 0.0), (10.0, 10.0)),
            ((0.0, 10.0), (10.0, 0.0)),
            ((1.0, 5.0), (2.0, 5.0)),
        ]))
        .unwrap();
        assert_eq!(ret.points, vec![p(5.0, 5.0)]);
    }

    fn segments() -> impl Strategy<Value = Vec<Seg>> {
        prop::collection::vec(<((f64, f64), (f64, f64))>::reasonable(), 0..12)
    }

    // Small integer coordinates, so that there are lots of coincidences.
    fn grid_segments() -> impl Strategy<Value = Vec<Seg>> {
        let coord = (0..5i32).prop_map(f64::from);
        prop::collection::vec(
            ((coord.clone(), coord.clone()), (coord.clone(), coord)),
            0..8,
        )
    }

    proptest! {
        #[test]
        fn matches_brute_force(segs in segments()) {
            let m = model(&segs);
            let config = Config::default();
            prop_assert_eq!(
                intersections_with(&m, &config).unwrap(),
                intersections_brute_force(&m, &config).unwrap()
            );
        }

        #[test]
        fn matches_brute_force_on_grid(segs in grid_segments()) {
            let m = model(&segs);
            let config = Config::default();
            prop_assert_eq!(
                intersections_with(&m, &config).unwrap(),
                intersections_brute_force(&m, &config).unwrap()
            );
        }

        #[test]
        fn steps_are_ordered(segs in segments()) {
            let m = model(&segs);
            let steps: Vec<_> = intersection_steps(&m).unwrap().collect();
            prop_assert!(steps.windows(2).all(|w| w[0].x < w[1].x));
            prop_assert!(steps.windows(2).all(|w| w[0].found.len() <= w[1].found.len()));
            if let Some(last) = steps.last() {
                prop_assert!(last.active.is_empty());
                prop_assert_eq!(&last.found, &intersections(&m).unwrap().points);
            }
        }
    }
}
