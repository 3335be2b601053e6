use std::collections::BTreeSet;

use crate::{
    model::{BoxIdx, BuildingIdx, PolyIdx, SegIdx},
    num::CheapOrderedFloat,
};

/// What happens at an event, and which primitive(s) it happens to.
///
/// The derived order breaks ties between events at the same coordinate and
/// priority. The polygon fill variants rely on their declaration order; for
/// the others it only makes the order deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum EventKind {
    /// A segment enters the sweep at its left endpoint.
    SegmentStart(SegIdx),
    /// A segment leaves the sweep at its right endpoint.
    SegmentEnd(SegIdx),
    /// Two segments were discovered to meet at this coordinate.
    ///
    /// The first index is always the smaller one.
    IntersectionFound(SegIdx, SegIdx),
    /// A box enters the sweep plane.
    BoxEnter(BoxIdx),
    /// A box leaves the sweep plane.
    BoxExit(BoxIdx),
    /// The left wall of a building.
    BuildingRise(BuildingIdx),
    /// The right wall of a building.
    BuildingFall(BuildingIdx),
    /// A polygon edge leaves the sweep at its upper endpoint.
    EdgeEnd {
        /// The polygon that the edge belongs to.
        polygon: PolyIdx,
        /// The edge runs from vertex `edge` to the vertex after it.
        edge: usize,
    },
    /// A polygon edge enters the sweep at its lower endpoint.
    EdgeStart {
        /// The polygon that the edge belongs to.
        polygon: PolyIdx,
        /// The edge runs from vertex `edge` to the vertex after it.
        edge: usize,
    },
    /// A fill scanline, numbered from the bottom.
    Scanline(usize),
}

impl EventKind {
    /// The usual tie-breaking rank of this kind of event: among events at the
    /// same coordinate, the ones with smaller ranks go first.
    ///
    /// - segments: starts, then intersections, then ends;
    /// - boxes: exits before entrances;
    /// - buildings: rises before falls, so that buildings that just touch
    ///   don't open a gap in the skyline;
    /// - polygon fill: all the same, so a step's events are applied in
    ///   coordinate order even when they're within `eps` of one another. At
    ///   exactly the same height, the declaration order puts edge ends, then
    ///   edge starts, then the scanline, which implements the half-open rule
    ///   for vertices.
    pub fn default_priority(&self) -> u8 {
        match self {
            EventKind::SegmentStart(_) => 0,
            EventKind::IntersectionFound(..) => 1,
            EventKind::SegmentEnd(_) => 2,
            EventKind::BoxExit(_) => 0,
            EventKind::BoxEnter(_) => 1,
            EventKind::BuildingRise(_) => 0,
            EventKind::BuildingFall(_) => 1,
            EventKind::EdgeEnd { .. } | EventKind::EdgeStart { .. } | EventKind::Scanline(_) => 0,
        }
    }
}

/// A sweep event: something that happens at a particular sweep coordinate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Event {
    /// The sweep coordinate of this event.
    pub coord: f64,
    /// What happens.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event.
    pub fn new(coord: f64, kind: EventKind) -> Self {
        Event { coord, kind }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct QueuedEvent {
    coord: CheapOrderedFloat,
    kind: EventKind,
}

/// The pending events of a sweep, ordered by coordinate.
///
/// Pushing an event that is already queued does nothing.
#[derive(Clone, Debug)]
pub struct EventQueue {
    events: BTreeSet<QueuedEvent>,
    // The coordinate of the step currently being processed. Nothing can
    // be scheduled before it.
    current: f64,
}

impl Default for EventQueue {
    fn default() -> Self {
        EventQueue {
            events: BTreeSet::new(),
            current: f64::NEG_INFINITY,
        }
    }
}

impl EventQueue {
    /// Schedules an event.
    ///
    /// Events can't be scheduled in the past: an event behind the current
    /// sweep coordinate gets moved up to the current coordinate.
    pub fn push(&mut self, ev: Event) {
        debug_assert!(!ev.coord.is_nan());
        let coord = if ev.coord < self.current {
            self.current
        } else {
            ev.coord
        };
        self.events.insert(QueuedEvent {
            coord: coord.into(),
            kind: ev.kind,
        });
    }

    /// The number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Are there no pending events?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The coordinate of the step currently being processed.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// The smallest coordinate of any pending event.
    pub fn next_coord(&self) -> Option<f64> {
        self.events.first().map(|ev| ev.coord.into_inner())
    }

    pub(crate) fn set_current(&mut self, coord: f64) {
        debug_assert!(coord >= self.current);
        self.current = coord;
    }

    /// Removes all events with coordinates at most `limit`, appending them to `out`.
    pub(crate) fn pop_until(&mut self, limit: f64, out: &mut Vec<Event>) {
        while let Some(first) = self.events.first() {
            if first.coord.into_inner() > limit {
                break;
            }
            // unwrap: we just checked that there's a first element
            let ev = self.events.pop_first().unwrap();
            out.push(Event {
                coord: ev.coord.into_inner(),
                kind: ev.kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_and_order() {
        let mut q = EventQueue::default();
        q.push(Event::new(2.0, EventKind::BoxExit(BoxIdx(0))));
        q.push(Event::new(1.0, EventKind::BoxEnter(BoxIdx(0))));
        q.push(Event::new(1.0, EventKind::BoxEnter(BoxIdx(0))));
        assert_eq!(q.len(), 2);
        assert_eq!(q.next_coord(), Some(1.0));

        let mut out = Vec::new();
        q.pop_until(1.5, &mut out);
        assert_eq!(out, vec![Event::new(1.0, EventKind::BoxEnter(BoxIdx(0)))]);
        assert_eq!(q.next_coord(), Some(2.0));
    }

    #[test]
    fn no_events_in_the_past() {
        let mut q = EventQueue::default();
        q.set_current(3.0);
        q.push(Event::new(
            2.0,
            EventKind::IntersectionFound(SegIdx(0), SegIdx(1)),
        ));
        assert_eq!(q.next_coord(), Some(3.0));
    }
}
