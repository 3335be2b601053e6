use crate::num::CheapOrderedFloat;

use super::{Event, EventQueue};

/// The algorithm-specific half of a sweep.
///
/// A handler owns the sweep's active set and whatever partial result the
/// algorithm is accumulating. The [`Sweeper`] feeds it events in order and
/// asks it for a snapshot at the end of every step.
pub trait SweepHandler {
    /// What gets reported after each step.
    type Snapshot;

    /// Among events at the same coordinate, events with smaller priorities are
    /// handled first.
    fn priority(&self, event: &Event) -> u8 {
        event.kind.default_priority()
    }

    /// Called once at the start of every step, before any of its events are handled.
    fn advance(&mut self, _coord: f64) {}

    /// Handles a single event, possibly scheduling more events.
    fn handle(&mut self, event: &Event, queue: &mut EventQueue);

    /// Called after all the events at a step have been handled.
    ///
    /// Returns `false` if this step isn't interesting enough to report,
    /// in which case no snapshot is taken.
    fn finish(&mut self, _coord: f64) -> bool {
        true
    }

    /// Takes a snapshot of the current state.
    fn snapshot(&self, coord: f64) -> Self::Snapshot;

    /// Checks the internal consistency of the active set.
    ///
    /// Only called when the `slow-asserts` feature is enabled.
    fn check_invariants(&self) {}
}

/// Runs a [`SweepHandler`] over a queue of events, one coordinate at a time.
///
/// All the events whose coordinates are within `eps` of each other get
/// handled in the same step, in priority order. That includes events that
/// get scheduled while the step is being processed, so there is exactly one
/// step per distinct coordinate.
#[derive(Clone, Debug)]
pub struct Sweeper<H> {
    handler: H,
    queue: EventQueue,
    eps: f64,
    // The events of the current step, reused to save on allocations.
    batch: Vec<Event>,
    step_count: usize,
}

impl<H: SweepHandler> Sweeper<H> {
    /// Creates a sweep with some initial events.
    pub fn new(handler: H, events: impl IntoIterator<Item = Event>, eps: f64) -> Self {
        let mut queue = EventQueue::default();
        for ev in events {
            queue.push(ev);
        }
        Sweeper {
            handler,
            queue,
            eps,
            batch: Vec::new(),
            step_count: 0,
        }
    }

    /// Creates a sweep over a collection of primitives, asking `events_for`
    /// for the events of each primitive.
    pub fn from_primitives<P, I>(
        handler: H,
        primitives: impl IntoIterator<Item = P>,
        events_for: impl FnMut(P) -> I,
        eps: f64,
    ) -> Self
    where
        I: IntoIterator<Item = Event>,
    {
        Self::new(handler, primitives.into_iter().flat_map(events_for), eps)
    }

    /// The handler, with its current active set and partial result.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Consumes the sweep, returning its handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// How many steps have been processed so far, including unreported ones.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Processes every event at the next coordinate.
    ///
    /// Returns that coordinate, and whether the step should be reported. Returns
    /// `None` if the sweep is finished.
    fn step(&mut self) -> Option<(f64, bool)> {
        let coord = self.queue.next_coord()?;
        self.queue.set_current(coord);
        self.handler.advance(coord);

        let mut event_count = 0;
        loop {
            self.batch.clear();
            self.queue.pop_until(coord + self.eps, &mut self.batch);
            if self.batch.is_empty() {
                break;
            }
            event_count += self.batch.len();

            let handler = &self.handler;
            self.batch.sort_by_key(|ev| {
                (
                    handler.priority(ev),
                    CheapOrderedFloat::from(ev.coord),
                    ev.kind,
                )
            });
            for ev in &self.batch {
                self.handler.handle(ev, &mut self.queue);
                #[cfg(feature = "slow-asserts")]
                self.handler.check_invariants();
            }
        }

        self.step_count += 1;
        let visible = self.handler.finish(coord);
        tracing::trace!(
            coord,
            event_count,
            pending = self.queue.len(),
            visible,
            "sweep step"
        );
        Some((coord, visible))
    }

    /// Moves the sweep forward to the next reportable step, and returns a snapshot of it.
    ///
    /// Returns `None` when sweeping is complete.
    pub fn next_step(&mut self) -> Option<H::Snapshot> {
        loop {
            let (coord, visible) = self.step()?;
            if visible {
                return Some(self.handler.snapshot(coord));
            }
        }
    }

    /// Sweeps to the end without taking any snapshots, and returns the handler.
    pub fn run(mut self) -> H {
        while self.step().is_some() {}
        self.handler
    }
}
