use std::iter::FusedIterator;

use super::{SweepHandler, Sweeper};

/// Something that produces snapshots one at a time.
///
/// A stepper must be cheap enough to clone that a [`StepSequence`] can keep
/// a pristine copy around for restarting.
pub trait Stepper: Clone {
    /// The type of snapshot produced.
    type Snapshot;

    /// Performs the next unit of work and returns its snapshot, or `None` if
    /// there's no more work.
    fn next_snapshot(&mut self) -> Option<Self::Snapshot>;
}

impl<H: SweepHandler + Clone> Stepper for Sweeper<H> {
    type Snapshot = H::Snapshot;

    fn next_snapshot(&mut self) -> Option<H::Snapshot> {
        self.next_step()
    }
}

/// A lazy, finite, replayable sequence of snapshots.
///
/// Nothing is computed until a snapshot is requested, and each request does
/// just enough work to produce one more snapshot. To cancel, just drop the
/// sequence.
#[derive(Clone, Debug)]
pub struct StepSequence<S> {
    initial: S,
    cursor: S,
    position: usize,
    done: bool,
}

impl<S: Stepper> StepSequence<S> {
    /// Creates a sequence that starts from `stepper`'s current state.
    pub fn new(stepper: S) -> Self {
        StepSequence {
            initial: stepper.clone(),
            cursor: stepper,
            position: 0,
            done: false,
        }
    }

    /// Rewinds this sequence to the beginning.
    pub fn restart(&mut self) {
        self.cursor = self.initial.clone();
        self.position = 0;
        self.done = false;
    }

    /// Returns a new sequence that starts from the beginning, leaving this one untouched.
    pub fn replay(&self) -> Self {
        StepSequence::new(self.initial.clone())
    }

    /// How many snapshots have been produced since the start (or the last restart).
    pub fn position(&self) -> usize {
        self.position
    }

    /// The stepper in its current state.
    pub fn stepper(&self) -> &S {
        &self.cursor
    }
}

impl<S: Stepper> Iterator for StepSequence<S> {
    type Item = S::Snapshot;

    fn next(&mut self) -> Option<S::Snapshot> {
        if self.done {
            return None;
        }
        let ret = self.cursor.next_snapshot();
        match ret {
            Some(_) => self.position += 1,
            None => self.done = true,
        }
        ret
    }
}

impl<S: Stepper> FusedIterator for StepSequence<S> {}
