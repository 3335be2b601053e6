//! The generic sweep machinery.
//!
//! A sweep is a [`Sweeper`] driving a [`SweepHandler`]: the sweeper keeps the
//! [`EventQueue`] and decides which events belong to which step, while the
//! handler keeps the active set and the partial result. Wrapping a sweeper
//! in a [`StepSequence`] turns it into a lazy, replayable iterator of
//! snapshots.

mod engine;
mod event;
mod steps;

pub use engine::{SweepHandler, Sweeper};
pub use event::{Event, EventKind, EventQueue};
pub use steps::{StepSequence, Stepper};
