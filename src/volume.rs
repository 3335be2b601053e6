//! The volume of a union of boxes, by sweeping a plane along the `x` axis.
//!
//! Between two consecutive box walls, the cross-section of the union doesn't
//! change, so the volume of that slab is the cross-sectional area times the
//! slab's width. The cross-sectional area is computed exactly by
//! [`union_area`](crate::area::union_area).

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::{
    area::union_area,
    geom::Box3,
    model::{BoxIdx, Boxes},
    sweep::{Event, EventKind, EventQueue, StepSequence, SweepHandler, Sweeper},
    Config, Error, GeometryModel,
};

/// A snapshot of the volume sweep.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VolumeStep {
    /// The position of the sweep plane.
    pub x: f64,
    /// The boxes crossing the sweep plane, just to its right.
    pub active: Vec<BoxIdx>,
    /// The area of the union's cross-section, just to the right of the sweep plane.
    pub cross_section: f64,
    /// The volume of the part of the union to the left of the sweep plane.
    pub volume: f64,
}

/// The volume sweep's state.
#[derive(Clone, Debug)]
pub struct VolumeSweep<'a> {
    boxes: &'a Boxes<Box3>,
    active: BTreeSet<BoxIdx>,
    cross_section: f64,
    last_x: Option<f64>,
    volume: f64,
}

impl<'a> VolumeSweep<'a> {
    fn new(boxes: &'a Boxes<Box3>) -> Self {
        VolumeSweep {
            boxes,
            active: BTreeSet::new(),
            cross_section: 0.0,
            last_x: None,
            volume: 0.0,
        }
    }

    /// The volume accumulated so far.
    pub fn volume(&self) -> f64 {
        self.volume
    }
}

/// The events for a single box. Degenerate boxes have none.
fn box_events(idx: BoxIdx, b: &Box3) -> ArrayVec<Event, 2> {
    let mut ret = ArrayVec::new();
    if !b.is_degenerate() {
        ret.push(Event::new(b.min().x, EventKind::BoxEnter(idx)));
        ret.push(Event::new(b.max().x, EventKind::BoxExit(idx)));
    }
    ret
}

impl SweepHandler for VolumeSweep<'_> {
    type Snapshot = VolumeStep;

    fn advance(&mut self, x: f64) {
        if let Some(last_x) = self.last_x {
            self.volume += self.cross_section * (x - last_x);
        }
        self.last_x = Some(x);
    }

    fn handle(&mut self, event: &Event, _queue: &mut EventQueue) {
        match event.kind {
            EventKind::BoxEnter(idx) => {
                self.active.insert(idx);
            }
            EventKind::BoxExit(idx) => {
                self.active.remove(&idx);
            }
            kind => unreachable!("unexpected event {kind:?} in the volume sweep"),
        }
    }

    fn finish(&mut self, _x: f64) -> bool {
        let rects: Vec<_> = self
            .active
            .iter()
            .map(|&idx| self.boxes[idx].yz_rect())
            .collect();
        self.cross_section = union_area(&rects);
        true
    }

    fn snapshot(&self, x: f64) -> VolumeStep {
        VolumeStep {
            x,
            active: self.active.iter().copied().collect(),
            cross_section: self.cross_section,
            volume: self.volume,
        }
    }
}

fn sweeper<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<Sweeper<VolumeSweep<'a>>, Error> {
    config.validate()?;
    let boxes = model.boxes();
    tracing::debug!(
        boxes = boxes.len(),
        degenerate = boxes.as_slice().iter().filter(|b| b.is_degenerate()).count(),
        "starting volume sweep"
    );
    Ok(Sweeper::from_primitives(
        VolumeSweep::new(boxes),
        boxes.iter(),
        |(idx, b)| box_events(idx, b),
        config.eps,
    ))
}

/// A sequence of snapshots of the volume sweep.
pub type VolumeSteps<'a> = StepSequence<Sweeper<VolumeSweep<'a>>>;

/// Computes the volume of the union of all the boxes in the model.
pub fn union_volume(model: &GeometryModel) -> Result<f64, Error> {
    union_volume_with(model, &Config::default())
}

/// Computes the volume of the union of all the boxes in the model.
pub fn union_volume_with(model: &GeometryModel, config: &Config) -> Result<f64, Error> {
    let volume = sweeper(model, config)?.run().volume;
    tracing::debug!(volume, "finished volume sweep");
    Ok(volume)
}

/// Returns the steps of the volume sweep, one for each distinct box wall.
pub fn union_volume_steps(model: &GeometryModel) -> Result<VolumeSteps<'_>, Error> {
    union_volume_steps_with(model, &Config::default())
}

/// Returns the steps of the volume sweep, one for each distinct box wall.
pub fn union_volume_steps_with<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<VolumeSteps<'a>, Error> {
    Ok(StepSequence::new(sweeper(model, config)?))
}
