//! The skyline of a set of buildings.
//!
//! The outline is a list of vertices `(x, height)`, each meaning that the
//! skyline jumps to `height` at `x` and stays there until the next vertex.
//! Before the first vertex and after the last one, the skyline is on the
//! ground.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::{
    geom::Building,
    model::{BuildingIdx, Buildings},
    num::CheapOrderedFloat,
    sweep::{Event, EventKind, EventQueue, StepSequence, SweepHandler, Sweeper},
    Config, Error, GeometryModel,
};

/// A corner of the skyline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SkylineVertex {
    /// Where the height changes.
    pub x: f64,
    /// The height just to the right of `x`.
    pub height: f64,
}

/// A snapshot of the skyline sweep.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SkylineStep {
    /// The position of the sweep line.
    pub x: f64,
    /// The heights of the buildings crossing the sweep line, tallest first.
    pub heights: Vec<f64>,
    /// The outline so far.
    pub outline: Vec<SkylineVertex>,
}

/// The skyline sweep's state.
#[derive(Clone, Debug)]
pub struct SkylineSweep<'a> {
    buildings: &'a Buildings<Building>,
    // A multiset of the active heights.
    heights: BTreeMap<CheapOrderedFloat, usize>,
    outline: Vec<SkylineVertex>,
}

impl<'a> SkylineSweep<'a> {
    fn new(buildings: &'a Buildings<Building>) -> Self {
        SkylineSweep {
            buildings,
            heights: BTreeMap::new(),
            outline: Vec::new(),
        }
    }

    fn current_height(&self) -> f64 {
        self.heights
            .last_key_value()
            .map_or(0.0, |(h, _)| h.into_inner())
    }
}

fn building_events(idx: BuildingIdx, b: &Building) -> ArrayVec<Event, 2> {
    let mut ret = ArrayVec::new();
    if !b.is_degenerate() {
        ret.push(Event::new(b.left(), EventKind::BuildingRise(idx)));
        ret.push(Event::new(b.right(), EventKind::BuildingFall(idx)));
    }
    ret
}

impl SweepHandler for SkylineSweep<'_> {
    type Snapshot = SkylineStep;

    fn handle(&mut self, event: &Event, _queue: &mut EventQueue) {
        match event.kind {
            EventKind::BuildingRise(idx) => {
                let h = CheapOrderedFloat::from(self.buildings[idx].height());
                *self.heights.entry(h).or_insert(0) += 1;
            }
            EventKind::BuildingFall(idx) => {
                let h = CheapOrderedFloat::from(self.buildings[idx].height());
                if let Some(count) = self.heights.get_mut(&h) {
                    *count -= 1;
                    if *count == 0 {
                        self.heights.remove(&h);
                    }
                }
            }
            kind => unreachable!("unexpected event {kind:?} in the skyline sweep"),
        }
    }

    fn finish(&mut self, x: f64) -> bool {
        let height = self.current_height();
        let last = self.outline.last().map_or(0.0, |v| v.height);
        if height != last {
            self.outline.push(SkylineVertex { x, height });
        }
        true
    }

    fn snapshot(&self, x: f64) -> SkylineStep {
        SkylineStep {
            x,
            heights: self
                .heights
                .iter()
                .rev()
                .flat_map(|(h, &count)| std::iter::repeat(h.into_inner()).take(count))
                .collect(),
            outline: self.outline.clone(),
        }
    }

    #[cfg(feature = "slow-asserts")]
    fn check_invariants(&self) {
        assert!(self.heights.values().all(|&count| count > 0));
        assert!(self
            .outline
            .windows(2)
            .all(|w| w[0].x < w[1].x && w[0].height != w[1].height));
    }
}

fn sweeper<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<Sweeper<SkylineSweep<'a>>, Error> {
    config.validate()?;
    let buildings = model.buildings();
    tracing::debug!(
        buildings = buildings.len(),
        degenerate = buildings.as_slice().iter().filter(|b| b.is_degenerate()).count(),
        "starting skyline sweep"
    );
    Ok(Sweeper::from_primitives(
        SkylineSweep::new(buildings),
        buildings.iter(),
        |(idx, b)| building_events(idx, b),
        config.eps,
    ))
}

/// A sequence of snapshots of the skyline sweep.
pub type SkylineSteps<'a> = StepSequence<Sweeper<SkylineSweep<'a>>>;

/// Computes the skyline of the buildings in the model.
///
/// The `x` coordinates of the result are strictly increasing, consecutive
/// vertices have different heights, and the last vertex (if there is one)
/// has height zero.
pub fn skyline(model: &GeometryModel) -> Result<Vec<SkylineVertex>, Error> {
    skyline_with(model, &Config::default())
}

/// Computes the skyline of the buildings in the model.
pub fn skyline_with(model: &GeometryModel, config: &Config) -> Result<Vec<SkylineVertex>, Error> {
    let outline = sweeper(model, config)?.run().outline;
    tracing::debug!(vertices = outline.len(), "finished skyline sweep");
    Ok(outline)
}

/// Returns the steps of the skyline sweep, one for each distinct building wall.
pub fn skyline_steps(model: &GeometryModel) -> Result<SkylineSteps<'_>, Error> {
    skyline_steps_with(model, &Config::default())
}

/// Returns the steps of the skyline sweep, one for each distinct building wall.
pub fn skyline_steps_with<'a>(
    model: &'a GeometryModel,
    config: &Config,
) -> Result<SkylineSteps<'a>, Error> {
    Ok(StepSequence::new(sweeper(model, config)?))
}

/// Computes the skyline by evaluating every building at every wall.
///
/// This takes quadratic time, and exists mainly to check [`skyline`] against.
pub fn skyline_brute_force(model: &GeometryModel) -> Vec<SkylineVertex> {
    let buildings: Vec<&Building> = model
        .buildings()
        .as_slice()
        .iter()
        .filter(|b| !b.is_degenerate())
        .collect();
    let mut xs: Vec<f64> = buildings.iter().flat_map(|b| [b.left(), b.right()]).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    let mut ret: Vec<SkylineVertex> = Vec::new();
    for x in xs {
        let height = buildings
            .iter()
            .map(|b| b.height_at(x))
            .fold(0.0, f64::max);
        if height != ret.last().map_or(0.0, |v| v.height) {
            ret.push(SkylineVertex { x, height });
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn model(buildings: &[(f64, f64, f64)]) -> GeometryModel {
        GeometryModel::from_buildings(
            buildings
                .iter()
                .map(|&(l, r, h)| Building::new(l, r, h).unwrap()),
        )
    }

    fn vertices(outline: &[SkylineVertex]) -> Vec<(f64, f64)> {
        outline.iter().map(|v| (v.x, v.height)).collect()
    }

    #[test]
    fn empty() {
        assert!(skyline(&GeometryModel::new()).unwrap().is_empty());
        let flat = model(&[(0.0, 1.0, 0.0), (2.0, 2.0, 5.0)]);
        assert!(skyline(&flat).unwrap().is_empty());
        assert_eq!(skyline_steps(&flat).unwrap().count(), 0);
    }

    #[test]
    fn three_buildings() {
        let m = model(&[(0.0, 4.0, 8.0), (4.0, 8.0, 6.0), (6.0, 10.0, 10.0)]);
        assert_eq!(
            vertices(&skyline(&m).unwrap()),
            vec![(0.0, 8.0), (4.0, 6.0), (6.0, 10.0), (10.0, 0.0)]
        );
    }

    #[test]
    fn three_building_steps() {
        let m = model(&[(0.0, 4.0, 8.0), (4.0, 8.0, 6.0), (6.0, 10.0, 10.0)]);
        let steps: Vec<_> = skyline_steps(&m).unwrap().collect();
        insta::assert_debug_snapshot!(
            steps.iter().map(|s| (s.x, s.heights.clone())).collect::<Vec<_>>(),
            @r###"
        [
            (
                0.0,
                [
                    8.0,
                ],
            ),
            (
                4.0,
                [
                    6.0,
                ],
            ),
            (
                6.0,
                [
                    10.0,
                    6.0,
                ],
            ),
            (
                8.0,
                [
                    10.0,
                ],
            ),
            (
                10.0,
                [],
            ),
        ]
        "###
        );
        // The outline at x = 8 didn't change.
        assert_eq!(steps[3].outline, steps[2].outline);
    }

    #[test]
    fn equal_heights_merge() {
        // Touching buildings of the same height make one flat roof, and a
        // building hidden behind another leaves no trace.
        let m = model(&[(0.0, 2.0, 3.0), (2.0, 5.0, 3.0), (1.0, 4.0, 1.0)]);
        assert_eq!(vertices(&skyline(&m).unwrap()), vec![(0.0, 3.0), (5.0, 0.0)]);
    }

    #[test]
    fn gap() {
        let m = model(&[(0.0, 1.0, 2.0), (3.0, 4.0, 2.0)]);
        assert_eq!(
            vertices(&skyline(&m).unwrap()),
            vec![(0.0, 2.0), (1.0, 0.0), (3.0, 2.0), (4.0, 0.0)]
        );
    }

    fn buildings() -> impl Strategy<Value = Vec<Building>> {
        let coord = (-20..20i32).prop_map(f64::from);
        prop::collection::vec((coord.clone(), coord, 0..6i32), 0..12).prop_map(|bs| {
            bs.into_iter()
                .map(|(a, b, h)| Building::new(a.min(b), a.max(b), f64::from(h)).unwrap())
                .collect()
        })
    }

    proptest! {
        #[test]
        fn matches_brute_force(buildings in buildings()) {
            let m = GeometryModel::from_buildings(buildings);
            let outline = skyline_with(&m, &Config::with_eps(0.0)).unwrap();
            prop_assert_eq!(&outline, &skyline_brute_force(&m));
        }

        #[test]
        fn outline_is_pointwise_max(buildings in buildings()) {
            let m = GeometryModel::from_buildings(buildings.clone());
            let outline = skyline(&m).unwrap();
            prop_assert!(outline.windows(2).all(|w| w[0].x < w[1].x && w[0].height != w[1].height));
            if let Some(last) = outline.last() {
                prop_assert_eq!(last.height, 0.0);
            }

            // Check the height in the middle of every half-unit.
            for i in -41..41 {
                let x = f64::from(i) / 2.0 + 0.25;
                let expected = buildings.iter().map(|b| b.height_at(x)).fold(0.0, f64::max);
                let idx = outline.partition_point(|v| v.x <= x);
                let actual = if idx == 0 { 0.0 } else { outline[idx - 1].height };
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
