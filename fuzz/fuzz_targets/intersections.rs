#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use sweepstep::{Config, intersections};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(model) = sweepstep::arbitrary::segments(&mut u) else {
        return;
    };
    let config = Config::default();
    let sweep = intersections::intersections_with(&model, &config).unwrap();
    let brute = intersections::intersections_brute_force(&model, &config).unwrap();
    assert_eq!(sweep.pairs, brute.pairs);

    let steps: Vec<_> = intersections::intersection_steps_with(&model, &config)
        .unwrap()
        .collect();
    if let Some(last) = steps.last() {
        assert!(last.active.is_empty());
        assert_eq!(last.found, sweep.points);
    }
});
