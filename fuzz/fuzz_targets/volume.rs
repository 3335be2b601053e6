#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use sweepstep::{Config, GeometryModel, volume};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(model) = sweepstep::arbitrary::boxes(&mut u) else {
        return;
    };
    let config = Config::with_eps(0.0);
    let volume = volume::union_volume_with(&model, &config).unwrap();

    let boxes = model.boxes().as_slice();
    let sum: f64 = boxes.iter().map(|b| b.volume()).sum();
    let largest = boxes.iter().map(|b| b.volume()).fold(0.0, f64::max);
    let tol = 1e-9 * (1.0 + sum);
    assert!(volume <= sum + tol);
    assert!(volume + tol >= largest);

    let mut reversed = boxes.to_vec();
    reversed.reverse();
    let reversed =
        volume::union_volume_with(&GeometryModel::from_boxes(reversed), &config).unwrap();
    assert!((volume - reversed).abs() <= tol);
});
