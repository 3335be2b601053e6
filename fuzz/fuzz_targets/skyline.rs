#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use sweepstep::{Config, skyline};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(model) = sweepstep::arbitrary::buildings(&mut u) else {
        return;
    };
    let outline = skyline::skyline_with(&model, &Config::with_eps(0.0)).unwrap();
    assert_eq!(outline, skyline::skyline_brute_force(&model));
});
