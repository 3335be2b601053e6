#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use sweepstep::treevec::TreeVec;

fn check(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let mut vec: Vec<i16> = u.arbitrary()?;
    vec.sort();

    // Build by positional insertion, so that the tree isn't just a sequence
    // of full leaves.
    let mut tree_vec = TreeVec::<i16, 4>::new();
    for x in vec.iter().rev() {
        tree_vec.insert(0, *x);
    }

    for _ in 0..4 {
        let search: i16 = u.arbitrary()?;
        assert_eq!(
            vec.partition_point(|x| x <= &search),
            tree_vec.partition_point(|x| x <= &search)
        );
        assert_eq!(
            vec.partition_point(|x| x < &search),
            tree_vec.partition_point(|x| x < &search)
        );
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = check(Unstructured::new(data));
});
