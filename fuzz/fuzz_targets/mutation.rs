#![no_main]

use arbitrary::{Arbitrary, Unstructured};

use libfuzzer_sys::fuzz_target;
use sweepstep::treevec::TreeVec;

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { idx: usize, val: i32 },
    Push { val: i32 },
    Remove { idx: usize },
    Set { idx: usize, val: i32 },
}

fn apply<const B: usize>(op: &Op, vec: &mut Vec<i32>, tree_vec: &mut TreeVec<i32, B>) {
    match *op {
        Op::Insert { idx, val } => {
            let idx = idx % (vec.len() + 1);
            vec.insert(idx, val);
            tree_vec.insert(idx, val);
        }
        Op::Push { val } => {
            vec.push(val);
            tree_vec.push(val);
        }
        Op::Remove { idx } => {
            if !vec.is_empty() {
                let idx = idx % vec.len();
                assert_eq!(vec.remove(idx), tree_vec.remove(idx));
            }
        }
        Op::Set { idx, val } => {
            if !vec.is_empty() {
                let idx = idx % vec.len();
                vec[idx] = val;
                *tree_vec.get_mut(idx).unwrap() = val;
            }
        }
    }
}

fn arbitrary_ops(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let len = u.arbitrary_len::<Op>()?;
    let mut vec = Vec::new();
    let mut tree_vec = TreeVec::<_, 4>::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        apply(&op, &mut vec, &mut tree_vec);
        tree_vec.check_invariants();

        assert_eq!(tree_vec.len(), vec.len());
        assert_eq!(tree_vec.iter().copied().collect::<Vec<_>>(), vec);

        let start = u.int_in_range(0..=vec.len())?;
        let end = u.int_in_range(start..=vec.len())?;
        assert_eq!(
            tree_vec.range(start..end).copied().collect::<Vec<_>>(),
            &vec[start..end]
        );
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u);
});
