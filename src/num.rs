//! A cheap total order on `f64`, for sort keys and ordered maps.

use std::hash::Hash;

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one just treats incomparable values as equal -- it doesn't order NaNs, nor
/// does it guard against them on construction. Every coordinate that reaches
/// a sweep has already been checked for finiteness by the model, so this is
/// all the ordering we need.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CheapOrderedFloat(f64);

impl Hash for CheapOrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Normalize -0.0 so that equal values hash equally.
        (self.0 + 0.0).to_bits().hash(state)
    }
}

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

// Now comes the fishy stuff.
impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 < other.0 {
            std::cmp::Ordering::Less
        } else if self.0 > other.0 {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

impl From<CheapOrderedFloat> for f64 {
    fn from(value: CheapOrderedFloat) -> Self {
        value.0
    }
}

/// Compares two floats, treating anything within `eps` as equal.
pub(crate) fn approx_cmp(a: f64, b: f64, eps: f64) -> std::cmp::Ordering {
    if (a - b).abs() <= eps {
        std::cmp::Ordering::Equal
    } else {
        CheapOrderedFloat(a).cmp(&CheapOrderedFloat(b))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    // Kind of like Arbitrary, but
    // - it's a local trait, so we can impl it for whatever we want, and
    // - it only returns "reasonable" values.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl<S: Reasonable, T: Reasonable> Reasonable for (S, T) {
        type Strategy = (S::Strategy, T::Strategy);

        fn reasonable() -> Self::Strategy {
            (S::reasonable(), T::reasonable())
        }
    }

    impl Reasonable for f64 {
        type Strategy = BoxedStrategy<f64>;

        fn reasonable() -> Self::Strategy {
            (-1e3..1e3).boxed()
        }
    }

    #[test]
    fn negative_zero() {
        use std::collections::HashSet;

        let zeros: HashSet<_> = [CheapOrderedFloat::from(0.0), CheapOrderedFloat::from(-0.0)]
            .into_iter()
            .collect();
        assert_eq!(zeros.len(), 1);
        assert_eq!(
            CheapOrderedFloat::from(0.0).cmp(&CheapOrderedFloat::from(-0.0)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn approx() {
        use std::cmp::Ordering::*;

        assert_eq!(approx_cmp(1.0, 1.0 + 1e-12, 1e-9), Equal);
        assert_eq!(approx_cmp(1.0, 1.1, 1e-9), Less);
        assert_eq!(approx_cmp(1.1, 1.0, 1e-9), Greater);
    }

    proptest! {
        #[test]
        fn sorting_agrees_with_partial_cmp(
            mut xs in prop::collection::vec(f64::reasonable(), 0..32),
        ) {
            let mut ys = xs.clone();
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            ys.sort_by_key(|y| CheapOrderedFloat::from(*y));
            prop_assert_eq!(xs, ys);
        }
    }
}
