//! Tunable parameters shared by all the algorithms.

use crate::Error;

/// Numerical and sampling parameters for a computation.
///
/// The defaults are fine for inputs whose coordinates are of moderate size
/// (say, up to `1e6` in absolute value). For much larger coordinates, you
/// will want a larger `eps`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Coordinates closer than this are considered coincident.
    ///
    /// This controls which events are folded into the same step, when an
    /// intersection parameter counts as touching an endpoint, and when two
    /// intersection points are reported as one.
    pub eps: f64,
    /// Vertical distance between consecutive fill scanlines.
    pub scanline_step: f64,
    /// A height that scanlines are aligned to.
    ///
    /// Scanlines are placed at `origin + k * scanline_step`, for integers `k`.
    /// If this is `None`, the first scanline is at the lowest polygon vertex.
    pub scanline_origin: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            eps: 1e-9,
            scanline_step: 1.0,
            scanline_origin: None,
        }
    }
}

impl Config {
    /// A default configuration, but with a different tolerance.
    pub fn with_eps(eps: f64) -> Self {
        Config {
            eps,
            ..Config::default()
        }
    }

    /// Checks that all parameters make sense.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(Error::InvalidConfig(
                "eps must be finite and non-negative",
            ));
        }
        if !self.scanline_step.is_finite() || self.scanline_step <= 0.0 {
            return Err(Error::InvalidConfig(
                "scanline_step must be finite and positive",
            ));
        }
        if self.scanline_origin.is_some_and(|y| !y.is_finite()) {
            return Err(Error::InvalidConfig("scanline_origin must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::with_eps(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_nonsense() {
        assert_matches!(
            Config::with_eps(-1.0).validate(),
            Err(Error::InvalidConfig(_))
        );
        assert_matches!(
            Config::with_eps(f64::NAN).validate(),
            Err(Error::InvalidConfig(_))
        );

        let zero_step = Config {
            scanline_step: 0.0,
            ..Config::default()
        };
        assert_matches!(zero_step.validate(), Err(Error::InvalidConfig(_)));

        let bad_origin = Config {
            scanline_origin: Some(f64::INFINITY),
            ..Config::default()
        };
        assert_matches!(bad_origin.validate(), Err(Error::InvalidConfig(_)));
    }
}
