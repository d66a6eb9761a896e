//! Linear mapping of a scalar from a source range onto a target range.

use crate::{Error, Result};

/// Map `value` from `source` onto `target` without clamping
///
/// Values outside `source` extrapolate past the ends of `target`.
#[must_use]
pub fn interpolate(value: f64, source: (f64, f64), target: (f64, f64)) -> f64 {
    let ratio = (value - source.0) / (source.1 - source.0);
    target.0 + ratio * (target.1 - target.0)
}

/// A fixed source-to-target linear mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMapper {
    source: (f64, f64),
    target: (f64, f64),
}

impl RangeMapper {
    /// Create a mapper
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not finite or the source range is empty
    pub fn new(source: (f64, f64), target: (f64, f64)) -> Result<Self> {
        let bounds = [source.0, source.1, target.0, target.1];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Range bounds must be finite: {source:?} -> {target:?}"
            )));
        }
        if (source.1 - source.0).abs() < f64::EPSILON {
            return Err(Error::InvalidInput(format!(
                "Source range {source:?} is empty"
            )));
        }
        Ok(Self { source, target })
    }

    /// Source range
    #[must_use]
    pub const fn source(&self) -> (f64, f64) {
        self.source
    }

    /// Target range
    #[must_use]
    pub const fn target(&self) -> (f64, f64) {
        self.target
    }

    /// Linear map, extrapolating outside the source range
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        interpolate(value, self.source, self.target)
    }

    /// Linear map with the result held inside the target range
    #[must_use]
    pub fn map_clamped(&self, value: f64) -> f64 {
        let (lo, hi) = if self.target.0 <= self.target.1 {
            (self.target.0, self.target.1)
        } else {
            (self.target.1, self.target.0)
        };
        self.map(value).clamp(lo, hi)
    }

    /// [`map_clamped`](Self::map_clamped) or [`map`](Self::map) depending on `clamp`
    #[must_use]
    pub fn apply(&self, value: f64, clamp: bool) -> f64 {
        if clamp {
            self.map_clamped(value)
        } else {
            self.map(value)
        }
    }
}
