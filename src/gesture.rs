//! Gesture metric: the distance between two projected landmarks.

use crate::{
    landmark::{project_landmark, FrameSize, Hand, PixelLandmark},
    Result,
};

/// Euclidean distance between two pixel positions
#[must_use]
pub fn distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    f64::from(b.0 - a.0).hypot(f64::from(b.1 - a.1))
}

/// Midpoint of two pixel positions
#[must_use]
pub fn midpoint(a: (i32, i32), b: (i32, i32)) -> (f64, f64) {
    (
        (f64::from(a.0) + f64::from(b.0)) / 2.0,
        (f64::from(a.1) + f64::from(b.1)) / 2.0,
    )
}

/// Distance between two landmarks of one hand, measured in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchMeasurement {
    /// First landmark (thumb tip by default)
    pub first: PixelLandmark,
    /// Second landmark (index fingertip by default)
    pub second: PixelLandmark,
    /// Point halfway between the two
    pub center: (f64, f64),
    /// Euclidean distance in pixels
    pub length: f64,
}

impl PinchMeasurement {
    /// Measure two already projected landmarks
    #[must_use]
    pub fn between(first: PixelLandmark, second: PixelLandmark) -> Self {
        let a = (first.x, first.y);
        let b = (second.x, second.y);
        Self {
            first,
            second,
            center: midpoint(a, b),
            length: distance(a, b),
        }
    }

    /// Project two landmarks of `hand` onto a frame and measure them
    ///
    /// # Errors
    ///
    /// Returns an error if a landmark id is unknown or a coordinate is not finite
    pub fn measure(hand: &Hand, first: usize, second: usize, size: FrameSize) -> Result<Self> {
        let first = project_landmark(hand.landmark(first)?, size)?;
        let second = project_landmark(hand.landmark(second)?, size)?;
        Ok(Self::between(first, second))
    }
}
