//! Hand landmark data model and the normalized-to-pixel projector.
//!
//! A detector reports every hand as exactly [`NUM_HAND_LANDMARKS`] points in
//! normalized image coordinates. Projection turns them into integer pixel
//! coordinates relative to one particular frame.

use crate::{
    constants::NUM_HAND_LANDMARKS,
    utils::safe_cast::round_to_i32,
    Error, Result,
};
use opencv::core::{Mat, MatTraitConst, Point};

/// Landmark names in id order
pub const LANDMARK_NAMES: [&str; NUM_HAND_LANDMARKS] = [
    "wrist",
    "thumb_cmc",
    "thumb_mcp",
    "thumb_ip",
    "thumb_tip",
    "index_finger_mcp",
    "index_finger_pip",
    "index_finger_dip",
    "index_finger_tip",
    "middle_finger_mcp",
    "middle_finger_pip",
    "middle_finger_dip",
    "middle_finger_tip",
    "ring_finger_mcp",
    "ring_finger_pip",
    "ring_finger_dip",
    "ring_finger_tip",
    "pinky_mcp",
    "pinky_pip",
    "pinky_dip",
    "pinky_tip",
];

/// Bone segments between landmark ids, used for drawing
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Which hand the detector believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

/// A single landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Landmark id (0-20)
    pub id: usize,
    /// Fraction of frame width
    pub x: f32,
    /// Fraction of frame height
    pub y: f32,
}

/// Width and height of the frame a projection is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl FrameSize {
    /// Create a frame size
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Size of an `OpenCV` frame
    #[must_use]
    pub fn of(frame: &Mat) -> Self {
        Self::new(frame.cols(), frame.rows())
    }

    /// Whether both dimensions are positive
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A landmark projected into pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLandmark {
    /// Landmark id (0-20)
    pub id: usize,
    /// Column in pixels
    pub x: i32,
    /// Row in pixels
    pub y: i32,
}

impl PixelLandmark {
    /// Pixel position as an `OpenCV` point
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<PixelLandmark> for Point {
    fn from(landmark: PixelLandmark) -> Self {
        landmark.point()
    }
}

/// One detected hand: exactly 21 landmarks in id order
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; NUM_HAND_LANDMARKS],
    score: f32,
    handedness: Option<Handedness>,
}

impl Hand {
    /// Build a hand from normalized `(x, y)` points given in id order
    ///
    /// # Errors
    ///
    /// Returns an error if `points` does not hold exactly 21 entries
    pub fn from_points(points: &[(f32, f32)], score: f32) -> Result<Self> {
        let landmarks: Vec<Landmark> = points
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Landmark { id, x, y })
            .collect();
        Self::from_landmarks(landmarks, score)
    }

    /// Build a hand from landmarks
    ///
    /// # Errors
    ///
    /// Returns an error if the count is not 21 or the ids are not `0..21` in order
    pub fn from_landmarks(landmarks: Vec<Landmark>, score: f32) -> Result<Self> {
        let count = landmarks.len();
        if let Some(bad) = landmarks.iter().enumerate().find(|(i, lm)| *i != lm.id) {
            return Err(Error::Landmark(format!(
                "Landmark at position {} has id {}",
                bad.0, bad.1.id
            )));
        }
        let landmarks: [Landmark; NUM_HAND_LANDMARKS] = landmarks.try_into().map_err(|_| {
            Error::Landmark(format!(
                "Expected {NUM_HAND_LANDMARKS} landmarks per hand, got {count}"
            ))
        })?;

        Ok(Self {
            landmarks,
            score,
            handedness: None,
        })
    }

    /// Attach the detector's handedness estimate
    #[must_use]
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    /// All landmarks in id order
    #[must_use]
    pub const fn landmarks(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.landmarks
    }

    /// Landmark by id
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not in `0..21`
    pub fn landmark(&self, id: usize) -> Result<&Landmark> {
        self.landmarks
            .get(id)
            .ok_or_else(|| Error::Landmark(format!("Unknown landmark id {id}")))
    }

    /// Detector presence score
    #[must_use]
    pub const fn score(&self) -> f32 {
        self.score
    }

    /// Handedness, when the model reports it
    #[must_use]
    pub const fn handedness(&self) -> Option<Handedness> {
        self.handedness
    }

    /// Normalized bounding box `(min_x, min_y, max_x, max_y)` of all landmarks
    #[must_use]
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        self.landmarks.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(min_x, min_y, max_x, max_y), lm| {
                (min_x.min(lm.x), min_y.min(lm.y), max_x.max(lm.x), max_y.max(lm.y))
            },
        )
    }

    /// Project all landmarks onto a frame of the given size
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite
    pub fn project(&self, size: FrameSize) -> Result<Vec<PixelLandmark>> {
        self.landmarks.iter().map(|lm| project_landmark(lm, size)).collect()
    }
}

/// Convert a normalized coordinate pair to pixels: `round(normalized * dimension)`
///
/// # Errors
///
/// Returns an error if a coordinate is not finite
pub fn project_point(x: f64, y: f64, size: FrameSize) -> Result<(i32, i32)> {
    Ok((
        round_to_i32(x * f64::from(size.width))?,
        round_to_i32(y * f64::from(size.height))?,
    ))
}

/// Project a single landmark
///
/// # Errors
///
/// Returns an error if a coordinate is not finite
pub fn project_landmark(landmark: &Landmark, size: FrameSize) -> Result<PixelLandmark> {
    let (x, y) = project_point(f64::from(landmark.x), f64::from(landmark.y), size)?;
    Ok(PixelLandmark { id: landmark.id, x, y })
}

/// Inverse of [`project_point`], up to rounding
#[must_use]
pub fn normalize_point(x: i32, y: i32, size: FrameSize) -> (f64, f64) {
    (
        f64::from(x) / f64::from(size.width),
        f64::from(y) / f64::from(size.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand(x: f32, y: f32) -> Hand {
        Hand::from_points(&[(x, y); NUM_HAND_LANDMARKS], 1.0).unwrap()
    }

    #[test]
    fn test_hand_requires_21_landmarks() {
        assert!(Hand::from_points(&[(0.5, 0.5); 20], 1.0).is_err());
        assert!(Hand::from_points(&[(0.5, 0.5); 22], 1.0).is_err());
        assert!(Hand::from_points(&[], 1.0).is_err());
        assert!(Hand::from_points(&[(0.5, 0.5); 21], 1.0).is_ok());
    }

    #[test]
    fn test_hand_rejects_out_of_order_ids() {
        let mut landmarks: Vec<Landmark> = (0..NUM_HAND_LANDMARKS)
            .map(|id| Landmark { id, x: 0.1, y: 0.1 })
            .collect();
        landmarks.swap(3, 4);
        match Hand::from_landmarks(landmarks, 1.0) {
            Err(Error::Landmark(msg)) => assert!(msg.contains("position 3")),
            other => panic!("Expected landmark error, got {other:?}"),
        }
    }

    #[test]
    fn test_landmark_lookup() {
        let hand = flat_hand(0.25, 0.75);
        assert_eq!(hand.landmark(20).unwrap().id, 20);
        assert!(hand.landmark(21).is_err());
    }

    #[test]
    fn test_project_scales_and_rounds() {
        let size = FrameSize::new(640, 480);
        assert_eq!(project_point(0.5, 0.5, size).unwrap(), (320, 240));
        assert_eq!(project_point(0.6, 0.5, size).unwrap(), (384, 240));
        assert_eq!(project_point(0.0, 1.0, size).unwrap(), (0, 480));
        // 0.4999 * 640 = 319.94 rounds up, where truncation would give 319
        assert_eq!(project_point(0.4999, 0.0, size).unwrap(), (320, 0));
    }

    #[test]
    fn test_project_hand_keeps_ids() {
        let hand = flat_hand(0.1, 0.2);
        let pixels = hand.project(FrameSize::new(100, 100)).unwrap();
        assert_eq!(pixels.len(), NUM_HAND_LANDMARKS);
        for (i, px) in pixels.iter().enumerate() {
            assert_eq!(px.id, i);
            assert_eq!((px.x, px.y), (10, 20));
        }
    }

    #[test]
    fn test_project_rejects_nan() {
        assert!(project_point(f64::NAN, 0.5, FrameSize::new(640, 480)).is_err());
    }

    #[test]
    fn test_bounds() {
        let mut points = [(0.5, 0.5); NUM_HAND_LANDMARKS];
        points[0] = (0.2, 0.9);
        points[8] = (0.7, 0.1);
        let hand = Hand::from_points(&points, 0.9).unwrap();
        assert_eq!(hand.bounds(), (0.2, 0.1, 0.7, 0.9));
    }

    #[test]
    fn test_connections_reference_valid_ids() {
        for (a, b) in HAND_CONNECTIONS {
            assert!(a < NUM_HAND_LANDMARKS);
            assert!(b < NUM_HAND_LANDMARKS);
        }
        assert_eq!(LANDMARK_NAMES[4], "thumb_tip");
        assert_eq!(LANDMARK_NAMES[8], "index_finger_tip");
    }
}
