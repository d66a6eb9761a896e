//! Constants used throughout the application

/// Number of landmarks reported per hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Landmark id of the thumb tip
pub const THUMB_TIP: usize = 4;

/// Landmark id of the index fingertip
pub const INDEX_FINGER_TIP: usize = 8;

/// Default capture resolution
pub const DEFAULT_CAMERA_WIDTH: i32 = 640;
pub const DEFAULT_CAMERA_HEIGHT: i32 = 480;

/// Consecutive failed camera reads tolerated before giving up
pub const DEFAULT_MAX_READ_FAILURES: u32 = 100;

/// Detector defaults
pub const DEFAULT_MAX_HANDS: usize = 2;
pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.5;

/// Side length of the square hand landmark model input
pub const LANDMARK_MODEL_INPUT_SIZE: i32 = 224;

/// Values per landmark in the model output (x, y, z)
pub const LANDMARK_MODEL_VALUES_PER_POINT: usize = 3;

/// Tracking crop side relative to the previous hand's bounding box
pub const TRACKING_ROI_SCALE: f64 = 2.0;

/// Fingertip distance (pixels) mapped to minimum and maximum volume
pub const DEFAULT_DISTANCE_MIN: f64 = 50.0;
pub const DEFAULT_DISTANCE_MAX: f64 = 300.0;

/// Distance below which the fingers count as pinched
pub const DEFAULT_PINCH_THRESHOLD: f64 = 50.0;

/// Volume bar geometry in the preview (y of the empty and full positions)
pub const VOLUME_BAR_BOTTOM: f64 = 400.0;
pub const VOLUME_BAR_TOP: f64 = 150.0;
pub const VOLUME_BAR_LEFT: i32 = 50;
pub const VOLUME_BAR_RIGHT: i32 = 85;

/// Percentage range shown next to the bar
pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

/// Raw range of a `PulseAudio` sink volume (100%)
pub const PULSE_VOLUME_NORM: f64 = 65536.0;
