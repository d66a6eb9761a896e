//! Configuration management for the hand volume control application

use crate::{
    constants::{
        DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, DEFAULT_DETECTION_CONFIDENCE, DEFAULT_DISTANCE_MAX,
        DEFAULT_DISTANCE_MIN, DEFAULT_MAX_HANDS, DEFAULT_MAX_READ_FAILURES, DEFAULT_PINCH_THRESHOLD,
        DEFAULT_TRACKING_CONFIDENCE, INDEX_FINGER_TIP, NUM_HAND_LANDMARKS, THUMB_TIP,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame source configuration
    pub camera: CameraConfig,

    /// Hand landmark detector configuration
    pub detector: DetectorConfig,

    /// Fingertip distance mapping
    pub gesture: GestureConfig,

    /// Volume backend configuration
    pub volume: VolumeConfig,

    /// Preview window configuration
    pub display: DisplayConfig,
}

/// Camera capture parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera device index
    pub index: i32,

    /// Requested capture width
    pub width: i32,

    /// Requested capture height
    pub height: i32,

    /// Consecutive failed reads before the camera is given up
    pub max_read_failures: u32,
}

/// Hand landmark detector parameters, fixed when the detector is built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the hand landmark ONNX model
    pub model: PathBuf,

    /// Treat every frame as an unrelated still image (no tracking between frames)
    pub static_image_mode: bool,

    /// Maximum number of hands reported per frame
    pub max_hands: usize,

    /// Minimum presence score for a newly detected hand (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Minimum presence score to keep tracking a hand (0.0-1.0)
    pub min_tracking_confidence: f32,
}

/// Fingertip distance to volume mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Which detected hand drives the control
    pub hand_index: usize,

    /// First landmark id of the measured pair
    pub first_landmark: usize,

    /// Second landmark id of the measured pair
    pub second_landmark: usize,

    /// Distance (pixels) mapped to the lowest volume
    pub distance_min: f64,

    /// Distance (pixels) mapped to the highest volume
    pub distance_max: f64,

    /// Distance below which the fingers count as pinched
    pub pinch_threshold: f64,

    /// Hold mapped values inside their target ranges
    pub clamp: bool,
}

/// Volume backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Apply levels to the backend at all
    pub enabled: bool,

    /// Backend name (amixer, pactl, log)
    pub backend: String,

    /// Mixer control or sink name
    pub control: String,
}

/// Preview window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the annotated preview window
    pub gui: bool,

    /// Draw all hand landmarks and connections
    pub draw_landmarks: bool,

    /// Preview window title
    pub window_name: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("assets/hand_landmark.onnx"),
            static_image_mode: false,
            max_hands: DEFAULT_MAX_HANDS,
            min_detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_TRACKING_CONFIDENCE,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hand_index: 0,
            first_landmark: THUMB_TIP,
            second_landmark: INDEX_FINGER_TIP,
            distance_min: DEFAULT_DISTANCE_MIN,
            distance_max: DEFAULT_DISTANCE_MAX,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            clamp: true,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "amixer".to_string(),
            control: "Master".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gui: true,
            draw_landmarks: true,
            window_name: "Hand Volume Control".to_string(),
        }
    }
}

impl DetectorConfig {
    /// Validate thresholds and limits, without touching the model file
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(Error::ConfigError(
                "Detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_tracking_confidence) {
            return Err(Error::ConfigError(
                "Tracking confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.max_hands == 0 {
            return Err(Error::ConfigError("Maximum number of hands must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl GestureConfig {
    /// Validate landmark ids and distance ranges
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        for id in [self.first_landmark, self.second_landmark] {
            if id >= NUM_HAND_LANDMARKS {
                return Err(Error::ConfigError(format!(
                    "Landmark id {id} out of range (0-{})",
                    NUM_HAND_LANDMARKS - 1
                )));
            }
        }
        if self.first_landmark == self.second_landmark {
            return Err(Error::ConfigError("Measured landmarks must differ".to_string()));
        }
        if !self.distance_min.is_finite() || !self.distance_max.is_finite() || self.distance_min >= self.distance_max {
            return Err(Error::ConfigError(format!(
                "Distance range {} - {} must be finite and increasing",
                self.distance_min, self.distance_max
            )));
        }
        if !self.pinch_threshold.is_finite() || self.pinch_threshold < 0.0 {
            return Err(Error::ConfigError("Pinch threshold must be a non-negative number".to_string()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate camera settings
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(Error::ConfigError(format!(
                "Camera resolution {}x{} must be positive",
                self.camera.width, self.camera.height
            )));
        }

        self.detector.validate()?;
        self.gesture.validate()?;

        if self.volume.backend.trim().is_empty() {
            return Err(Error::ConfigError("Volume backend must not be empty".to_string()));
        }

        // Validate model path exists
        if !self.detector.model.exists() {
            return Err(Error::ConfigError(format!(
                "Hand landmark model not found: {}",
                self.detector.model.display()
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Volume Control Configuration

# Frame source
camera:
  index: 0
  width: 640
  height: 480
  max_read_failures: 100

# Hand landmark detector
detector:
  model: "assets/hand_landmark.onnx"
  static_image_mode: false
  max_hands: 2
  min_detection_confidence: 0.7
  min_tracking_confidence: 0.5

# Thumb tip (4) to index fingertip (8) distance mapping
gesture:
  hand_index: 0
  first_landmark: 4
  second_landmark: 8
  distance_min: 50.0
  distance_max: 300.0
  pinch_threshold: 50.0
  clamp: true

# Volume backend (amixer, pactl, log)
volume:
  enabled: true
  backend: "amixer"
  control: "Master"

# Preview window
display:
  gui: true
  draw_landmarks: true
  window_name: "Hand Volume Control"
"#;
