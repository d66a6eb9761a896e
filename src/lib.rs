//! Hand gesture volume control.
//!
//! This library turns the distance between two fingertips of a tracked hand
//! into a system output volume level:
//! - `OpenCV` for frame capture and the debug preview
//! - ONNX Runtime for an externally supplied hand landmark model
//! - the Linux mixer tools (`amixer`, `pactl`) for the volume itself
//!
//! The control pipeline consists of:
//! 1. Hand landmark detection (21 normalized points per hand)
//! 2. Projection of the landmarks onto the frame's pixel grid
//! 3. Thumb tip to index fingertip distance
//! 4. Linear mapping of the distance onto the backend's volume range
//! 5. Applying the level to the volume backend
//!
//! # Examples
//!
//! ## Mapping a distance
//!
//! ```
//! use hand_volume_control::range_mapper::RangeMapper;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let percent = RangeMapper::new((50.0, 300.0), (0.0, 100.0))?;
//! assert!((percent.map(64.0) - 5.6).abs() < 1e-9);
//! assert_eq!(percent.map_clamped(20.0), 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Measuring a hand
//!
//! ```
//! use hand_volume_control::{
//!     constants::{INDEX_FINGER_TIP, NUM_HAND_LANDMARKS, THUMB_TIP},
//!     gesture::PinchMeasurement,
//!     landmark::{FrameSize, Hand},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut points = [(0.0, 0.0); NUM_HAND_LANDMARKS];
//! points[THUMB_TIP] = (0.5, 0.5);
//! points[INDEX_FINGER_TIP] = (0.6, 0.5);
//! let hand = Hand::from_points(&points, 0.9)?;
//!
//! let pinch = PinchMeasurement::measure(&hand, THUMB_TIP, INDEX_FINGER_TIP, FrameSize::new(640, 480))?;
//! assert_eq!((pinch.first.x, pinch.first.y), (320, 240));
//! assert_eq!((pinch.second.x, pinch.second.y), (384, 240));
//! assert!((pinch.length - 64.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use hand_volume_control::{
//!     config::{DetectorConfig, GestureConfig},
//!     hand_detection::OnnxHandDetector,
//!     pipeline::GesturePipeline,
//!     volume_control::{create_volume_control, VolumeControl},
//! };
//! use opencv::{core::Mat, prelude::*, videoio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut detector = OnnxHandDetector::new(&DetectorConfig::default())?;
//! let mut volume = create_volume_control("amixer", "Master")?;
//! let pipeline = GesturePipeline::new(GestureConfig::default(), volume.volume_range())?;
//!
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//!
//! while cap.read(&mut frame)? {
//!     let outcome = pipeline.process_frame(&mut detector, &frame, Some(volume.as_mut()))?;
//!     if let Some(reading) = outcome.reading {
//!         println!("{:.0}px -> {:.0}%", reading.measurement.length, reading.percent);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Hand landmark data model and pixel projection
pub mod landmark;

/// Fingertip distance measurement
pub mod gesture;

/// Linear range mapping
pub mod range_mapper;

/// Hand landmark detection
pub mod hand_detection;

/// System volume backends
pub mod volume_control;

/// Per-frame gesture to volume pipeline
pub mod pipeline;

/// Debug preview drawing
pub mod overlay;

/// Utility functions for image preparation and numeric conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
