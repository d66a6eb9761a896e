//! Hand landmark detection.
//!
//! [`HandLandmarkProvider`] is the boundary between the control pipeline and
//! whatever model finds hands in a frame. [`OnnxHandDetector`] runs an
//! externally supplied 21-point hand landmark model (`MediaPipe` layout:
//! landmarks, presence score, handedness) through ONNX Runtime.
//!
//! In video mode the detector crops each frame around the hands found in the
//! previous frame. The whole frame is scanned as well while fewer than
//! `max_hands` hands are tracked, with the tracked crops blacked out so the
//! scan finds a new hand.

use crate::{
    config::DetectorConfig,
    constants::{LANDMARK_MODEL_INPUT_SIZE, LANDMARK_MODEL_VALUES_PER_POINT, NUM_HAND_LANDMARKS, TRACKING_ROI_SCALE},
    error::Error,
    landmark::{FrameSize, Hand, Handedness},
    utils::{
        image_conversion::{bgr_to_rgb_tensor, crop_square, mask_regions, SquareRegion},
        safe_cast::round_to_i32,
    },
    Result,
};
use log::{debug, info};
use ndarray::{Array4, CowArray};
use opencv::core::Mat;
use ort::{Environment, Session, Value};
use std::sync::Arc;

/// Smallest crop side used when tracking a hand
const MIN_TRACKING_SIDE: f64 = 32.0;

/// Anything that can find hands in a frame
pub trait HandLandmarkProvider {
    /// Detect hands in `frame`; no hands yields an empty list
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is unusable or inference fails
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Hand>>;

    /// Forget any state carried between frames
    fn reset(&mut self) {}
}

/// Square crop of the frame, in frame pixels, fed to the landmark model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    /// Left column (may be negative)
    pub x: f64,
    /// Top row (may be negative)
    pub y: f64,
    /// Side length
    pub side: f64,
}

impl CropWindow {
    /// Whole frame, letterboxed to a centered square
    #[must_use]
    pub fn full_frame(size: FrameSize) -> Self {
        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let side = width.max(height);
        Self {
            x: (width - side) / 2.0,
            y: (height - side) / 2.0,
            side,
        }
    }

    /// Square around a previously seen hand, enlarged by [`TRACKING_ROI_SCALE`]
    #[must_use]
    pub fn around_hand(hand: &Hand, size: FrameSize) -> Self {
        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let (min_x, min_y, max_x, max_y) = hand.bounds();
        let box_w = f64::from(max_x - min_x) * width;
        let box_h = f64::from(max_y - min_y) * height;
        let center_x = f64::from(min_x + max_x) / 2.0 * width;
        let center_y = f64::from(min_y + max_y) / 2.0 * height;
        let side = (box_w.max(box_h) * TRACKING_ROI_SCALE).max(MIN_TRACKING_SIDE);
        Self {
            x: center_x - side / 2.0,
            y: center_y - side / 2.0,
            side,
        }
    }

    /// Map a point in model input pixels back to normalized frame coordinates
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Normalized coordinates fit f32
    pub fn to_normalized(&self, model_x: f32, model_y: f32, input_size: i32, size: FrameSize) -> (f32, f32) {
        let scale = self.side / f64::from(input_size);
        let x = (self.x + f64::from(model_x) * scale) / f64::from(size.width);
        let y = (self.y + f64::from(model_y) * scale) / f64::from(size.height);
        (x as f32, y as f32)
    }

    /// Whether a frame pixel lies inside the window
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.side && y >= self.y && y < self.y + self.side
    }

    /// Whether any pixel of the window lies inside the frame
    #[must_use]
    pub fn overlaps_frame(&self, size: FrameSize) -> bool {
        self.region()
            .ok()
            .and_then(|region| region.clip(size.width, size.height))
            .is_some()
    }

    /// Integer region for cropping
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not finite
    pub fn region(&self) -> Result<SquareRegion> {
        Ok(SquareRegion {
            x: round_to_i32(self.x)?,
            y: round_to_i32(self.y)?,
            side: round_to_i32(self.side)?.max(1),
        })
    }
}

/// Decoded output of one landmark model run
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkModelOutput {
    /// Landmarks in model input pixels
    pub points: Vec<(f32, f32)>,
    /// Hand presence probability
    pub presence: f32,
    /// Probability that the hand is a right hand, when reported
    pub handedness: Option<f32>,
}

impl LandmarkModelOutput {
    /// Decode raw output tensors `[landmarks, presence, handedness, ...]`
    ///
    /// # Errors
    ///
    /// Returns an error if the landmark tensor is too short or the score is missing
    pub fn from_tensors(tensors: &[Vec<f32>]) -> Result<Self> {
        let landmarks = tensors
            .first()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;
        let expected = NUM_HAND_LANDMARKS * LANDMARK_MODEL_VALUES_PER_POINT;
        if landmarks.len() < expected {
            return Err(Error::ModelDataFormatError(format!(
                "Expected at least {expected} landmark values, got {}",
                landmarks.len()
            )));
        }

        let points = landmarks
            .chunks_exact(LANDMARK_MODEL_VALUES_PER_POINT)
            .take(NUM_HAND_LANDMARKS)
            .map(|p| (p[0], p[1]))
            .collect();

        let presence = tensors
            .get(1)
            .and_then(|t| t.first())
            .copied()
            .map(to_probability)
            .ok_or_else(|| Error::ModelOutputError("Model has no presence score output".to_string()))?;

        let handedness = tensors.get(2).and_then(|t| t.first()).copied().map(to_probability);

        Ok(Self {
            points,
            presence,
            handedness,
        })
    }

    /// Convert to a [`Hand`] in normalized coordinates of the full frame
    ///
    /// # Errors
    ///
    /// Returns an error if the landmark count is wrong
    pub fn into_hand(self, window: &CropWindow, input_size: i32, size: FrameSize) -> Result<Hand> {
        let points: Vec<(f32, f32)> = self
            .points
            .iter()
            .map(|&(x, y)| window.to_normalized(x, y, input_size, size))
            .collect();
        let hand = Hand::from_points(&points, self.presence)?;

        Ok(match self.handedness {
            Some(p) if p > 0.5 => hand.with_handedness(Handedness::Right),
            Some(_) => hand.with_handedness(Handedness::Left),
            None => hand,
        })
    }
}

/// Scores outside [0, 1] are logits
fn to_probability(value: f32) -> f32 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        1.0 / (1.0 + (-value).exp())
    }
}

/// Read `(channels_first, input_size)` from model input dims, either
/// `[batch, height, width, channels]` or `[batch, channels, height, width]`
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // Model sizes are small
fn input_layout(dims: &[Option<u32>]) -> (bool, i32) {
    if dims.len() != 4 {
        return (false, LANDMARK_MODEL_INPUT_SIZE);
    }
    let channels_first = dims[1] == Some(3);
    let height_axis = if channels_first { 2 } else { 1 };
    let input_size = dims[height_axis].map_or(LANDMARK_MODEL_INPUT_SIZE, |d| d as i32);
    (channels_first, input_size)
}

/// One model run planned for a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedWindow {
    /// Crop fed to the model
    pub window: CropWindow,
    /// Minimum presence for the result to count as a hand
    pub threshold: f32,
    /// Whether the window follows a hand from the previous frame
    pub tracked: bool,
}

/// Choose the crop windows for the next frame.
///
/// Tracked hands get a window around their last position unless that window
/// no longer touches the frame, in which case the hand counts as lost. A
/// full-frame window is appended while fewer than `max_hands` hands are kept.
/// Tracked hands are ignored in static image mode.
#[must_use]
pub fn plan_windows(tracked: &[Hand], config: &DetectorConfig, size: FrameSize) -> Vec<PlannedWindow> {
    let mut plan = Vec::with_capacity(config.max_hands);
    if !config.static_image_mode {
        for hand in tracked.iter().take(config.max_hands) {
            let window = CropWindow::around_hand(hand, size);
            if window.overlaps_frame(size) {
                plan.push(PlannedWindow {
                    window,
                    threshold: config.min_tracking_confidence,
                    tracked: true,
                });
            }
        }
    }
    if plan.len() < config.max_hands {
        plan.push(PlannedWindow {
            window: CropWindow::full_frame(size),
            threshold: config.min_detection_confidence,
            tracked: false,
        });
    }
    plan
}

/// Turn model outputs into hands, in plan order.
///
/// Results under their window's threshold are dropped, as is a full-frame hand
/// whose center falls inside the tracking window of a hand already accepted.
/// At most `max_hands` hands are returned.
///
/// # Errors
///
/// Returns an error if an accepted output has the wrong landmark count
pub fn collect_hands(
    results: Vec<(PlannedWindow, LandmarkModelOutput)>,
    input_size: i32,
    size: FrameSize,
    max_hands: usize,
) -> Result<Vec<Hand>> {
    let mut hands: Vec<Hand> = Vec::with_capacity(max_hands);
    for (planned, output) in results {
        if hands.len() >= max_hands {
            break;
        }
        if output.presence < planned.threshold {
            debug!(
                "Hand presence {:.2} below threshold {:.2}",
                output.presence, planned.threshold
            );
            continue;
        }
        let hand = output.into_hand(&planned.window, input_size, size)?;
        if !planned.tracked {
            let (x, y) = hand_center(&hand, size);
            if hands
                .iter()
                .any(|seen| CropWindow::around_hand(seen, size).contains(x, y))
            {
                debug!("Full-frame hand at ({:.0}, {:.0}) is already tracked", x, y);
                continue;
            }
        }
        hands.push(hand);
    }
    Ok(hands)
}

/// Center of a hand's bounding box in frame pixels
fn hand_center(hand: &Hand, size: FrameSize) -> (f64, f64) {
    let (min_x, min_y, max_x, max_y) = hand.bounds();
    (
        f64::from(min_x + max_x) / 2.0 * f64::from(size.width),
        f64::from(min_y + max_y) / 2.0 * f64::from(size.height),
    )
}

/// Hand landmark detector using `ONNX` Runtime
pub struct OnnxHandDetector {
    session: Session,
    config: DetectorConfig,
    input_size: i32,
    channels_first: bool,
    tracked: Vec<Hand>,
}

impl OnnxHandDetector {
    /// Load the model named in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        if !config.model.is_file() {
            return Err(Error::ModelError(format!(
                "Hand landmark model not found: {}",
                config.model.display()
            )));
        }
        info!(
            "Initializing OnnxHandDetector with model: {} (static: {}, max hands: {}, detection: {:.2}, tracking: {:.2})",
            config.model.display(),
            config.static_image_mode,
            config.max_hands,
            config.min_detection_confidence,
            config.min_tracking_confidence
        );

        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(&config.model)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelInputError("Model has no inputs".to_string()))?;

        let (channels_first, input_size) = input_layout(&input_meta.dimensions);
        debug!("Model input {}x{} (channels first: {})", input_size, input_size, channels_first);

        Ok(Self {
            session,
            config: config.clone(),
            input_size,
            channels_first,
            tracked: Vec::new(),
        })
    }

    /// Detector configuration
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the model on one crop window
    fn detect_in_window(&self, frame: &Mat, window: &CropWindow) -> Result<LandmarkModelOutput> {
        let crop = crop_square(frame, window.region()?)?;
        let input = bgr_to_rgb_tensor(&crop, self.input_size)?;
        let tensors = self.forward(input)?;
        LandmarkModelOutput::from_tensors(&tensors)
    }

    /// Run every planned window; the full-frame scan sees tracked crops blacked out
    fn run_plan(&self, frame: &Mat, plan: &[PlannedWindow], size: FrameSize) -> Result<Vec<Hand>> {
        let tracked_regions = plan
            .iter()
            .filter(|p| p.tracked)
            .map(|p| p.window.region())
            .collect::<Result<Vec<SquareRegion>>>()?;
        let masked = if tracked_regions.is_empty() {
            None
        } else {
            Some(mask_regions(frame, &tracked_regions)?)
        };

        let mut results = Vec::with_capacity(plan.len());
        for planned in plan {
            let source = if planned.tracked {
                frame
            } else {
                masked.as_ref().unwrap_or(frame)
            };
            results.push((*planned, self.detect_in_window(source, &planned.window)?));
        }
        collect_hands(results, self.input_size, size, self.config.max_hands)
    }

    /// Run forward pass through the model
    fn forward(&self, input: Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let input = if self.channels_first {
            input.permuted_axes([0, 3, 1, 2]).as_standard_layout().into_owned()
        } else {
            input
        };

        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut tensors = Vec::with_capacity(outputs.len());
        for output in outputs {
            let tensor = output.try_extract::<f32>()?;
            tensors.push(tensor.view().iter().copied().collect());
        }
        Ok(tensors)
    }
}

impl HandLandmarkProvider for OnnxHandDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Hand>> {
        let size = FrameSize::of(frame);
        if !size.is_valid() {
            return Err(Error::InvalidInput(format!(
                "Cannot detect hands in a {}x{} frame",
                size.width, size.height
            )));
        }

        // Taken up front so a failed frame leaves nothing tracked
        let tracked = std::mem::take(&mut self.tracked);
        let plan = plan_windows(&tracked, &self.config, size);
        let hands = self.run_plan(frame, &plan, size)?;

        let kept = plan.iter().filter(|p| p.tracked).count();
        if kept < tracked.len() {
            debug!("{} tracked hand(s) left the frame", tracked.len() - kept);
        }
        if !self.config.static_image_mode {
            self.tracked.clone_from(&hands);
        }

        Ok(hands)
    }

    fn reset(&mut self) {
        self.tracked.clear();
    }
}
