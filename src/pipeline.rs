//! Per-frame gesture pipeline: hands → fingertip distance → volume level.
//!
//! Each frame is handled independently. When no hand is detected nothing is
//! measured and the volume backend is left alone. Backend failures are
//! reported on the frame outcome and never abort processing.

use crate::{
    config::GestureConfig,
    constants::{PERCENT_MAX, PERCENT_MIN, VOLUME_BAR_BOTTOM, VOLUME_BAR_TOP},
    gesture::PinchMeasurement,
    hand_detection::HandLandmarkProvider,
    landmark::{FrameSize, Hand, LANDMARK_NAMES},
    range_mapper::RangeMapper,
    volume_control::{VolumeControl, VolumeRange},
    Result,
};
use log::{debug, info, warn};
use opencv::core::Mat;

/// Everything derived from the controlling hand in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    /// Fingertip positions, midpoint and distance
    pub measurement: PinchMeasurement,
    /// Level for the volume backend
    pub level: f64,
    /// Y coordinate of the top of the preview volume bar
    pub bar_height: f64,
    /// Volume as a percentage
    pub percent: f64,
    /// Fingertips closer than the pinch threshold
    pub pinched: bool,
}

/// Result of processing one frame
#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    /// Hands reported by the detector
    pub hands: Vec<Hand>,
    /// Reading for the controlling hand, if it was found
    pub reading: Option<GestureReading>,
    /// Volume backend failure, if the level could not be applied
    pub sink_error: Option<String>,
}

/// Maps a hand's fingertip distance onto the volume range
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    config: GestureConfig,
    volume_range: VolumeRange,
    level_mapper: RangeMapper,
    bar_mapper: RangeMapper,
    percent_mapper: RangeMapper,
}

impl GesturePipeline {
    /// Build a pipeline for a backend reporting `volume_range`
    ///
    /// # Errors
    ///
    /// Returns an error if the gesture configuration is invalid
    pub fn new(config: GestureConfig, volume_range: VolumeRange) -> Result<Self> {
        config.validate()?;
        let distance = (config.distance_min, config.distance_max);
        let level_mapper = RangeMapper::new(distance, volume_range.bounds())?;
        info!(
            "Mapping {} to {} distance {:?} px onto volume {:?} (clamp: {})",
            LANDMARK_NAMES[config.first_landmark],
            LANDMARK_NAMES[config.second_landmark],
            level_mapper.source(),
            level_mapper.target(),
            config.clamp
        );

        Ok(Self {
            level_mapper,
            bar_mapper: RangeMapper::new(distance, (VOLUME_BAR_BOTTOM, VOLUME_BAR_TOP))?,
            percent_mapper: RangeMapper::new(distance, (PERCENT_MIN, PERCENT_MAX))?,
            config,
            volume_range,
        })
    }

    /// Level range of the backend this pipeline drives
    #[must_use]
    pub const fn volume_range(&self) -> VolumeRange {
        self.volume_range
    }

    /// Gesture configuration
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Derive the reading for the configured hand, if it was detected
    ///
    /// # Errors
    ///
    /// Returns an error if the hand's landmarks cannot be projected
    pub fn evaluate(&self, hands: &[Hand], size: FrameSize) -> Result<Option<GestureReading>> {
        let Some(hand) = hands.get(self.config.hand_index) else {
            return Ok(None);
        };

        let measurement =
            PinchMeasurement::measure(hand, self.config.first_landmark, self.config.second_landmark, size)?;
        let length = measurement.length;
        let clamp = self.config.clamp;

        let reading = GestureReading {
            measurement,
            level: self.level_mapper.apply(length, clamp),
            bar_height: self.bar_mapper.apply(length, clamp),
            percent: self.percent_mapper.apply(length, clamp),
            pinched: length < self.config.pinch_threshold,
        };
        debug!(
            "Distance {:.1}px -> level {:.2} ({:.0}%){}",
            length,
            reading.level,
            reading.percent,
            if reading.pinched { " pinched" } else { "" }
        );

        Ok(Some(reading))
    }

    /// Evaluate already detected hands and forward the level to `sink`
    ///
    /// # Errors
    ///
    /// Returns an error only if the reading cannot be computed; backend
    /// failures are recorded on the outcome instead
    pub fn process_hands(
        &self,
        hands: Vec<Hand>,
        size: FrameSize,
        sink: Option<&mut dyn VolumeControl>,
    ) -> Result<FrameOutcome> {
        let reading = self.evaluate(&hands, size)?;

        let mut sink_error = None;
        if let (Some(reading), Some(sink)) = (&reading, sink) {
            if let Err(e) = sink.set_level(reading.level) {
                warn!("Failed to set volume with {}: {}", sink.name(), e);
                sink_error = Some(e.to_string());
            }
        }

        Ok(FrameOutcome {
            hands,
            reading,
            sink_error,
        })
    }

    /// Detect hands in `frame`, evaluate them and forward the level to `sink`
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails or the reading cannot be computed
    pub fn process_frame<P: HandLandmarkProvider + ?Sized>(
        &self,
        provider: &mut P,
        frame: &Mat,
        sink: Option<&mut dyn VolumeControl>,
    ) -> Result<FrameOutcome> {
        let hands = provider.detect(frame)?;
        self.process_hands(hands, FrameSize::of(frame), sink)
    }
}
