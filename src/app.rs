//! Main application module for hand volume control.

use crate::{
    config::Config,
    error::{AppError, Result},
    hand_detection::{HandLandmarkProvider, OnnxHandDetector},
    landmark::{FrameSize, PixelLandmark},
    overlay,
    pipeline::{FrameOutcome, GesturePipeline},
    utils::FpsCounter,
    volume_control::{create_volume_control, LogVolume, VolumeControl},
};
use log::{debug, info, warn};
use opencv::{
    core::Mat,
    highgui::{self, WINDOW_NORMAL},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// What to do with detected hands
    pub mode: RunMode,
    /// Detector, gesture, volume and display settings
    pub settings: Config,
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Drive the output volume with the fingertip distance
    Volume,
    /// Print landmark positions only
    Track,
}

/// Main application struct
pub struct HandVolumeApp {
    config: AppConfig,
    video_capture: VideoCapture,
    detector: Box<dyn HandLandmarkProvider>,
    pipeline: GesturePipeline,
    volume: Option<Box<dyn VolumeControl>>,
    fps: FpsCounter,
}

impl HandVolumeApp {
    /// Create a new hand volume control application
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Hand Volume Control application");
        config.settings.validate()?;

        let video_capture = open_video_source(&config)?;

        let detector: Box<dyn HandLandmarkProvider> = Box::new(OnnxHandDetector::new(&config.settings.detector)?);

        // Query the volume range once; it stays fixed for the run
        let volume = if config.mode == RunMode::Volume && config.settings.volume.enabled {
            let settings = &config.settings.volume;
            match create_volume_control(&settings.backend, &settings.control) {
                Ok(volume) => {
                    info!("{} volume control initialized", volume.name());
                    Some(volume)
                }
                Err(e) => {
                    warn!("Failed to initialize volume control: {}", e);
                    None
                }
            }
        } else {
            None
        };
        let volume_range = volume
            .as_ref()
            .map_or_else(|| LogVolume::new().volume_range(), |v| v.volume_range());
        info!("Volume range: {} - {}", volume_range.min, volume_range.max);

        let pipeline = GesturePipeline::new(config.settings.gesture.clone(), volume_range)?;

        if config.settings.display.gui {
            highgui::named_window(&config.settings.display.window_name, WINDOW_NORMAL)?;
        }

        Ok(Self {
            config,
            video_capture,
            detector,
            pipeline,
            volume,
            fps: FpsCounter::new(),
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop ({:?} mode)", self.config.mode);

        let max_failures = self.config.settings.camera.max_read_failures;
        let mut failures = 0u32;
        let mut frame_count = 0u64;

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                record_read_failure(&mut *self.detector, &mut failures, max_failures)?;
                continue;
            }
            failures = 0;
            frame_count += 1;

            let outcome = self.process_frame(&frame)?;
            let fps = self.fps.tick();
            debug!("Frame {}: {} hand(s), {:.1} FPS", frame_count, outcome.hands.len(), fps);

            if self.config.settings.display.gui {
                self.display_results(&frame, &outcome, fps)?;

                // Check for exit
                let key = highgui::wait_key(1)?;
                if key == 27 || key == i32::from(b'q') {
                    info!("Exit requested by user");
                    break;
                }
            }
        }

        info!("Application shutting down after {} frames", frame_count);
        self.video_capture.release()?;
        if self.config.settings.display.gui {
            highgui::destroy_all_windows()?;
        }
        Ok(())
    }

    /// Process a single frame
    fn process_frame(&mut self, frame: &Mat) -> Result<FrameOutcome> {
        match self.config.mode {
            RunMode::Volume => {
                let sink = self.volume.as_mut().map(|v| &mut **v as &mut dyn VolumeControl);
                self.pipeline.process_frame(&mut *self.detector, frame, sink)
            }
            RunMode::Track => {
                let hands = self.detector.detect(frame)?;
                if let Some(hand) = hands.get(self.config.settings.gesture.hand_index) {
                    let landmarks = hand.project(FrameSize::of(frame))?;
                    println!("{}", format_landmark_list(&landmarks));
                }
                Ok(FrameOutcome {
                    hands,
                    ..FrameOutcome::default()
                })
            }
        }
    }

    /// Display results in the preview window
    fn display_results(&self, frame: &Mat, outcome: &FrameOutcome, fps: f64) -> Result<()> {
        let display = &self.config.settings.display;
        let mut display_frame = frame.clone();
        let size = FrameSize::of(frame);

        if display.draw_landmarks {
            for hand in &outcome.hands {
                overlay::draw_hand(&mut display_frame, &hand.project(size)?)?;
            }
        }

        if self.config.mode == RunMode::Track {
            if let Some(hand) = outcome.hands.get(self.config.settings.gesture.hand_index) {
                overlay::draw_landmark_markers(&mut display_frame, &hand.project(size)?)?;
            }
        }

        if let Some(reading) = &outcome.reading {
            overlay::draw_reading(&mut display_frame, reading)?;
        }

        overlay::draw_fps(&mut display_frame, fps)?;

        highgui::imshow(&display.window_name, &display_frame)?;
        Ok(())
    }
}

/// Open the camera or video file and apply the requested capture size
fn open_video_source(config: &AppConfig) -> Result<VideoCapture> {
    let camera = &config.settings.camera;
    let capture = match &config.video_source {
        VideoSource::Camera(index) => {
            info!("Opening camera {}", index);
            let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

            cap.set(CAP_PROP_FRAME_WIDTH, f64::from(camera.width))?;
            cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(camera.height))?;

            // Reduce buffer size for lower latency (webcam only)
            cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
            info!("Requested {}x{} capture, buffer size 1", camera.width, camera.height);

            cap
        }
        VideoSource::File(path) => {
            info!("Opening video file: {}", path);
            VideoCapture::from_file(path, videoio::CAP_ANY)?
        }
    };

    if !capture.is_opened()? {
        return Err(AppError::Capture(format!("Cannot open video source {:?}", config.video_source)));
    }

    Ok(capture)
}

/// Count a failed camera read; the first failure in a row clears tracked hands
fn record_read_failure(detector: &mut dyn HandLandmarkProvider, failures: &mut u32, max_failures: u32) -> Result<()> {
    *failures += 1;
    if *failures == 1 {
        detector.reset();
    }
    if *failures > max_failures {
        return Err(AppError::Capture(format!(
            "No frame from camera after {max_failures} attempts"
        )));
    }
    warn!("Failed to read frame, retrying...");
    Ok(())
}

/// Format projected landmarks as `[[id, x, y], ...]`
#[must_use]
pub fn format_landmark_list(landmarks: &[PixelLandmark]) -> String {
    let entries: Vec<String> = landmarks
        .iter()
        .map(|lm| format!("[{}, {}, {}]", lm.id, lm.x, lm.y))
        .collect();
    format!("[{}]", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Hand;

    #[derive(Default)]
    struct CountingProvider {
        resets: usize,
    }

    impl HandLandmarkProvider for CountingProvider {
        fn detect(&mut self, _frame: &Mat) -> Result<Vec<Hand>> {
            Ok(Vec::new())
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_read_failure_resets_tracking() {
        let mut provider = CountingProvider::default();
        let mut failures = 0;
        assert!(record_read_failure(&mut provider, &mut failures, 3).is_ok());
        assert_eq!(provider.resets, 1);
        // Further failures in the same run don't reset again
        assert!(record_read_failure(&mut provider, &mut failures, 3).is_ok());
        assert_eq!(provider.resets, 1);

        // A good frame in between starts a new run
        failures = 0;
        assert!(record_read_failure(&mut provider, &mut failures, 3).is_ok());
        assert_eq!(provider.resets, 2);
    }

    #[test]
    fn test_read_failures_exhausted() {
        let mut provider = CountingProvider::default();
        let mut failures = 0;
        for _ in 0..2 {
            assert!(record_read_failure(&mut provider, &mut failures, 2).is_ok());
        }
        let result = record_read_failure(&mut provider, &mut failures, 2);
        assert!(matches!(result, Err(AppError::Capture(_))));
        assert_eq!(failures, 3);
    }

    #[test]
    fn test_format_landmark_list() {
        let landmarks = vec![
            PixelLandmark { id: 4, x: 320, y: 240 },
            PixelLandmark { id: 8, x: 384, y: 240 },
        ];
        assert_eq!(format_landmark_list(&landmarks), "[[4, 320, 240], [8, 384, 240]]");
        assert_eq!(format_landmark_list(&[]), "[]");
    }
}
