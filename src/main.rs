//! Hand gesture volume control application.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use hand_volume_control::{
    app::{AppConfig, HandVolumeApp, RunMode, VideoSource},
    config::Config,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Drive the output volume with the thumb to index fingertip distance
    Volume,
    /// Print landmark positions of the selected hand
    Track,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of a camera
    #[arg(short, long, conflicts_with = "cam")]
    video: Option<String>,

    /// What to do with detected hands
    #[arg(short, long, value_enum, default_value = "volume")]
    mode: Mode,

    /// Requested capture width
    #[arg(long)]
    width: Option<i32>,

    /// Requested capture height
    #[arg(long)]
    height: Option<i32>,

    /// Path to the hand landmark ONNX model
    #[arg(long)]
    model: Option<PathBuf>,

    /// Maximum number of hands to detect
    #[arg(long)]
    max_hands: Option<usize>,

    /// Minimum confidence for a new hand detection (0.0-1.0)
    #[arg(long)]
    detection_confidence: Option<f32>,

    /// Minimum confidence to keep tracking a hand (0.0-1.0)
    #[arg(long)]
    tracking_confidence: Option<f32>,

    /// Detect hands in every frame from scratch
    #[arg(long)]
    static_image: bool,

    /// Index of the detected hand that controls the volume
    #[arg(long)]
    hand: Option<usize>,

    /// Volume backend (amixer, pactl, log)
    #[arg(short, long)]
    backend: Option<String>,

    /// Measure the gesture without changing the volume
    #[arg(long)]
    no_volume: bool,

    /// Let levels extrapolate beyond the distance range
    #[arg(long)]
    no_clamp: bool,

    /// Show the preview window
    #[arg(long, conflicts_with = "no_gui")]
    gui: bool,

    /// Run without a preview window
    #[arg(long)]
    no_gui: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Apply command line overrides on top of the file configuration
    fn apply(&self, settings: &mut Config) {
        if let Some(cam) = self.cam {
            settings.camera.index = cam;
        }
        if let Some(width) = self.width {
            settings.camera.width = width;
        }
        if let Some(height) = self.height {
            settings.camera.height = height;
        }

        let detector = &mut settings.detector;
        if let Some(model) = &self.model {
            detector.model.clone_from(model);
        }
        if let Some(max_hands) = self.max_hands {
            detector.max_hands = max_hands;
        }
        if let Some(confidence) = self.detection_confidence {
            detector.min_detection_confidence = confidence;
        }
        if let Some(confidence) = self.tracking_confidence {
            detector.min_tracking_confidence = confidence;
        }
        if self.static_image {
            detector.static_image_mode = true;
        }

        if let Some(hand) = self.hand {
            settings.gesture.hand_index = hand;
        }
        if self.no_clamp {
            settings.gesture.clamp = false;
        }

        if let Some(backend) = &self.backend {
            settings.volume.backend.clone_from(backend);
        }
        if self.no_volume {
            settings.volume.enabled = false;
        }

        if self.gui {
            settings.display.gui = true;
        } else if self.no_gui {
            settings.display.gui = false;
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Volume Control");

    // Load configuration if provided
    let mut settings = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    args.apply(&mut settings);

    let config = AppConfig {
        video_source: if let Some(video_path) = args.video {
            VideoSource::File(video_path)
        } else {
            VideoSource::Camera(settings.camera.index)
        },
        mode: match args.mode {
            Mode::Volume => RunMode::Volume,
            Mode::Track => RunMode::Track,
        },
        settings,
    };

    // Create and run application
    let mut app = HandVolumeApp::new(config)?;
    app.run()?;

    Ok(())
}
