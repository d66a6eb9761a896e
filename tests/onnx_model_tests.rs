//! Tests for ONNX hand landmark model loading and inference


use hand_volume_control::{
    config::{DetectorConfig, GestureConfig},
    constants::NUM_HAND_LANDMARKS,
    hand_detection::{HandLandmarkProvider, OnnxHandDetector},
    landmark::FrameSize,
    pipeline::GesturePipeline,
    volume_control::{LogVolume, VolumeControl},
    Result,
};
use opencv::core::CV_8UC3;
use std::path::Path;
use test_helpers::create_test_image;

const MODEL_PATH: &str = "assets/hand_landmark.onnx";

fn config(static_image_mode: bool) -> DetectorConfig {
    DetectorConfig {
        model: MODEL_PATH.into(),
        static_image_mode,
        ..DetectorConfig::default()
    }
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_hand_landmark_model() -> Result<()> {
    assert!(Path::new(MODEL_PATH).exists(), "Hand landmark model not found");

    let detector = OnnxHandDetector::new(&config(false))?;
    assert_eq!(detector.config().max_hands, 2);

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_blank_frames_have_no_hands() -> Result<()> {
    let mut detector = OnnxHandDetector::new(&config(false))?;

    for (height, width) in [(480, 640), (720, 1280), (300, 300), (640, 480)] {
        let frame = create_test_image(height, width, CV_8UC3)?;
        let hands = detector.detect(&frame)?;
        assert!(hands.is_empty(), "Found {} hand(s) in a black {}x{} frame", hands.len(), width, height);
    }

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_detected_hands_are_well_formed() -> Result<()> {
    let mut detector = OnnxHandDetector::new(&config(true))?;
    let frame = create_test_image(480, 640, CV_8UC3)?;

    for hand in detector.detect(&frame)? {
        assert_eq!(hand.landmarks().len(), NUM_HAND_LANDMARKS);
        assert!((0.0..=1.0).contains(&hand.score()));
        assert_eq!(hand.project(FrameSize::new(640, 480))?.len(), NUM_HAND_LANDMARKS);
    }
    detector.reset();

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_pipeline_with_model() -> Result<()> {
    let mut detector = OnnxHandDetector::new(&config(false))?;
    let mut volume = LogVolume::new();
    let pipeline = GesturePipeline::new(GestureConfig::default(), volume.volume_range())?;
    let frame = create_test_image(480, 640, CV_8UC3)?;

    let outcome = pipeline.process_frame(&mut detector, &frame, Some(&mut volume))?;
    assert!(outcome.reading.is_none());
    assert!(volume.last_level().is_none());

    Ok(())
}
