//! Property tests for landmark projection, the distance metric and range mapping

use hand_volume_control::{
    constants::{INDEX_FINGER_TIP, NUM_HAND_LANDMARKS, THUMB_TIP},
    gesture::{distance, PinchMeasurement},
    landmark::{normalize_point, project_point, FrameSize, Hand},
    range_mapper::RangeMapper,
};
use proptest::prelude::*;

#[test]
fn test_reference_scenario() {
    let size = FrameSize::new(640, 480);
    let mut points = [(0.0, 0.0); NUM_HAND_LANDMARKS];
    points[THUMB_TIP] = (0.5, 0.5);
    points[INDEX_FINGER_TIP] = (0.6, 0.5);
    let hand = Hand::from_points(&points, 1.0).unwrap();

    let projected = hand.project(size).unwrap();
    assert_eq!((projected[THUMB_TIP].x, projected[THUMB_TIP].y), (320, 240));
    assert_eq!((projected[INDEX_FINGER_TIP].x, projected[INDEX_FINGER_TIP].y), (384, 240));

    let pinch = PinchMeasurement::measure(&hand, THUMB_TIP, INDEX_FINGER_TIP, size).unwrap();
    assert!((pinch.length - 64.0).abs() < 1e-9);

    let percent = RangeMapper::new((50.0, 300.0), (0.0, 100.0)).unwrap();
    assert!((percent.map(pinch.length) - 5.6).abs() < 1e-9);
}

#[test]
fn test_projection_ids_follow_landmarks() {
    let points: Vec<(f32, f32)> = (0..NUM_HAND_LANDMARKS).map(|i| (i as f32 / 20.0, 0.5)).collect();
    let hand = Hand::from_points(&points, 1.0).unwrap();
    let projected = hand.project(FrameSize::new(200, 100)).unwrap();

    assert_eq!(projected.len(), NUM_HAND_LANDMARKS);
    for (id, lm) in projected.iter().enumerate() {
        assert_eq!(lm.id, id);
        assert_eq!(lm.x, (id * 10) as i32);
        assert_eq!(lm.y, 50);
    }
}

proptest! {
    #[test]
    fn test_projection_rounds(x in 0.0f64..=1.0, y in 0.0f64..=1.0, w in 1i32..4000, h in 1i32..4000) {
        let size = FrameSize::new(w, h);
        let (px, py) = project_point(x, y, size).unwrap();
        prop_assert_eq!(px, (x * f64::from(w)).round() as i32);
        prop_assert_eq!(py, (y * f64::from(h)).round() as i32);
        prop_assert!((0..=w).contains(&px));
        prop_assert!((0..=h).contains(&py));
    }

    #[test]
    fn test_projection_round_trip_within_a_pixel(x in 0.0f64..=1.0, y in 0.0f64..=1.0, w in 1i32..4000, h in 1i32..4000) {
        let size = FrameSize::new(w, h);
        let (px, py) = project_point(x, y, size).unwrap();
        let (nx, ny) = normalize_point(px, py, size);
        prop_assert!(((nx - x) * f64::from(w)).abs() <= 1.0);
        prop_assert!(((ny - y) * f64::from(h)).abs() <= 1.0);
    }

    #[test]
    fn test_distance_is_symmetric(ax in -5000i32..5000, ay in -5000i32..5000, bx in -5000i32..5000, by in -5000i32..5000) {
        let d = distance((ax, ay), (bx, by));
        prop_assert_eq!(d, distance((bx, by), (ax, ay)));
        prop_assert!(d >= 0.0);
        prop_assert_eq!(distance((ax, ay), (ax, ay)), 0.0);
    }

    #[test]
    fn test_mapping_hits_endpoints(s0 in -1000.0f64..1000.0, span in 1.0f64..1000.0, t0 in -1000.0f64..1000.0, t1 in -1000.0f64..1000.0) {
        let mapper = RangeMapper::new((s0, s0 + span), (t0, t1)).unwrap();
        prop_assert!((mapper.map(s0) - t0).abs() < 1e-6);
        prop_assert!((mapper.map(s0 + span) - t1).abs() < 1e-6);
    }

    #[test]
    fn test_mapping_is_monotonic(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
        let rising = RangeMapper::new((50.0, 300.0), (0.0, 100.0)).unwrap();
        let falling = RangeMapper::new((50.0, 300.0), (400.0, 150.0)).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(rising.map(lo) <= rising.map(hi));
        prop_assert!(falling.map(lo) >= falling.map(hi));
        prop_assert!(rising.map_clamped(lo) <= rising.map_clamped(hi));
        prop_assert!((0.0..=100.0).contains(&rising.map_clamped(a)));
        prop_assert!((150.0..=400.0).contains(&falling.map_clamped(a)));
    }
}
