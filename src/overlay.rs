//! Debug preview drawing.

use crate::{
    constants::{VOLUME_BAR_BOTTOM, VOLUME_BAR_LEFT, VOLUME_BAR_RIGHT, VOLUME_BAR_TOP},
    landmark::{PixelLandmark, HAND_CONNECTIONS},
    pipeline::GestureReading,
    utils::safe_cast::{f64_to_i32_clamp, round_to_i32},
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FILLED, FONT_HERSHEY_COMPLEX, LINE_8},
};

/// BGR colors
fn blue() -> Scalar {
    Scalar::new(255.0, 0.0, 0.0, 0.0)
}

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

/// Draw a hand skeleton: bone segments plus a dot per landmark
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_hand(frame: &mut Mat, landmarks: &[PixelLandmark]) -> Result<()> {
    for &(a, b) in &HAND_CONNECTIONS {
        if let (Some(a), Some(b)) = (landmarks.get(a), landmarks.get(b)) {
            imgproc::line(frame, a.point(), b.point(), white(), 2, LINE_8, 0)?;
        }
    }
    for landmark in landmarks {
        imgproc::circle(frame, landmark.point(), 4, red(), FILLED, LINE_8, 0)?;
    }
    Ok(())
}

/// Draw the larger per-landmark markers used in tracking mode
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_landmark_markers(frame: &mut Mat, landmarks: &[PixelLandmark]) -> Result<()> {
    for landmark in landmarks {
        imgproc::circle(frame, landmark.point(), 5, blue(), FILLED, LINE_8, 0)?;
    }
    Ok(())
}

/// Draw fingertips, their connecting line, the midpoint and the volume bar
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_reading(frame: &mut Mat, reading: &GestureReading) -> Result<()> {
    let m = &reading.measurement;
    let first = m.first.point();
    let second = m.second.point();
    let center = Point::new(round_to_i32(m.center.0)?, round_to_i32(m.center.1)?);

    imgproc::circle(frame, first, 15, blue(), FILLED, LINE_8, 0)?;
    imgproc::circle(frame, second, 15, blue(), FILLED, LINE_8, 0)?;
    imgproc::line(frame, first, second, green(), 3, LINE_8, 0)?;
    let center_color = if reading.pinched { green() } else { blue() };
    imgproc::circle(frame, center, 15, center_color, FILLED, LINE_8, 0)?;

    draw_volume_bar(frame, reading.bar_height, reading.percent)
}

/// Draw the volume bar outline, its fill up to `bar_height`, and the percentage
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_volume_bar(frame: &mut Mat, bar_height: f64, percent: f64) -> Result<()> {
    let top = f64_to_i32_clamp(VOLUME_BAR_TOP, 0, i32::MAX);
    let bottom = f64_to_i32_clamp(VOLUME_BAR_BOTTOM, 0, i32::MAX);
    let fill_top = f64_to_i32_clamp(bar_height, 0, bottom);

    imgproc::rectangle_points(
        frame,
        Point::new(VOLUME_BAR_LEFT, top),
        Point::new(VOLUME_BAR_RIGHT, bottom),
        green(),
        3,
        LINE_8,
        0,
    )?;
    imgproc::rectangle_points(
        frame,
        Point::new(VOLUME_BAR_LEFT, fill_top),
        Point::new(VOLUME_BAR_RIGHT, bottom),
        green(),
        FILLED,
        LINE_8,
        0,
    )?;

    let label = format!("{} %", f64_to_i32_clamp(percent, i32::MIN, i32::MAX));
    draw_text(frame, &label, Point::new(40, 450))
}

/// Draw the frame rate in the top-left corner
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_fps(frame: &mut Mat, fps: f64) -> Result<()> {
    let label = format!("FPS: {}", f64_to_i32_clamp(fps, 0, i32::MAX));
    draw_text(frame, &label, Point::new(40, 50))
}

fn draw_text(frame: &mut Mat, text: &str, origin: Point) -> Result<()> {
    imgproc::put_text(frame, text, origin, FONT_HERSHEY_COMPLEX, 1.0, green(), 2, LINE_8, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::PinchMeasurement;
    use opencv::core::{Vec3b, CV_8UC3};
    use opencv::prelude::*;

    fn blank() -> Mat {
        Mat::zeros(480, 640, CV_8UC3).unwrap().to_mat().unwrap()
    }

    fn reading(pinched: bool) -> GestureReading {
        let first = PixelLandmark { id: 4, x: 300, y: 240 };
        let second = PixelLandmark { id: 8, x: 400, y: 240 };
        GestureReading {
            measurement: PinchMeasurement::between(first, second),
            level: 20.0,
            bar_height: 350.0,
            percent: 20.0,
            pinched,
        }
    }

    #[test]
    fn test_draw_reading_marks_fingertips() {
        let mut frame = blank();
        draw_reading(&mut frame, &reading(false)).unwrap();
        let tip = frame.at_2d::<Vec3b>(240, 300).unwrap();
        assert_eq!((tip[0], tip[1], tip[2]), (255, 0, 0));
        let center = frame.at_2d::<Vec3b>(240, 350).unwrap();
        assert_eq!((center[0], center[1], center[2]), (255, 0, 0));
    }

    #[test]
    fn test_pinched_center_is_green() {
        let mut frame = blank();
        draw_reading(&mut frame, &reading(true)).unwrap();
        let center = frame.at_2d::<Vec3b>(240, 350).unwrap();
        assert_eq!((center[0], center[1], center[2]), (0, 255, 0));
    }

    #[test]
    fn test_volume_bar_fill() {
        let mut frame = blank();
        draw_volume_bar(&mut frame, 350.0, 20.0).unwrap();
        // Inside the fill
        let filled = frame.at_2d::<Vec3b>(375, 67).unwrap();
        assert_eq!(filled[1], 255);
        // Above the fill, inside the outline
        let empty = frame.at_2d::<Vec3b>(250, 67).unwrap();
        assert_eq!(empty[1], 0);
    }

    #[test]
    fn test_draw_hand_tolerates_partial_landmarks() {
        let mut frame = blank();
        let landmarks: Vec<PixelLandmark> = (0..5).map(|id| PixelLandmark { id, x: 10 * id as i32, y: 10 }).collect();
        draw_hand(&mut frame, &landmarks).unwrap();
        draw_landmark_markers(&mut frame, &landmarks).unwrap();
        draw_fps(&mut frame, 29.7).unwrap();
    }
}
