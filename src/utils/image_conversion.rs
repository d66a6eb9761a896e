//! Frame cropping and model input preparation.

use crate::{utils::safe_cast::usize_to_i32, Error, Result};
use ndarray::Array4;
use opencv::core::{copy_make_border, Mat, Rect, Scalar, Size, Vec3f, BORDER_CONSTANT, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;

/// Integer square region `(x, y, side)`; may extend past the frame edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareRegion {
    /// Left column (may be negative)
    pub x: i32,
    /// Top row (may be negative)
    pub y: i32,
    /// Side length in pixels
    pub side: i32,
}

impl SquareRegion {
    /// Part of the region inside a `width` x `height` frame, if any
    #[must_use]
    pub fn clip(&self, width: i32, height: i32) -> Option<Rect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.side).min(width);
        let y1 = (self.y + self.side).min(height);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }
}

/// Copy of `frame` with the visible part of each region filled black
///
/// # Errors
///
/// Returns an error if `OpenCV` fails
pub fn mask_regions(frame: &Mat, regions: &[SquareRegion]) -> Result<Mat> {
    let mut masked = frame.try_clone()?;
    for region in regions {
        if let Some(rect) = region.clip(masked.cols(), masked.rows()) {
            imgproc::rectangle(&mut masked, rect, Scalar::all(0.0), imgproc::FILLED, imgproc::LINE_8, 0)?;
        }
    }
    Ok(masked)
}

/// Cut a square region out of `frame`, padding the parts outside it with black
///
/// # Errors
///
/// Returns an error if the region does not overlap the frame or `OpenCV` fails
pub fn crop_square(frame: &Mat, region: SquareRegion) -> Result<Mat> {
    let visible = region.clip(frame.cols(), frame.rows()).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Region {region:?} lies outside the {}x{} frame",
            frame.cols(),
            frame.rows()
        ))
    })?;

    let roi = Mat::roi(frame, visible)?;
    let roi_mat = roi.try_clone()?;

    let top = visible.y - region.y;
    let left = visible.x - region.x;
    let bottom = region.side - visible.height - top;
    let right = region.side - visible.width - left;
    if top == 0 && left == 0 && bottom == 0 && right == 0 {
        return Ok(roi_mat);
    }

    let mut padded = Mat::default();
    copy_make_border(
        &roi_mat,
        &mut padded,
        top,
        bottom,
        left,
        right,
        BORDER_CONSTANT,
        Scalar::all(0.0),
    )?;
    Ok(padded)
}

/// Resize a BGR image to `size` x `size` and convert it to an RGB `[0, 1]` NHWC tensor
///
/// # Errors
///
/// Returns an error if the image is empty or `OpenCV` fails
#[allow(clippy::cast_sign_loss)] // Model input sizes are positive
pub fn bgr_to_rgb_tensor(image: &Mat, size: i32) -> Result<Array4<f32>> {
    if image.empty() || size <= 0 {
        return Err(Error::InvalidInput(format!(
            "Cannot build a {size}x{size} tensor from a {}x{} image",
            image.cols(),
            image.rows()
        )));
    }

    let mut resized = Mat::default();
    imgproc::resize(
        image,
        &mut resized,
        Size::new(size, size),
        0.0,
        0.0,
        InterpolationFlags::INTER_LINEAR as i32,
    )?;

    let mut rgb_image = Mat::default();
    imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

    let mut float_image = Mat::default();
    rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

    let side = size as usize;
    let channels = 3;
    let mut data = vec![0.0f32; side * side * channels];
    for row in 0..side {
        for col in 0..side {
            let pixel = float_image.at_2d::<Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
            let base = (row * side + col) * channels;
            data[base..base + channels].copy_from_slice(&[pixel[0], pixel[1], pixel[2]]);
        }
    }

    Array4::from_shape_vec((1, side, side, channels), data)
        .map_err(|e| Error::ModelDataFormatError(format!("Failed to create input tensor: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC3};

    fn solid_image(rows: i32, cols: i32, bgr: (f64, f64, f64)) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(bgr.0, bgr.1, bgr.2, 0.0)).unwrap()
    }

    #[test]
    fn test_clip_inside() {
        let region = SquareRegion { x: 10, y: 20, side: 50 };
        assert_eq!(region.clip(640, 480), Some(Rect::new(10, 20, 50, 50)));
    }

    #[test]
    fn test_clip_partially_outside() {
        let region = SquareRegion { x: -80, y: 0, side: 640 };
        assert_eq!(region.clip(640, 480), Some(Rect::new(0, 0, 560, 480)));
    }

    #[test]
    fn test_clip_outside() {
        let region = SquareRegion { x: 700, y: 0, side: 50 };
        assert_eq!(region.clip(640, 480), None);
    }

    #[test]
    fn test_crop_square_pads_to_square() {
        let frame = solid_image(480, 640, (255.0, 255.0, 255.0));
        let region = SquareRegion { x: 0, y: -80, side: 640 };
        let crop = crop_square(&frame, region).unwrap();
        assert_eq!((crop.cols(), crop.rows()), (640, 640));
        // Padding rows are black, frame rows are preserved
        assert_eq!(crop.at_2d::<Vec3b>(0, 0).unwrap()[0], 0);
        assert_eq!(crop.at_2d::<Vec3b>(100, 10).unwrap()[0], 255);
        assert_eq!(crop.at_2d::<Vec3b>(639, 10).unwrap()[2], 0);
    }

    #[test]
    fn test_crop_square_outside_frame() {
        let frame = solid_image(10, 10, (0.0, 0.0, 0.0));
        assert!(crop_square(&frame, SquareRegion { x: 20, y: 20, side: 5 }).is_err());
    }

    #[test]
    fn test_mask_regions() {
        let frame = solid_image(100, 100, (255.0, 255.0, 255.0));
        let regions = [
            SquareRegion { x: -10, y: -10, side: 30 },
            SquareRegion { x: 500, y: 0, side: 10 },
        ];
        let masked = mask_regions(&frame, &regions).unwrap();
        assert_eq!(masked.at_2d::<Vec3b>(5, 5).unwrap()[1], 0);
        assert_eq!(masked.at_2d::<Vec3b>(50, 50).unwrap()[1], 255);
        // Source frame is untouched
        assert_eq!(frame.at_2d::<Vec3b>(5, 5).unwrap()[1], 255);
    }

    #[test]
    fn test_tensor_is_rgb_and_normalized() {
        // Pure blue in BGR
        let image = solid_image(32, 48, (255.0, 0.0, 0.0));
        let tensor = bgr_to_rgb_tensor(&image, 16).unwrap();
        assert_eq!(tensor.shape(), &[1, 16, 16, 3]);
        assert!((tensor[[0, 5, 5, 0]] - 0.0).abs() < 1e-6);
        assert!((tensor[[0, 5, 5, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_rejects_empty_image() {
        assert!(bgr_to_rgb_tensor(&Mat::default(), 16).is_err());
    }
}
