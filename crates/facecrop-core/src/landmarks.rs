//! 68-point landmark prediction.
//!
//! `OnnxLandmarker` runs a PFLD-style regressor: a square crop around the face
//! box is resized to 112×112, and the model returns 136 values (x, y pairs)
//! normalized to the crop.

use crate::detector::DetectorError;
use crate::types::{FaceRegion, LandmarkSet, Point, LANDMARK_COUNT};
use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

const LANDMARK_INPUT_SIZE: u32 = 112;
/// Side of the square crop relative to the longer face-box side.
const LANDMARK_CROP_EXPANSION: f32 = 1.2;

/// Predicts the 68 iBUG landmarks for one face region.
pub trait LandmarkPredictor {
    fn predict(&mut self, gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, DetectorError>;
}

/// Pixel window of the source frame fed to the regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FaceCrop {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl FaceCrop {
    /// Square window around the face center, clipped to the frame.
    fn around(face: &FaceRegion, frame_width: u32, frame_height: u32) -> Self {
        let side = face.width.max(face.height) * LANDMARK_CROP_EXPANSION;
        let cx = face.x + face.width / 2.0;
        let cy = face.y + face.height / 2.0;

        let x0 = (cx - side / 2.0).round().clamp(0.0, frame_width as f32) as u32;
        let y0 = (cy - side / 2.0).round().clamp(0.0, frame_height as f32) as u32;
        let x1 = (cx + side / 2.0).round().clamp(0.0, frame_width as f32) as u32;
        let y1 = (cy + side / 2.0).round().clamp(0.0, frame_height as f32) as u32;

        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Map crop-normalized (x, y) pairs back to frame pixels.
    fn unmap(&self, normalized: &[f32]) -> Vec<Point> {
        normalized
            .chunks_exact(2)
            .map(|xy| {
                Point::new(
                    self.x as f32 + xy[0] * self.width as f32,
                    self.y as f32 + xy[1] * self.height as f32,
                )
            })
            .collect()
    }
}

/// ONNX landmark regressor (PFLD 68-point export).
pub struct OnnxLandmarker {
    session: Session,
    output_count: usize,
}

impl OnnxLandmarker {
    /// Load the landmark ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_count = session.outputs().len();
        tracing::info!(
            path = model_path,
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded landmark model"
        );

        Ok(Self { session, output_count })
    }

    /// Resize the crop to the model input, scaled to [0, 1], as NCHW.
    fn preprocess(gray: &GrayImage, crop: FaceCrop) -> Array4<f32> {
        let window = imageops::crop_imm(gray, crop.x, crop.y, crop.width, crop.height).to_image();
        let resized = imageops::resize(&window, LANDMARK_INPUT_SIZE, LANDMARK_INPUT_SIZE, FilterType::Triangle);

        let size = LANDMARK_INPUT_SIZE as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let value = pixel.0[0] as f32 / 255.0;
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] = value;
            }
        }
        tensor
    }
}

impl LandmarkPredictor for OnnxLandmarker {
    fn predict(&mut self, gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, DetectorError> {
        let crop = FaceCrop::around(face, gray.width(), gray.height());
        if crop.is_empty() {
            return Err(DetectorError::InferenceFailed(format!(
                "face region {face:?} lies outside the {}x{} frame",
                gray.width(),
                gray.height()
            )));
        }

        let input = Self::preprocess(gray, crop);
        let output_count = self.output_count;
        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        // Some exports also emit auxiliary features; take the 136-value head.
        for idx in 0..output_count {
            let (_, values) = outputs[idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("landmark output {idx}: {e}")))?;
            if values.len() == LANDMARK_COUNT * 2 {
                return LandmarkSet::new(crop.unmap(values));
            }
        }

        Err(DetectorError::InferenceFailed(format!(
            "no output with {} values among {output_count} outputs",
            LANDMARK_COUNT * 2
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32, y: f32, w: f32, h: f32) -> FaceRegion {
        FaceRegion { x, y, width: w, height: h, confidence: 0.9 }
    }

    #[test]
    fn test_crop_is_expanded_square() {
        let crop = FaceCrop::around(&face(100.0, 100.0, 100.0, 80.0), 1000, 1000);
        // side 120 around center (150, 140)
        assert_eq!(crop, FaceCrop { x: 90, y: 80, width: 120, height: 120 });
    }

    #[test]
    fn test_crop_clipped_at_frame_edge() {
        let crop = FaceCrop::around(&face(0.0, 0.0, 100.0, 100.0), 1000, 1000);
        assert_eq!(crop, FaceCrop { x: 0, y: 0, width: 110, height: 110 });
    }

    #[test]
    fn test_crop_outside_frame_is_empty() {
        let crop = FaceCrop::around(&face(2000.0, 2000.0, 50.0, 50.0), 640, 480);
        assert!(crop.is_empty());
    }

    #[test]
    fn test_unmap_to_frame_pixels() {
        let crop = FaceCrop { x: 90, y: 80, width: 120, height: 120 };
        let points = crop.unmap(&[0.0, 0.0, 0.5, 0.5, 1.0, 0.25]);
        assert_eq!(
            points,
            vec![
                Point::new(90.0, 80.0),
                Point::new(150.0, 140.0),
                Point::new(210.0, 110.0),
            ]
        );
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let gray = GrayImage::from_fn(200, 200, |x, _| image::Luma([(x % 256) as u8]));
        let crop = FaceCrop { x: 10, y: 10, width: 150, height: 150 };
        let tensor = OnnxLandmarker::preprocess(&gray, crop);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(tensor[[0, 0, 5, 7]], tensor[[0, 2, 5, 7]]);
    }
}
