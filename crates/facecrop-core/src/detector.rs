//! Face detection seam and the SCRFD backend.
//!
//! `FaceDetector` is all the locator needs: grayscale raster in, face boxes
//! out. `ScrfdDetector` implements it with an SCRFD ONNX model, anchor-free
//! decoding over three strides and NMS post-processing.

use crate::types::FaceRegion;
use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// --- Named constants (no magic numbers) ---
const SCRFD_INPUT_SIZE: u32 = 640;
const SCRFD_MEAN: f32 = 127.5;
const SCRFD_STD: f32 = 128.0;
const SCRFD_CONFIDENCE_THRESHOLD: f32 = 0.5;
const SCRFD_NMS_THRESHOLD: f32 = 0.4;
const SCRFD_STRIDES: [usize; 3] = [8, 16, 32];
const SCRFD_ANCHORS_PER_CELL: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("landmark predictor returned {0} points, expected 68")]
    LandmarkCount(usize),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Finds faces in a grayscale raster.
///
/// Regions are reported in the raster's pixel coordinates. The order of the
/// returned regions is the backend's; callers that pick one face take the first.
pub trait FaceDetector {
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, DetectorError>;
}

/// Letterbox placement of the source frame inside the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    width: u32,
    height: u32,
}

impl Letterbox {
    fn fit(width: u32, height: u32, target: u32) -> Self {
        let scale = (target as f32 / width as f32).min(target as f32 / height as f32);
        let new_w = ((width as f32 * scale).round() as u32).clamp(1, target);
        let new_h = ((height as f32 * scale).round() as u32).clamp(1, target);
        Self {
            scale,
            pad_x: ((target - new_w) / 2) as f32,
            pad_y: ((target - new_h) / 2) as f32,
            width: new_w,
            height: new_h,
        }
    }

    /// Map a point from model-input space back to source-frame space.
    fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Output tensor indices (score, bbox) for one stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StrideOutputs {
    score: usize,
    bbox: usize,
}

/// SCRFD-based face detector.
pub struct ScrfdDetector {
    session: Session,
    /// Output indices for strides [8, 16, 32], discovered at load time.
    strides: [StrideOutputs; 3],
}

impl ScrfdDetector {
    /// Load the SCRFD ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();

        tracing::info!(path = model_path, outputs = ?output_names, "loaded SCRFD model");

        // Score and bbox heads for three strides; the optional kps heads are unused.
        if output_names.len() < 6 {
            return Err(DetectorError::InferenceFailed(format!(
                "SCRFD model requires at least 6 outputs (3 strides × score/bbox), got {}",
                output_names.len()
            )));
        }

        let strides = map_stride_outputs(&output_names);
        tracing::debug!(?strides, "SCRFD output tensor mapping");

        Ok(Self { session, strides })
    }

    /// Normalize a grayscale frame into the letterboxed NCHW tensor SCRFD expects.
    fn preprocess(gray: &GrayImage) -> (Array4<f32>, Letterbox) {
        let letterbox = Letterbox::fit(gray.width(), gray.height(), SCRFD_INPUT_SIZE);
        let resized = imageops::resize(gray, letterbox.width, letterbox.height, FilterType::Triangle);

        let size = SCRFD_INPUT_SIZE as usize;
        // Padding at the mean normalizes to 0.0.
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
        let (off_x, off_y) = (letterbox.pad_x as usize, letterbox.pad_y as usize);

        for (x, y, pixel) in resized.enumerate_pixels() {
            let normalized = (pixel.0[0] as f32 - SCRFD_MEAN) / SCRFD_STD;
            let (tx, ty) = (x as usize + off_x, y as usize + off_y);
            // Grayscale → 3-channel: replicate Y → [R=Y, G=Y, B=Y]
            for channel in 0..3 {
                tensor[[0, channel, ty, tx]] = normalized;
            }
        }

        (tensor, letterbox)
    }
}

impl FaceDetector for ScrfdDetector {
    /// Returns regions sorted by descending confidence.
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, DetectorError> {
        if gray.width() == 0 || gray.height() == 0 {
            return Ok(Vec::new());
        }

        let (input, letterbox) = Self::preprocess(gray);
        let strides = self.strides;

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut candidates = Vec::new();
        for (slot, &stride) in SCRFD_STRIDES.iter().enumerate() {
            let StrideOutputs { score, bbox } = strides[slot];

            let (_, scores) = outputs[score]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, boxes) = outputs[bbox]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;

            candidates.extend(decode_stride(
                scores,
                boxes,
                stride,
                &letterbox,
                SCRFD_CONFIDENCE_THRESHOLD,
            ));
        }

        let faces = nms(candidates, SCRFD_NMS_THRESHOLD);
        tracing::debug!(count = faces.len(), "SCRFD detections after NMS");
        Ok(faces)
    }
}

/// Map output tensors to stride slots.
///
/// Exports named `score_8`/`bbox_8`/... are matched by name; anything else
/// uses the standard positional layout `[0-2]` scores, `[3-5]` bboxes.
fn map_stride_outputs(names: &[String]) -> [StrideOutputs; 3] {
    let find = |prefix: &str, stride: usize| {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| *n == target)
    };

    let named: Option<Vec<StrideOutputs>> = SCRFD_STRIDES
        .iter()
        .map(|&stride| {
            Some(StrideOutputs {
                score: find("score", stride)?,
                bbox: find("bbox", stride)?,
            })
        })
        .collect();

    match named {
        Some(found) => [found[0], found[1], found[2]],
        None => {
            tracing::info!(?names, "SCRFD: output names not recognized, using positional mapping");
            std::array::from_fn(|i| StrideOutputs { score: i, bbox: i + 3 })
        }
    }
}

/// Decode the face boxes of one stride level above `threshold`.
fn decode_stride(
    scores: &[f32],
    boxes: &[f32],
    stride: usize,
    letterbox: &Letterbox,
    threshold: f32,
) -> Vec<FaceRegion> {
    let grid_w = SCRFD_INPUT_SIZE as usize / stride;
    let grid_h = SCRFD_INPUT_SIZE as usize / stride;
    let anchors = grid_w * grid_h * SCRFD_ANCHORS_PER_CELL;
    let step = stride as f32;

    scores
        .iter()
        .take(anchors)
        .enumerate()
        .filter(|&(_, &score)| score > threshold)
        .filter_map(|(idx, &score)| {
            let offsets = boxes.get(idx * 4..idx * 4 + 4)?;
            let cell = idx / SCRFD_ANCHORS_PER_CELL;
            let anchor_x = (cell % grid_w) as f32 * step;
            let anchor_y = (cell / grid_w) as f32 * step;

            let (x1, y1) = letterbox.unmap(anchor_x - offsets[0] * step, anchor_y - offsets[1] * step);
            let (x2, y2) = letterbox.unmap(anchor_x + offsets[2] * step, anchor_y + offsets[3] * step);

            Some(FaceRegion {
                x: x1,
                y: y1,
                width: x2 - x1,
                height: y2 - y1,
                confidence: score,
            })
        })
        .collect()
}

/// Non-Maximum Suppression; the result is sorted by descending confidence.
fn nms(mut candidates: Vec<FaceRegion>, iou_threshold: f32) -> Vec<FaceRegion> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<FaceRegion> = Vec::new();
    for candidate in candidates {
        if keep.iter().all(|kept| kept.iou(&candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}
