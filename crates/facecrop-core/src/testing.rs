//! Test doubles for the detector seams and image fixtures.

use std::path::Path;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};

use crate::detector::{DetectorError, FaceDetector};
use crate::landmarks::LandmarkPredictor;
use crate::locator::FaceLocator;
use crate::types::{FaceRegion, LandmarkSet, Point, LANDMARK_COUNT, LEFT_EYE_OUTER, RIGHT_EYE_OUTER};

/// Reports no face for an all-black frame, otherwise the configured faces
/// (default: one box covering the central half of the frame).
#[derive(Default)]
pub struct StubDetector {
    faces: Option<Vec<FaceRegion>>,
}

impl StubDetector {
    pub fn with_faces(faces: Vec<FaceRegion>) -> Self {
        Self { faces: Some(faces) }
    }
}

impl FaceDetector for StubDetector {
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, DetectorError> {
        if gray.pixels().all(|p| p.0[0] == 0) {
            return Ok(Vec::new());
        }
        let (w, h) = (gray.width() as f32, gray.height() as f32);
        Ok(self.faces.clone().unwrap_or_else(|| {
            vec![FaceRegion { x: w / 4.0, y: h / 4.0, width: w / 2.0, height: h / 2.0, confidence: 0.99 }]
        }))
    }
}

/// Places the outer eye corners at fixed points, or at the face box corners.
pub enum FixedEyes {
    At(Point, Point),
    FaceCorners,
}

impl FixedEyes {
    pub fn relative_to_face() -> Self {
        Self::FaceCorners
    }
}

impl LandmarkPredictor for FixedEyes {
    fn predict(&mut self, _gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, DetectorError> {
        let (left, right) = match self {
            Self::At(left, right) => (*left, *right),
            Self::FaceCorners => (
                Point::new(face.x, face.y),
                Point::new(face.x + face.width, face.y + face.height),
            ),
        };
        let mut points = vec![Point::new(face.x, face.y); LANDMARK_COUNT];
        points[LEFT_EYE_OUTER] = left;
        points[RIGHT_EYE_OUTER] = right;
        LandmarkSet::new(points)
    }
}

pub fn stub_locator(left_eye: Point, right_eye: Point) -> FaceLocator {
    FaceLocator::new(Box::new(StubDetector::default()), Box::new(FixedEyes::At(left_eye, right_eye)))
}

/// Non-blank gradient image.
pub fn face_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 200) as u8 + 40, (y % 200) as u8 + 40, 128])
    }))
}

pub fn write_face_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    face_image(width, height).save(path).unwrap();
}

pub fn write_blank_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    DynamicImage::new_rgb8(width, height).save(path).unwrap();
}
