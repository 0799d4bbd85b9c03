//! Eye-line anchor location.

use image::DynamicImage;

use crate::detector::{DetectorError, FaceDetector, ScrfdDetector};
use crate::error::CropError;
use crate::landmarks::{LandmarkPredictor, OnnxLandmarker};
use crate::types::AnchorPoint;

/// Finds the crop anchor of a photo: the midpoint of the outer eye corners of
/// one detected face.
///
/// Holds the loaded detector and landmark models. Build it once and pass it
/// by `&mut` to every batch or preview call.
pub struct FaceLocator {
    detector: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkPredictor>,
}

impl FaceLocator {
    pub fn new(detector: Box<dyn FaceDetector>, landmarks: Box<dyn LandmarkPredictor>) -> Self {
        Self { detector, landmarks }
    }

    /// Load the SCRFD detector and the 68-point landmark model.
    pub fn load(detector_model: &str, landmark_model: &str) -> Result<Self, DetectorError> {
        let detector = ScrfdDetector::load(detector_model)?;
        let landmarks = OnnxLandmarker::load(landmark_model)?;
        Ok(Self::new(Box::new(detector), Box::new(landmarks)))
    }

    /// Locate the anchor in original pixel coordinates.
    ///
    /// When several faces are found the first one the detector returns wins;
    /// with `ScrfdDetector` that is the most confident one.
    pub fn locate(&mut self, image: &DynamicImage) -> Result<AnchorPoint, CropError> {
        // Grayscale keeps the pixel grid, so no coordinate mapping is needed.
        let gray = image.to_luma8();

        let faces = self.detector.detect_faces(&gray)?;
        let Some(face) = faces.first() else {
            tracing::debug!(width = gray.width(), height = gray.height(), "no face detected");
            return Err(CropError::NoFaceDetected);
        };

        let landmarks = self.landmarks.predict(&gray, face)?;
        let anchor = landmarks.eye_anchor();

        tracing::debug!(
            faces = faces.len(),
            confidence = face.confidence,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "located eye anchor"
        );

        Ok(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{face_image, stub_locator, FixedEyes, StubDetector};
    use crate::types::{FaceRegion, Point};

    #[test]
    fn test_locate_uses_eye_midpoint() {
        let mut locator = stub_locator(Point::new(300.0, 410.0), Point::new(500.0, 390.0));
        let anchor = locator.locate(&face_image(800, 800)).unwrap();
        assert_eq!(anchor, AnchorPoint::new(400, 400));
    }

    #[test]
    fn test_locate_no_face() {
        let mut locator = stub_locator(Point::new(1.0, 1.0), Point::new(3.0, 1.0));
        let blank = DynamicImage::new_rgb8(64, 64);
        assert!(matches!(locator.locate(&blank), Err(CropError::NoFaceDetected)));
    }

    #[test]
    fn test_locate_takes_first_face() {
        let first = FaceRegion { x: 10.0, y: 10.0, width: 20.0, height: 20.0, confidence: 0.6 };
        let second = FaceRegion { x: 100.0, y: 100.0, width: 80.0, height: 80.0, confidence: 0.9 };
        let detector = StubDetector::with_faces(vec![first, second]);
        let mut locator = FaceLocator::new(Box::new(detector), Box::new(FixedEyes::relative_to_face()));

        // Eyes are placed relative to the chosen face, so the anchor reveals which one was used.
        let anchor = locator.locate(&face_image(300, 300)).unwrap();
        assert_eq!(anchor, AnchorPoint::new(20, 20));
    }

    #[test]
    fn test_locate_does_not_mutate_input() {
        let mut locator = stub_locator(Point::new(10.0, 10.0), Point::new(30.0, 10.0));
        let image = face_image(64, 64);
        let before = image.clone();
        locator.locate(&image).unwrap();
        assert_eq!(image, before);
    }

    #[test]
    fn test_locate_propagates_landmark_error() {
        struct Broken;
        impl LandmarkPredictor for Broken {
            fn predict(
                &mut self,
                _gray: &image::GrayImage,
                _face: &FaceRegion,
            ) -> Result<crate::types::LandmarkSet, DetectorError> {
                Err(DetectorError::InferenceFailed("boom".into()))
            }
        }

        let mut locator = FaceLocator::new(Box::new(StubDetector::default()), Box::new(Broken));
        let err = locator.locate(&face_image(64, 64)).unwrap_err();
        assert!(matches!(err, CropError::Detector(DetectorError::InferenceFailed(_))));
    }
}
