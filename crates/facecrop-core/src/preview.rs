//! Single-image preview.

use std::path::Path;

use image::DynamicImage;

use crate::error::CropError;
use crate::locator::FaceLocator;
use crate::pipeline;
use crate::types::{OutputSpec, ScaleFactor};

/// Run the crop pipeline on one file without writing anything.
///
/// Unlike a batch run, every failure (no face, undecodable file, detector
/// error) is returned to the caller as is.
pub fn preview(
    locator: &mut FaceLocator,
    path: &Path,
    scale: ScaleFactor,
    output: OutputSpec,
) -> Result<DynamicImage, CropError> {
    let raster = pipeline::crop_file(locator, path, scale, output)?;
    tracing::info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "preview ready"
    );
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{stub_locator, write_blank_image, write_face_image};
    use crate::types::Point;

    fn frame(w: u32, h: u32) -> OutputSpec {
        OutputSpec::new(w, h).unwrap()
    }

    #[test]
    fn test_preview_returns_crop() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("portrait.png");
        write_face_image(&path, 400, 400);

        let mut locator = stub_locator(Point::new(150.0, 200.0), Point::new(250.0, 200.0));
        let raster = preview(&mut locator, &path, ScaleFactor::new(2.0).unwrap(), frame(300, 200)).unwrap();
        assert_eq!((raster.width(), raster.height()), (300, 200));
    }

    #[test]
    fn test_preview_no_face_propagates() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("empty.png");
        write_blank_image(&path, 64, 64);

        let mut locator = stub_locator(Point::new(1.0, 1.0), Point::new(2.0, 1.0));
        let err = preview(&mut locator, &path, ScaleFactor::new(1.0).unwrap(), frame(32, 32)).unwrap_err();
        assert!(matches!(err, CropError::NoFaceDetected));
    }

    #[test]
    fn test_preview_missing_file_propagates() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut locator = stub_locator(Point::new(1.0, 1.0), Point::new(2.0, 1.0));
        let err = preview(
            &mut locator,
            &dir.path().join("missing.jpg"),
            ScaleFactor::new(1.0).unwrap(),
            frame(32, 32),
        )
        .unwrap_err();
        assert!(matches!(err, CropError::Decode { .. }));
    }

    #[test]
    fn test_preview_writes_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("portrait.png");
        write_face_image(&path, 100, 100);

        let mut locator = stub_locator(Point::new(40.0, 50.0), Point::new(60.0, 50.0));
        preview(&mut locator, &path, ScaleFactor::new(1.0).unwrap(), frame(50, 50)).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
