//! One image through locate → compose.

use std::path::Path;

use image::DynamicImage;

use crate::compositor;
use crate::error::CropError;
use crate::locator::FaceLocator;
use crate::types::{OutputSpec, ScaleFactor};

/// Decode `path`, locate the eye anchor, and return the scaled crop.
///
/// Detection runs on a throwaway decode; the crop is cut from a fresh
/// full-fidelity decode of the same file.
pub fn crop_file(
    locator: &mut FaceLocator,
    path: &Path,
    scale: ScaleFactor,
    output: OutputSpec,
) -> Result<DynamicImage, CropError> {
    let anchor = {
        let probe = compositor::load_raster(path)?;
        locator.locate(&probe)?
    };
    compositor::compose(path, anchor, scale, output)
}
