//! Scale-then-crop around the anchor.
//!
//! The crop window is centered on the scaled anchor and clamped at the top and
//! left edges. It is never re-expanded afterwards: near the right or bottom
//! edge, or when the scaled image is smaller than the requested frame, the
//! result is smaller than [`OutputSpec`] along that axis.

use std::path::Path;

use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};

use crate::error::CropError;
use crate::types::{AnchorPoint, CropRegion, OutputSpec, ScaleFactor};

/// Resize filter for the scaling pass.
const SCALE_FILTER: FilterType = FilterType::Lanczos3;

/// Largest scaled raster (in pixels) the compositor will allocate.
pub const MAX_SCALED_PIXELS: u64 = 1 << 28;

/// Size of a `width`×`height` image after uniform scaling (at least 1×1).
///
/// Sizes that overflow `u32` or exceed [`MAX_SCALED_PIXELS`] are rejected
/// before anything is allocated.
pub fn scaled_dimensions(width: u32, height: u32, scale: ScaleFactor) -> Result<(u32, u32), CropError> {
    let s = scale.get();
    // f64 → u64 saturates, so absurd scales land above the limit.
    let scale_axis = |len: u32| ((len as f64 * s).round() as u64).max(1);
    let (scaled_w, scaled_h) = (scale_axis(width), scale_axis(height));

    let too_large = || CropError::ScaledTooLarge {
        width: scaled_w,
        height: scaled_h,
        limit: MAX_SCALED_PIXELS,
    };
    let pixels = scaled_w.checked_mul(scaled_h).ok_or_else(too_large)?;
    if pixels > MAX_SCALED_PIXELS {
        return Err(too_large());
    }
    let w = u32::try_from(scaled_w).map_err(|_| too_large())?;
    let h = u32::try_from(scaled_h).map_err(|_| too_large())?;
    Ok((w, h))
}

/// Anchor position in scaled coordinates.
pub fn scale_anchor(anchor: AnchorPoint, scale: ScaleFactor) -> (i64, i64) {
    let s = scale.get();
    ((anchor.x as f64 * s).round() as i64, (anchor.y as f64 * s).round() as i64)
}

/// Crop window of `output` size centered on `center` inside a `scaled` image.
pub fn crop_region(scaled: (u32, u32), center: (i64, i64), output: OutputSpec) -> CropRegion {
    let (scaled_w, scaled_h) = (scaled.0 as i64, scaled.1 as i64);
    let (out_w, out_h) = (output.width() as i64, output.height() as i64);

    // The upper bound only bites for an anchor outside the image.
    let left = (center.0 - out_w / 2).clamp(0, scaled_w);
    let top = (center.1 - out_h / 2).clamp(0, scaled_h);
    let right = (left + out_w).min(scaled_w);
    let bottom = (top + out_h).min(scaled_h);

    CropRegion {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    }
}

/// Decode an image file.
pub fn load_raster(path: &Path) -> Result<DynamicImage, CropError> {
    image::open(path).map_err(|source| CropError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a raster to `path`, format chosen by extension.
///
/// JPEG only takes 8-bit gray or RGB, so other layouts (alpha, 16-bit) are
/// converted to RGB8 for JPEG targets. An empty raster (anchor outside the
/// image) is refused without creating the file.
pub fn save_raster(raster: &DynamicImage, path: &Path) -> Result<(), CropError> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(CropError::Encode {
            path: path.to_path_buf(),
            source: ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch)),
        });
    }

    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

    let result = if is_jpeg && !matches!(raster.color(), ColorType::L8 | ColorType::Rgb8) {
        DynamicImage::ImageRgb8(raster.to_rgb8()).save(path)
    } else {
        raster.save(path)
    };

    result.map_err(|source| CropError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Scale `image` and crop it around `anchor` (given in unscaled coordinates).
pub fn compose_image(
    image: &DynamicImage,
    anchor: AnchorPoint,
    scale: ScaleFactor,
    output: OutputSpec,
) -> Result<DynamicImage, CropError> {
    let (scaled_w, scaled_h) = scaled_dimensions(image.width(), image.height(), scale)?;
    let scaled = if (scaled_w, scaled_h) == (image.width(), image.height()) {
        image.clone()
    } else {
        image.resize_exact(scaled_w, scaled_h, SCALE_FILTER)
    };

    let region = crop_region((scaled_w, scaled_h), scale_anchor(anchor, scale), output);
    tracing::debug!(
        scaled_w,
        scaled_h,
        left = region.left,
        top = region.top,
        right = region.right,
        bottom = region.bottom,
        "crop region"
    );

    Ok(scaled.crop_imm(region.left, region.top, region.width(), region.height()))
}

/// Reload the original image at full fidelity, then scale and crop it.
pub fn compose(
    path: &Path,
    anchor: AnchorPoint,
    scale: ScaleFactor,
    output: OutputSpec,
) -> Result<DynamicImage, CropError> {
    let original = load_raster(path)?;
    compose_image(&original, anchor, scale, output)
}
