use std::path::PathBuf;

use thiserror::Error;

use crate::detector::DetectorError;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("no face detected")]
    NoFaceDetected,
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("input folder not found or not a directory: {}", .0.display())]
    InputRoot(PathBuf),
    #[error("scale factor must be a positive finite number, got {0}")]
    InvalidScale(f64),
    #[error("output size must be positive, got {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },
    #[error("scaled image would be {width}x{height}, over the {limit}-pixel limit")]
    ScaledTooLarge { width: u64, height: u64, limit: u64 },
}
