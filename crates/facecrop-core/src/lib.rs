//! facecrop-core — Eye-line anchored crop and rescale.
//!
//! Locates a face with SCRFD, predicts 68 landmarks, and crops each photo
//! around the midpoint of the outer eye corners after a uniform rescale.
//! Batch runs mirror an input tree into an output tree and record a
//! per-file outcome instead of aborting.

pub mod batch;
pub mod compositor;
pub mod detector;
mod error;
pub mod landmarks;
pub mod locator;
pub mod pipeline;
pub mod preview;
pub mod types;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

pub use batch::{run_batch, BatchReport, FileOutcome};
pub use detector::{DetectorError, FaceDetector, ScrfdDetector};
pub use error::CropError;
pub use landmarks::{LandmarkPredictor, OnnxLandmarker};
pub use locator::FaceLocator;
pub use preview::preview;
pub use types::{AnchorPoint, CropRegion, FaceRegion, LandmarkSet, OutputSpec, Point, ScaleFactor};

/// File name of the SCRFD detection model inside the model directory.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
/// File name of the 68-point landmark model inside the model directory.
pub const LANDMARK_MODEL_FILE: &str = "pfld_68.onnx";

/// Default model directory: `$XDG_DATA_HOME/facecrop/models`, falling back to
/// `$HOME/.local/share/facecrop/models`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facecrop")
        .join("models")
}
