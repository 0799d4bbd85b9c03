use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Uniform scale factor applied before cropping.
    pub scale: f64,
    /// Output frame width in pixels.
    pub output_width: u32,
    /// Output frame height in pixels.
    pub output_height: u32,
}

impl Config {
    /// Load configuration from `FACECROP_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let model_dir = lookup("FACECROP_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(facecrop_core::default_model_dir);

        Self {
            model_dir,
            scale: parse_or(&lookup, "FACECROP_SCALE", 1.5),
            output_width: parse_or(&lookup, "FACECROP_OUTPUT_WIDTH", 2160),
            output_height: parse_or(&lookup, "FACECROP_OUTPUT_HEIGHT", 3840),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn detector_model_path(&self) -> PathBuf {
        self.model_dir.join(facecrop_core::DETECTOR_MODEL_FILE)
    }

    /// Path to the 68-point landmark model.
    pub fn landmark_model_path(&self) -> PathBuf {
        self.model_dir.join(facecrop_core::LANDMARK_MODEL_FILE)
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
