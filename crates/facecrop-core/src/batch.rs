//! Directory-mirroring batch run.
//!
//! Every png/jpg/jpeg under the input root is cropped and written to the same
//! relative path under the output root. A file that fails is recorded in the
//! report and the walk moves on; only problems with the roots themselves
//! abort the run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use walkdir::WalkDir;

use crate::compositor;
use crate::error::CropError;
use crate::locator::FaceLocator;
use crate::pipeline;
use crate::types::{OutputSpec, ScaleFactor};

/// File extensions picked up by a batch run (ASCII case-insensitive).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Outcome of one attempted file.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed {
        relative: PathBuf,
        output: PathBuf,
    },
    Failed {
        relative: PathBuf,
        #[serde(serialize_with = "serialize_reason")]
        reason: CropError,
    },
}

impl FileOutcome {
    pub fn relative(&self) -> &Path {
        match self {
            Self::Processed { relative, .. } | Self::Failed { relative, .. } => relative,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed { relative, .. } => write!(f, "processed: {}", relative.display()),
            Self::Failed { relative, reason } => {
                write!(f, "failed: {}: {reason}", relative.display())
            }
        }
    }
}

fn serialize_reason<S: Serializer>(reason: &CropError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Per-file outcomes of a batch run, in traversal order.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn processed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// One status line per attempted file.
    pub fn lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Processed { relative, .. } => {
                tracing::info!(file = %relative.display(), "processed");
            }
            FileOutcome::Failed { relative, reason } => {
                tracing::warn!(file = %relative.display(), error = %reason, "failed");
            }
        }
        self.outcomes.push(outcome);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

fn has_supported_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

fn canonical(path: &Path) -> Result<PathBuf, CropError> {
    path.canonicalize().map_err(|source| CropError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Crop every supported image under `input_root` into the mirrored tree at
/// `output_root`.
///
/// `output_root` is created if absent and may live inside `input_root`; its
/// subtree is never walked. Traversal is in file-name order.
pub fn run_batch(
    locator: &mut FaceLocator,
    input_root: &Path,
    scale: ScaleFactor,
    output: OutputSpec,
    output_root: &Path,
) -> Result<BatchReport, CropError> {
    if !input_root.is_dir() {
        return Err(CropError::InputRoot(input_root.to_path_buf()));
    }
    fs::create_dir_all(output_root).map_err(|source| CropError::Io {
        path: output_root.to_path_buf(),
        source,
    })?;

    let input_root = canonical(input_root)?;
    let output_root = canonical(output_root)?;

    tracing::info!(
        input = %input_root.display(),
        output = %output_root.display(),
        scale = scale.get(),
        width = output.width(),
        height = output.height(),
        "batch started"
    );

    let walker = WalkDir::new(&input_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let excluded = entry.file_type().is_dir() && entry.path().starts_with(&output_root);
            if excluded {
                tracing::debug!(path = %entry.path().display(), "skipping output tree");
            }
            !excluded
        });

    let mut report = BatchReport::default();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let relative = err
                    .path()
                    .and_then(|p| p.strip_prefix(&input_root).ok())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                report.push(FileOutcome::Failed {
                    relative,
                    reason: err.into(),
                });
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !has_supported_extension(path) {
            continue;
        }

        let relative = match path.strip_prefix(&input_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        let target = output_root.join(&relative);

        let outcome = match process_file(locator, path, &target, scale, output) {
            Ok(()) => FileOutcome::Processed {
                relative,
                output: target,
            },
            Err(reason) => FileOutcome::Failed { relative, reason },
        };
        report.push(outcome);
    }

    tracing::info!(
        processed = report.processed_count(),
        failed = report.failed_count(),
        "batch finished"
    );

    Ok(report)
}

fn process_file(
    locator: &mut FaceLocator,
    source: &Path,
    target: &Path,
    scale: ScaleFactor,
    output: OutputSpec,
) -> Result<(), CropError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| CropError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let raster = pipeline::crop_file(locator, source, scale, output)?;
    compositor::save_raster(&raster, target)
}
