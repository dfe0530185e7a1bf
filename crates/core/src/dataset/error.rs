//! Error types for the dataset module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur loading, binding or saving a dataset.
///
/// All of these abort the run.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset could not be read or parsed.
    #[error("Failed to load dataset from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// The dataset could not be written.
    #[error("Failed to save dataset to {path}: {reason}")]
    SaveFailed { path: PathBuf, reason: String },

    /// A column the run needs is absent.
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// The snapshot file already exists and would be clobbered.
    #[error("Snapshot destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Override mode combined with a different explicit output path.
    #[error("Conflicting destinations: overwriting {input} but output set to {output}")]
    ConflictingDestination { input: PathBuf, output: PathBuf },
}

impl DatasetError {
    pub fn load_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LoadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn save_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SaveFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
