use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DonorError {
    #[error("invalid donor input {input:?}: {reason}")]
    InputParse { input: String, reason: String },
    #[error("model artifact not found at {path:?}")]
    ArtifactMissing { path: PathBuf },
    #[error("model artifact at {path:?} is corrupt: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },
    #[error("model fit failed: {reason}")]
    NumericalFit { reason: String },
    #[error("invalid training dataset: {reason}")]
    Dataset { reason: String },
    #[error("invalid donor roster: {0}")]
    Roster(#[from] csv::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DonorError {
    pub(crate) fn input(input: &str, reason: impl Into<String>) -> Self {
        DonorError::InputParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DonorError>;
