use std::{fmt::Display, path::PathBuf, sync::mpsc::SendError};

use cb_core::{DownloadFileError, DownloadProgress, IoError, JsonDownloadError, RequestError};
use thiserror::Error;

use crate::natives::NativesError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("send error: {0}")]
    SendProgress(#[from] SendError<DownloadProgress>),
    #[error("no version descriptor found for: {0}")]
    DescriptorNotFound(String),
    #[error("no version manifest found at {0:?}")]
    ManifestNotFound(PathBuf),
    #[error("version inherits from itself (cycle through {0})")]
    InheritanceLoop(String),
    #[error("checksum mismatch for {name} after re-download:\nexpected {expected}, got {got}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        got: String,
    },
    #[error("could not extract native libraries: {0}")]
    NativesExtract(#[from] NativesError),
    #[error("{0}")]
    LibraryBatch(LibraryFailures),
}

impl From<JsonDownloadError> for DownloadError {
    fn from(value: JsonDownloadError) -> Self {
        match value {
            JsonDownloadError::RequestError(err) => DownloadError::from(err),
            JsonDownloadError::SerdeError(err) => DownloadError::from(err),
        }
    }
}

impl From<DownloadFileError> for DownloadError {
    fn from(value: DownloadFileError) -> Self {
        match value {
            DownloadFileError::Request(err) => DownloadError::from(err),
            DownloadFileError::Io(err) => DownloadError::from(err),
        }
    }
}

/// One library that could not be fetched or extracted.
#[derive(Debug)]
pub struct LibraryFailure {
    pub name: String,
    pub error: DownloadError,
}

/// Every per-library failure of a download batch, reported together.
/// The launch is aborted as a whole; an incomplete classpath is never
/// silently produced.
#[derive(Debug)]
pub struct LibraryFailures(pub Vec<LibraryFailure>);

impl Display for LibraryFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} libraries failed to download:", self.0.len())?;
        for failure in &self.0 {
            writeln!(f, "- {}: {}", failure.name, failure.error)?;
        }
        Ok(())
    }
}
