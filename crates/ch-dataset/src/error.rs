//! Error types for ch-dataset.

use std::path::PathBuf;

use thiserror::Error;

use ch_core::FormatError;

/// Errors that can occur while opening a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset: {0}")]
    Format(#[from] FormatError),

    /// A required member is absent from an archive.  Array members need both
    /// the payload and its `.meta` sidecar.
    #[error("{member} not found in {}", archive.display())]
    MissingMember { archive: PathBuf, member: String },
}

/// Alias for `Result<T, DatasetError>`.
pub type DatasetResult<T> = Result<T, DatasetError>;
