use thiserror::Error;

use crate::domain::submission::SubmissionError;

/// Failures of the durable catalog document.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write catalog document: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Operation failures returned across the repository boundary. Nothing is
/// thrown past it; the HTTP layer maps each variant to a status code.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed or inadmissible submission. User-correctable.
    #[error(transparent)]
    Validation(#[from] SubmissionError),

    /// Credential missing where required, or not recognized by the
    /// identity service.
    #[error("{0}")]
    Auth(String),

    /// Authenticated agent does not own the target track.
    #[error("{0}")]
    Ownership(String),

    #[error("track {0} not found")]
    NotFound(String),

    /// Durable medium unwritable. Surfaced, never swallowed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
