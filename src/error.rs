//! Error types for blockdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for blockdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding and reconstructing analysis output.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON decoding or encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not a recognised analysis response or notification.
    #[error("Unknown input format: {0}")]
    UnknownFormat(String),

    /// A relationship id does not resolve within the page's block index.
    #[error("Broken reference on page {page}: block '{id}' not found")]
    BrokenReference { id: String, page: u32 },

    /// The same block id appears twice on one page.
    #[error("Duplicate block id '{id}' on page {page}")]
    DuplicateId { id: String, page: u32 },

    /// A block is missing a field required by its declared type.
    #[error("Malformed block '{id}': {reason}")]
    MalformedBlock { id: String, reason: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A job-completion notification was malformed or incomplete.
    #[error("Invalid notification: {0}")]
    Notification(String),

    /// The analysis job finished in a state other than SUCCEEDED.
    #[error("Job {job_id} did not succeed (status: {status})")]
    JobNotSucceeded { job_id: String, status: String },

    /// A collaborator asked us to slow down; safe to retry.
    #[error("{service} throttled the request: {message}")]
    Throttled { service: String, message: String },

    /// Result sink or record store write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn broken_reference(id: impl Into<String>, page: u32) -> Self {
        Error::BrokenReference {
            id: id.into(),
            page,
        }
    }

    pub(crate) fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedBlock {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether a collaborator call that failed with this error may be retried.
    ///
    /// Data-integrity errors are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Throttled { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}
