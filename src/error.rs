//! Error types for tree construction, transport, orchestration, and setup.

use crate::types::TraceId;
use thiserror::Error;

/// Structural errors in the selected path set.
///
/// Raised before any remote call is issued.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No entries selected for upload")]
    EmptySelection,

    #[error("Entry has an empty relative path")]
    EmptyPath,

    #[error("Invalid path segment '{segment}' in '{path}'")]
    InvalidSegment { path: String, segment: String },

    #[error("Path '{path}' is used both as a file and as a directory")]
    PathCollision { path: String },

    #[error("Path '{path}' is selected more than once")]
    DuplicateEntry { path: String },

    #[error("Failed to collect '{path}': {message}")]
    Walk { path: String, message: String },
}

/// Failure of a single remote node creation
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read content: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response from remote store: {0}")]
    InvalidResponse(String),

    #[error("Remote store rejected node: {0}")]
    Rejected(String),
}

/// Errors surfaced by the orchestrator's public operations
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("No upload session has been submitted")]
    NoSession,

    #[error("Trace {0} is not a failed upload")]
    NotRetryable(TraceId),

    #[error("Upload session was reset before it settled")]
    Discarded,
}

/// Errors raised while loading configuration or installing logging
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
