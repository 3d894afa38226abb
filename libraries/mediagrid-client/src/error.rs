//! Error types for the MediaGrid client.

use thiserror::Error;

/// Errors that can occur when talking to a MediaGrid web service.
///
/// Two families: local precondition failures (raised before any network
/// call, never retried) and remote failures (`Server`, carrying the HTTP
/// status and the raw response body verbatim).
#[derive(Error, Debug)]
pub enum MediaGridError {
    /// HTTP transport failure (connect, TLS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an HTTP status >= 300.
    ///
    /// `message` is the raw response body. It is often JSON with a
    /// machine-readable error inside, but this layer does not parse it.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Destination path could not be opened for writing
    #[error("destination not writable: {0}")]
    Unwritable(String),

    /// Local file to upload does not exist
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Caller-supplied arguments are invalid (e.g. mutually exclusive options)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to decode a response body
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// IO error during upload/download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaGridError {
    /// The HTTP status of a `Server` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            MediaGridError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for MediaGrid client operations.
pub type Result<T> = std::result::Result<T, MediaGridError>;
