//! Error types for the lazyfile crate

use std::io;
use thiserror::Error;

/// Result type alias for lazyfile operations
pub type Result<T> = std::result::Result<T, LazyError>;

/// Error types that can occur while reading through the sparse cache
#[derive(Error, Debug, Clone)]
pub enum LazyError {
    #[error("Index {index} out of range for sequence of size {size}")]
    IndexOutOfRange { index: i64, size: u64 },

    #[error("Getter returned {actual} bytes for range {lo}-{hi}, expected {expected}")]
    InvalidGetter {
        lo: u64,
        hi: u64,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid byte range: {0}")]
    InvalidRange(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metadata fetch error: {0}")]
    MetadataFetchError(String),

    #[error("Range requests not supported by origin server")]
    RangeNotSupported,

    #[error("Fetch failed for range {lo}-{hi} after {attempts} attempts")]
    FetchFailed { lo: u64, hi: u64, attempts: usize },

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Origin server returned 4xx error: {status} - {message}")]
    OriginClientError { status: u16, message: String },

    #[error("Origin server returned 5xx error: {status} - {message}")]
    OriginServerError { status: u16, message: String },

    #[error("Content-Range mismatch: expected {expected}, got {actual}")]
    ContentRangeMismatch { expected: String, actual: String },

    #[error("Network timeout: {0}")]
    Timeout(String),
}

impl From<LazyError> for io::Error {
    fn from(err: LazyError) -> Self {
        let kind = match err {
            LazyError::IndexOutOfRange { .. } | LazyError::InvalidRange(_) => {
                io::ErrorKind::InvalidInput
            }
            LazyError::InvalidGetter { .. } | LazyError::ContentRangeMismatch { .. } => {
                io::ErrorKind::InvalidData
            }
            LazyError::Timeout(_) => io::ErrorKind::TimedOut,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

impl From<reqwest::Error> for LazyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LazyError::Timeout(err.to_string())
        } else {
            LazyError::HttpError(err.to_string())
        }
    }
}

impl LazyError {
    /// Determine if this error should trigger a retry of the fetch
    ///
    /// Returns true for errors that are potentially transient:
    /// - 5xx errors from origin server
    /// - Network timeouts and generic HTTP errors
    /// - Content-Range mismatches
    ///
    /// Getter contract violations, 4xx responses, bad ranges, metadata and
    /// config errors are permanent.
    pub fn should_retry(&self) -> bool {
        match self {
            LazyError::OriginServerError { .. } => true,

            LazyError::Timeout(_) => true,
            LazyError::HttpError(_) => true,

            // Might be an intermediate cache serving a stale object
            LazyError::ContentRangeMismatch { .. } => true,

            LazyError::OriginClientError { .. } => false,
            LazyError::IndexOutOfRange { .. } => false,
            LazyError::InvalidGetter { .. } => false,
            LazyError::InvalidRange(_) => false,
            LazyError::InternalError(_) => false,
            LazyError::ConfigError(_) => false,
            // Size discovery is a single request
            LazyError::MetadataFetchError(_) => false,
            LazyError::RangeNotSupported => false,
            LazyError::FetchFailed { .. } => false,
            LazyError::ParseError(_) => false,
        }
    }

    /// Create an OriginClientError from a status code and message
    pub fn origin_client_error(status: u16, message: impl Into<String>) -> Self {
        LazyError::OriginClientError {
            status,
            message: message.into(),
        }
    }

    /// Create an OriginServerError from a status code and message
    pub fn origin_server_error(status: u16, message: impl Into<String>) -> Self {
        LazyError::OriginServerError {
            status,
            message: message.into(),
        }
    }

    /// Create an error from an HTTP status code
    ///
    /// Automatically categorizes as 4xx or 5xx error
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            LazyError::origin_client_error(status, message)
        } else if (500..600).contains(&status) {
            LazyError::origin_server_error(status, message)
        } else {
            LazyError::HttpError(format!("HTTP {}: {}", status, message))
        }
    }
}
