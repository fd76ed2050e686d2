//! Error types for media-relay
//!
//! This module provides error handling for the service, including:
//! - Domain-specific error types (Download, Storage, Validation)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-relay
///
/// Each variant carries enough context to diagnose the failure from the logs
/// alone; the HTTP layer converts it via [`ToHttpStatus`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "BUCKET_NAME")
        key: Option<String>,
    },

    /// The request query was rejected before any work started
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Object storage error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server failed to bind or serve
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External tool could not be executed
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Rejections of the `url`/`format` query parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `url` or `format` is absent or empty
    #[error("Both url and format are required")]
    MissingParameters,

    /// `format` is neither `mp4` nor `mp3`
    #[error("Invalid format")]
    InvalidFormat(String),
}

/// Errors raised while running the external downloader and collecting its output
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The downloader exited with a non-zero status
    #[error("downloader exited with {}: {stderr}", describe_exit(.exit_code))]
    ToolFailed {
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Trailing stderr output of the downloader
        stderr: String,
    },

    /// The downloader finished but left nothing in the workspace
    #[error("download produced no output in {}", .workdir.display())]
    EmptyOutput {
        /// The request workspace that was inspected
        workdir: PathBuf,
    },

    /// The downloader left more than one file in the workspace
    #[error("download produced {} files, expected exactly one: {}", .files.len(), .files.join(", "))]
    AmbiguousOutput {
        /// The request workspace that was inspected
        workdir: PathBuf,
        /// Names of the files found
        files: Vec<String>,
    },

    /// The downloader's metadata output could not be interpreted
    #[error("could not read media metadata: {0}")]
    InvalidMetadata(String),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {code}"),
        None => "signal".to_string(),
    }
}

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Streaming the file into the bucket failed
    #[error("failed to upload {key}: {message}")]
    UploadFailed {
        /// Object key that was being written
        key: String,
        /// Underlying SDK or I/O error message
        message: String,
    },

    /// Generating the presigned download URL failed
    #[error("failed to sign download link for {key}: {message}")]
    PresignFailed {
        /// Object key the link was requested for
        key: String,
        /// Underlying SDK error message
        message: String,
    },
}

/// API error response format
///
/// Keeps the `error` field a plain human-readable message so clients that only
/// look at `error` keep working, and adds a machine-readable `code`.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "download error: download produced no output in /tmp/media-relay-x1y2",
///   "code": "empty_output"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "upload_failed")
    pub code: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - missing or invalid query parameters
            Error::Validation(_) => 400,

            // 501 Not Implemented - no downloader binary available
            Error::NotSupported(_) => 501,

            // Everything that goes wrong after validation is a server error
            Error::Config { .. } => 500,
            Error::Download(_) => 500,
            Error::Storage(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::ExternalTool(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(e) => match e {
                ValidationError::MissingParameters => "missing_parameters",
                ValidationError::InvalidFormat(_) => "invalid_format",
            },
            Error::Download(e) => match e {
                DownloadError::ToolFailed { .. } => "download_failed",
                DownloadError::EmptyOutput { .. } => "empty_output",
                DownloadError::AmbiguousOutput { .. } => "ambiguous_output",
                DownloadError::InvalidMetadata(_) => "invalid_metadata",
            },
            Error::Storage(e) => match e {
                StorageError::UploadFailed { .. } => "upload_failed",
                StorageError::PresignFailed { .. } => "presign_failed",
            },
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Download(DownloadError::ToolFailed { exit_code, .. }) => {
                Some(serde_json::json!({ "exit_code": exit_code }))
            }
            Error::Download(DownloadError::AmbiguousOutput { files, .. }) => {
                Some(serde_json::json!({ "files": files }))
            }
            Error::Storage(StorageError::UploadFailed { key, .. })
            | Error::Storage(StorageError::PresignFailed { key, .. }) => {
                Some(serde_json::json!({ "key": key }))
            }
            _ => None,
        };

        ApiError {
            error: message,
            code,
            details,
        }
    }
}
