//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during the composition pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFprobe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Insert clip unusable: {0}")]
    InvalidInsert(String),

    #[error("Source video unusable: {0}")]
    InvalidSource(String),

    #[error("Insert ({insert_duration:.1}s) leaves no room for source content within {max_total_duration:.1}s")]
    InsertTooLong {
        insert_duration: f64,
        max_total_duration: f64,
    },

    #[error("Insert position {0} outside 0-100")]
    InvalidPosition(i32),

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("FFmpeg encode failed: {message}")]
    EncodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an encode failure wrapping the encoder's diagnostic output.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an invalid-insert error.
    pub fn invalid_insert(message: impl Into<String>) -> Self {
        Self::InvalidInsert(message.into())
    }

    /// Create an invalid-source error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource(message.into())
    }
}
