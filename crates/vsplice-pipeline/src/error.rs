//! Pipeline error types.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while driving a batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Media(#[from] vsplice_media::MediaError),

    #[error(transparent)]
    Storage(#[from] vsplice_storage::StorageError),

    #[error("Webhook delivery failed: {0}")]
    WebhookFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn webhook_failed(msg: impl Into<String>) -> Self {
        Self::WebhookFailed(msg.into())
    }
}
