//! Structured batch logging utilities.

use tracing::{error, info, warn};

/// Batch logger for structured logging with consistent formatting.
///
/// Carries the caller's request ID through every lifecycle event so one
/// batch can be followed across interleaved log output.
#[derive(Debug, Clone)]
pub struct BatchLogger {
    request_id: String,
    operation: String,
}

impl BatchLogger {
    /// Create a new logger for a batch operation.
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Log the start of a batch.
    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Batch started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Batch progress: {}", message
        );
    }

    /// Log a warning.
    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Batch warning: {}", message
        );
    }

    /// Log an error.
    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Batch error: {}", message
        );
    }

    /// Log batch completion.
    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Batch completed: {}", message
        );
    }

    /// Get the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_carries_request_id() {
        let logger = BatchLogger::new("req-123", "batch_splice");
        assert_eq!(logger.request_id(), "req-123");
    }
}
