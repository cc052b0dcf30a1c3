//! Batch request and webhook wire types.
//!
//! These types mirror the JSON bodies exchanged with the intake caller and
//! the webhook receiver, so field names are part of the external contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A batch processing request accepted by `POST /api/process`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct BatchRequest {
    /// Caller-supplied correlation ID, echoed back in the webhook
    #[validate(length(min = 1))]
    pub request_id: String,

    /// Remote video URLs to process
    #[validate(length(min = 1))]
    pub video_urls: Vec<String>,

    /// Name of an insert clip already present in the staging area
    #[validate(length(min = 1))]
    pub insert_video_filename: String,

    /// Relative position of the insert within each source, 0-100
    #[serde(default = "default_insert_position")]
    #[validate(range(min = 0, max = 100))]
    pub insert_position: i32,

    /// Where to POST the batch result
    #[validate(url)]
    pub webhook_url: String,
}

fn default_insert_position() -> i32 {
    50
}

/// Terminal status of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// Per-item result delivered in the webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessedVideo {
    /// The source URL as given in the request
    pub original_url: String,

    /// Public storage URL of the spliced output (success only)
    pub s3_url: Option<String>,

    /// "success" or "failed"
    pub status: ItemStatus,

    /// Failure reason (failed only)
    pub error: Option<String>,
}

impl ProcessedVideo {
    /// Build a success record.
    pub fn success(original_url: impl Into<String>, s3_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            s3_url: Some(s3_url.into()),
            status: ItemStatus::Success,
            error: None,
        }
    }

    /// Build a failure record.
    pub fn failed(original_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            s3_url: None,
            status: ItemStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Success
    }
}

/// Final batch result POSTed to the caller's webhook URL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebhookPayload {
    pub request_id: String,
    pub processed_count: usize,
    pub results: Vec<ProcessedVideo>,
}

impl WebhookPayload {
    pub fn new(request_id: impl Into<String>, results: Vec<ProcessedVideo>) -> Self {
        Self {
            request_id: request_id.into(),
            processed_count: results.len(),
            results,
        }
    }
}

/// Immediate acknowledgment returned by the intake endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskAccepted {
    pub message: String,
    pub request_id: String,
    pub status: String,
}

impl TaskAccepted {
    /// Standard "accepted, results via webhook" acknowledgment.
    pub fn pending(request_id: impl Into<String>) -> Self {
        Self {
            message: "Task accepted. Results will be sent via webhook.".to_string(),
            request_id: request_id.into(),
            status: "pending".to_string(),
        }
    }
}

/// Request body for URL-based insert clip intake.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct UploadInsertRequest {
    #[validate(url)]
    pub video_url: String,
}

/// Response for insert clip intake.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadInsertResponse {
    pub status: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> BatchRequest {
        BatchRequest {
            request_id: "req-1".to_string(),
            video_urls: vec!["https://example.com/a.mp4".to_string()],
            insert_video_filename: "promo.mp4".to_string(),
            insert_position: 50,
            webhook_url: "https://example.com/hook".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_empty_urls_rejected() {
        let mut req = valid_request();
        req.video_urls.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_out_of_range_position_rejected() {
        let mut req = valid_request();
        req.insert_position = 101;
        assert!(req.validate().is_err());

        req.insert_position = -1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_insert_position_defaults_to_midpoint() {
        let json = r#"{
            "request_id": "req-1",
            "video_urls": ["https://example.com/a.mp4"],
            "insert_video_filename": "promo.mp4",
            "webhook_url": "https://example.com/hook"
        }"#;
        let req: BatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.insert_position, 50);
    }

    #[test]
    fn test_webhook_payload_wire_format() {
        let payload = WebhookPayload::new(
            "req-1",
            vec![
                ProcessedVideo::success("https://example.com/a.mp4", "https://cdn/out.mp4"),
                ProcessedVideo::failed("https://example.com/b.mp4", "Download failed"),
            ],
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["processed_count"], 2);
        assert_eq!(json["results"][0]["status"], "success");
        assert_eq!(json["results"][0]["s3_url"], "https://cdn/out.mp4");
        assert_eq!(json["results"][1]["status"], "failed");
        assert_eq!(json["results"][1]["s3_url"], serde_json::Value::Null);
        assert_eq!(json["results"][1]["error"], "Download failed");
    }
}
