//! Webhook result delivery.
//!
//! One POST per batch, single attempt. The batch outcome is already
//! decided by the time this runs, so delivery failures are reported to
//! the caller's logs and nowhere else.

use std::time::Duration;

use tracing::info;

use vsplice_models::WebhookPayload;

use crate::error::{PipelineError, PipelineResult};

/// Build the HTTP client used for webhook delivery.
pub fn webhook_client(timeout: Duration) -> PipelineResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PipelineError::webhook_failed(format!("Failed to build HTTP client: {e}")))
}

/// Deliver the batch results to the caller's webhook.
pub async fn send_webhook(
    client: &reqwest::Client,
    url: &str,
    payload: &WebhookPayload,
) -> PipelineResult<()> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| PipelineError::webhook_failed(format!("POST {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::webhook_failed(format!(
            "{url} returned HTTP {status}"
        )));
    }

    info!(url, request_id = %payload.request_id, "Webhook delivered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsplice_models::ProcessedVideo;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> WebhookPayload {
        WebhookPayload::new(
            "req-1".to_string(),
            vec![
                ProcessedVideo::success(
                    "https://example.com/a.mp4",
                    "https://cdn.example.com/processed_ab12cd34.mp4",
                ),
                ProcessedVideo::failed("https://example.com/b.mp4", "Download failed"),
            ],
        )
    }

    #[tokio::test]
    async fn test_webhook_posts_full_payload() {
        let server = MockServer::start().await;
        let payload = payload();
        let expected = serde_json::to_string(&payload).unwrap();

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json_string(&expected))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = webhook_client(Duration::from_secs(20)).unwrap();
        send_webhook(&client, &format!("{}/hook", server.uri()), &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_webhook_surfaces_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = webhook_client(Duration::from_secs(20)).unwrap();
        let err = send_webhook(&client, &format!("{}/hook", server.uri()), &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::WebhookFailed(_)));
    }
}
