//! Batch pipeline.
//!
//! Drives one accepted batch: splice every source URL, upload each
//! finished file, and report the per-item outcomes to the caller's
//! webhook. One item failing never aborts the batch, and one batch
//! always ends in exactly one webhook attempt.

use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::warn;

use vsplice_media::Composer;
use vsplice_models::{BatchRequest, CompositionJob, ProcessedVideo, WebhookPayload};
use vsplice_storage::S3Storage;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::logging::BatchLogger;
use crate::webhook::{send_webhook, webhook_client};

/// Executes accepted batches end to end.
pub struct BatchPipeline {
    composer: Composer,
    storage: S3Storage,
    webhook: reqwest::Client,
    config: PipelineConfig,
}

impl BatchPipeline {
    /// Create a pipeline from configuration and a storage client.
    pub fn new(config: PipelineConfig, storage: S3Storage) -> PipelineResult<Self> {
        std::fs::create_dir_all(&config.staging_dir)?;
        let composer = Composer::new(config.profile(), &config.temp_dir)?;
        let webhook = webhook_client(config.webhook_timeout)?;

        Ok(Self {
            composer,
            storage,
            webhook,
            config,
        })
    }

    /// Where an insert clip with the given filename is staged.
    pub fn staged_insert_path(&self, filename: &str) -> PathBuf {
        self.config.staging_dir.join(filename)
    }

    /// Run one batch to completion.
    ///
    /// Always delivers (or attempts to deliver) exactly one webhook with
    /// one result per requested URL, in request order.
    pub async fn run(&self, request: BatchRequest) {
        let logger = BatchLogger::new(&request.request_id, "batch_splice");
        logger.log_start(&format!("{} video(s)", request.video_urls.len()));

        let insert_path = self.staged_insert_path(&request.insert_video_filename);
        let results = self.run_batch(&request, &insert_path, &logger).await;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let payload = WebhookPayload::new(request.request_id.clone(), results);

        if let Err(e) = send_webhook(&self.webhook, &request.webhook_url, &payload).await {
            // The batch outcome stands regardless; delivery is best-effort
            logger.log_warning(&format!("Webhook delivery failed: {e}"));
            counter!("vsplice_webhook_failures_total").increment(1);
        }

        logger.log_completion(&format!(
            "{succeeded}/{} succeeded",
            payload.processed_count
        ));
        counter!("vsplice_batches_total").increment(1);
    }

    async fn run_batch(
        &self,
        request: &BatchRequest,
        insert_path: &Path,
        logger: &BatchLogger,
    ) -> Vec<ProcessedVideo> {
        let mut results = Vec::with_capacity(request.video_urls.len());

        for (index, url) in request.video_urls.iter().enumerate() {
            logger.log_progress(&format!(
                "Processing {}/{}: {url}",
                index + 1,
                request.video_urls.len()
            ));

            match self.process_item(request, insert_path, url).await {
                Ok(s3_url) => {
                    counter!("vsplice_items_total", "status" => "success").increment(1);
                    results.push(ProcessedVideo::success(url, s3_url));
                }
                Err(e) => {
                    logger.log_error(&format!("{url}: {e}"));
                    counter!("vsplice_items_total", "status" => "failed").increment(1);
                    results.push(ProcessedVideo::failed(url, e.to_string()));
                }
            }
        }

        results
    }

    /// Splice and upload one source video, returning its public URL.
    ///
    /// The local output file is removed whether or not the upload
    /// succeeds; once composed it exists only to be shipped.
    async fn process_item(
        &self,
        request: &BatchRequest,
        insert_path: &Path,
        url: &str,
    ) -> PipelineResult<String> {
        let job = CompositionJob::new(
            url,
            insert_path,
            request.insert_position,
            self.config.max_total_duration,
        );

        let output = self.composer.compose(&job).await?;
        let upload = self.storage.upload_public(&output, &output_key(&output)).await;

        if let Err(e) = tokio::fs::remove_file(&output).await {
            warn!(path = %output.display(), error = %e, "Failed to remove uploaded output");
        }

        Ok(upload?)
    }
}

/// Object key for a finished output file.
fn output_key(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "processed.mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vsplice_storage::S3Config;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_storage() -> S3Storage {
        S3Storage::new(S3Config {
            endpoint_url: "http://127.0.0.1:9000".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
            bucket_name: "test-bucket".to_string(),
            region: "auto".to_string(),
            public_base_url: "http://127.0.0.1:9000/test-bucket".to_string(),
        })
    }

    #[test]
    fn test_output_key_uses_file_name() {
        let key = output_key(Path::new("temp/processed_ab12cd34.mp4"));
        assert_eq!(key, "processed_ab12cd34.mp4");
    }

    #[test]
    fn test_staged_insert_path_joins_staging_dir() {
        let config = PipelineConfig {
            staging_dir: PathBuf::from("/srv/uploads"),
            ..Default::default()
        };
        assert_eq!(
            config.staging_dir.join("insert_video.mp4"),
            PathBuf::from("/srv/uploads/insert_video.mp4")
        );
    }

    #[tokio::test]
    async fn test_item_failures_stay_isolated_and_webhook_fires_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let root = TempDir::new().unwrap();
        let config = PipelineConfig {
            staging_dir: root.path().join("uploads"),
            temp_dir: root.path().join("temp"),
            ..Default::default()
        };
        let pipeline = BatchPipeline::new(config, test_storage()).unwrap();

        // The insert was never staged, so every item fails up front,
        // without the batch aborting
        let request = BatchRequest {
            request_id: "req-batch".to_string(),
            video_urls: vec![
                "https://example.com/a.mp4".to_string(),
                "https://example.com/b.mp4".to_string(),
                "https://example.com/c.mp4".to_string(),
            ],
            insert_video_filename: "never-staged.mp4".to_string(),
            insert_position: 50,
            webhook_url: format!("{}/hook", server.uri()),
        };

        pipeline.run(request).await;

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);

        let payload: WebhookPayload = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(payload.request_id, "req-batch");
        assert_eq!(payload.processed_count, 3);
        assert_eq!(payload.results.len(), 3);
        assert_eq!(payload.results[0].original_url, "https://example.com/a.mp4");
        assert_eq!(payload.results[2].original_url, "https://example.com/c.mp4");
        for result in &payload.results {
            assert!(!result.is_success());
            assert!(result.s3_url.is_none());
            assert!(result.error.as_deref().unwrap_or("").contains("never-staged.mp4"));
        }
    }
}
