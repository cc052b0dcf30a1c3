//! Application state.

use std::sync::Arc;

use vsplice_media::download_client;
use vsplice_pipeline::{BatchPipeline, PipelineConfig};
use vsplice_storage::S3Storage;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<BatchPipeline>,
    pub storage: Arc<S3Storage>,
    /// Client for fetching remote insert clips at intake time
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = S3Storage::from_env()?;
        let pipeline = BatchPipeline::new(PipelineConfig::from_env(), storage.clone())?;

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            storage: Arc::new(storage),
            http: download_client()?,
        })
    }
}
