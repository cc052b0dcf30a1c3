//! Batch splice pipeline.
//!
//! Ties the media, storage and webhook layers together: one accepted
//! request in, one webhook with per-item results out.

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod webhook;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::BatchLogger;
pub use pipeline::BatchPipeline;
pub use webhook::{send_webhook, webhook_client};
