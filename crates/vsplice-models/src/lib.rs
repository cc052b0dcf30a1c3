//! Shared data models for the VSplice backend.
//!
//! This crate provides Serde-serializable types for:
//! - Batch processing requests and webhook payloads
//! - Composition jobs and task identifiers
//! - The fixed encoding profile every segment must share

pub mod batch;
pub mod encoding;
pub mod task;

// Re-export common types
pub use batch::{
    BatchRequest, ItemStatus, ProcessedVideo, TaskAccepted, UploadInsertRequest,
    UploadInsertResponse, WebhookPayload,
};
pub use encoding::{EncodingProfile, ProfileError, DEFAULT_SAMPLE_RATE};
pub use task::{CompositionJob, TaskId};
