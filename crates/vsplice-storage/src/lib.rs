//! Object storage for processed videos.

pub mod client;
pub mod error;

pub use client::{S3Config, S3Storage};
pub use error::{StorageError, StorageResult};
