//! Composition job and task identifiers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for one batch item's processing task.
///
/// Short (8 hex chars) because it only needs to be collision-free within
/// the process-wide temp directory, and it keeps file names readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(uuid[..8].to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One source video's full splice-and-encode task.
///
/// Immutable for the lifetime of the job; constructed by the pipeline
/// from the batch request plus process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompositionJob {
    /// Remote URL of the source video
    pub source_url: String,

    /// Local path of the insert clip (already staged)
    pub insert_path: PathBuf,

    /// Where to place the insert, as a percentage of the (possibly
    /// truncated) source duration. Must be within 0..=100; out-of-range
    /// values are rejected by the composer, never clamped.
    pub insert_position_percent: i32,

    /// Upper bound on the total output duration in seconds
    pub max_total_duration: f64,
}

impl CompositionJob {
    pub fn new(
        source_url: impl Into<String>,
        insert_path: impl Into<PathBuf>,
        insert_position_percent: i32,
        max_total_duration: f64,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            insert_path: insert_path.into(),
            insert_position_percent,
            max_total_duration,
        }
    }
}
