//! Media processing for the splice service.
//!
//! Wraps the FFmpeg and FFprobe binaries behind typed commands, and builds
//! the probe, fetch, plan, normalize and compose stages on top of them.

pub mod command;
pub mod compose;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod plan;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, run_ffmpeg, FfmpegCommand};
pub use compose::Composer;
pub use error::{MediaError, MediaResult};
pub use fetch::{download_client, fetch_to_file};
pub use normalize::{normalize_segment, SegmentSpec};
pub use plan::{ensure_insert_fits, plan_composition, CompositionPlan, SegmentWindow};
pub use probe::{probe_media, MediaProbe};
