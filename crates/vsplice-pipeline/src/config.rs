//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use vsplice_models::EncodingProfile;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding staged insert clips
    pub staging_dir: PathBuf,
    /// Directory for per-task scratch space and finished outputs
    pub temp_dir: PathBuf,
    /// Hard cap on output duration, seconds
    pub max_total_duration: f64,
    /// Timeout for webhook delivery
    pub webhook_timeout: Duration,
    /// Encode with NVENC hardware acceleration
    pub use_nvenc: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("uploads"),
            temp_dir: PathBuf::from("temp"),
            max_total_duration: 60.0,
            webhook_timeout: Duration::from_secs(20),
            use_nvenc: false,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            staging_dir: std::env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            max_total_duration: std::env::var("MAX_TOTAL_DURATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_total_duration),
            webhook_timeout: Duration::from_secs(
                std::env::var("WEBHOOK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
            use_nvenc: std::env::var("USE_NVENC")
                .map(|s| matches!(s.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// The encoding profile all segments are conformed to.
    pub fn profile(&self) -> EncodingProfile {
        if self.use_nvenc {
            EncodingProfile::default().with_nvenc()
        } else {
            EncodingProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_total_duration, 60.0);
        assert_eq!(config.webhook_timeout, Duration::from_secs(20));
        assert!(!config.use_nvenc);
        assert_eq!(config.staging_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_profile_follows_nvenc_flag() {
        let software = PipelineConfig::default().profile();
        assert_eq!(software.video_codec, "libx264");

        let hw = PipelineConfig {
            use_nvenc: true,
            ..Default::default()
        }
        .profile();
        assert_eq!(hw.video_codec, "h264_nvenc");
    }
}
