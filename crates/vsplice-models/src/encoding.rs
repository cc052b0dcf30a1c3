//! The fixed encoding profile shared by every emitted segment.
//!
//! Concatenation is only stream-safe when every input shares codec,
//! resolution, pixel format and audio sample rate, so the profile is
//! constructed once at startup, validated, and never mutated per request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default video codec (software H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// NVENC video codec used when hardware encoding is enabled
pub const NVENC_VIDEO_CODEC: &str = "h264_nvenc";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Default quality target (CRF for libx264, CQ for NVENC)
pub const DEFAULT_QUALITY: u8 = 28;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Quality target {0} out of range (0-51)")]
    QualityOutOfRange(u8),

    #[error("Invalid bitrate value: {0}")]
    InvalidBitrate(String),

    #[error("Audio sample rate must be non-zero")]
    ZeroSampleRate,
}

/// Immutable encoding configuration applied to every segment and to the
/// final concatenation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodingProfile {
    /// Video codec (e.g. "libx264", "h264_nvenc")
    pub video_codec: String,

    /// Encoder preset ("fast" for libx264, "p4" for NVENC)
    pub preset: String,

    /// Quality target: CRF for software encoders, CQ for NVENC
    pub quality: u8,

    /// Target video bitrate (e.g. "5M")
    pub video_bitrate: String,

    /// Rate-control ceiling (e.g. "8M")
    pub max_bitrate: String,

    /// Rate-control buffer size (e.g. "10M")
    pub buffer_size: String,

    /// Audio codec
    pub audio_codec: String,

    /// Audio sample rate in Hz
    pub sample_rate: u32,

    /// Pixel format
    pub pix_fmt: String,

    /// Whether the video codec is an NVENC hardware encoder
    pub use_nvenc: bool,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: "fast".to_string(),
            quality: DEFAULT_QUALITY,
            video_bitrate: "5M".to_string(),
            max_bitrate: "8M".to_string(),
            buffer_size: "10M".to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            pix_fmt: "yuv420p".to_string(),
            use_nvenc: false,
        }
    }
}

impl EncodingProfile {
    /// Create the default software-encoder profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to NVENC hardware encoding.
    ///
    /// Which encoder runs is a deployment decision, so it is a single
    /// profile value rather than a separate code path.
    pub fn with_nvenc(mut self) -> Self {
        self.use_nvenc = true;
        self.video_codec = NVENC_VIDEO_CODEC.to_string();
        self.preset = "p4".to_string();
        self
    }

    /// Validate the profile once at startup.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.quality > 51 {
            return Err(ProfileError::QualityOutOfRange(self.quality));
        }
        if self.sample_rate == 0 {
            return Err(ProfileError::ZeroSampleRate);
        }
        for rate in [&self.video_bitrate, &self.max_bitrate, &self.buffer_size] {
            if !is_valid_bitrate(rate) {
                return Err(ProfileError::InvalidBitrate(rate.clone()));
            }
        }
        Ok(())
    }

    /// Render the output-side FFmpeg arguments for this profile.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
        ];

        // NVENC uses -rc vbr with -cq; software encoders use -crf
        if self.use_nvenc {
            args.extend_from_slice(&[
                "-rc".to_string(),
                "vbr".to_string(),
                "-cq".to_string(),
                self.quality.to_string(),
            ]);
        } else {
            args.extend_from_slice(&["-crf".to_string(), self.quality.to_string()]);
        }

        args.extend_from_slice(&[
            "-b:v".to_string(),
            self.video_bitrate.clone(),
            "-maxrate".to_string(),
            self.max_bitrate.clone(),
            "-bufsize".to_string(),
            self.buffer_size.clone(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-pix_fmt".to_string(),
            self.pix_fmt.clone(),
        ]);

        args
    }
}

/// Accept FFmpeg-style bitrate strings: digits with an optional k/K/m/M suffix.
fn is_valid_bitrate(s: &str) -> bool {
    let digits = s.strip_suffix(['k', 'K', 'm', 'M']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = EncodingProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.video_codec, "libx264");
        assert_eq!(profile.sample_rate, 44_100);
    }

    #[test]
    fn test_software_args_use_crf() {
        let args = EncodingProfile::default().to_ffmpeg_args();
        assert!(args.contains(&"-crf".to_string()));
        assert!(!args.contains(&"-cq".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }

    #[test]
    fn test_nvenc_args_use_cq() {
        let profile = EncodingProfile::default().with_nvenc();
        let args = profile.to_ffmpeg_args();
        assert!(args.contains(&"h264_nvenc".to_string()));
        assert!(args.contains(&"-cq".to_string()));
        assert!(args.contains(&"vbr".to_string()));
        assert!(!args.contains(&"-crf".to_string()));
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let profile = EncodingProfile {
            quality: 60,
            ..Default::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::QualityOutOfRange(60))
        ));
    }

    #[test]
    fn test_invalid_bitrate_rejected() {
        let profile = EncodingProfile {
            video_bitrate: "fast".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidBitrate(_))
        ));
    }
}
