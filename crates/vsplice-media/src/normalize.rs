//! Segment normalization.
//!
//! Every piece of the final video is re-encoded to the shared profile and
//! geometry before concatenation, so the concat step never has to reconcile
//! mismatched codecs, resolutions or sample rates.

use std::path::PathBuf;
use tracing::debug;

use vsplice_models::EncodingProfile;

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::MediaResult;

/// Instructions for producing one conformant segment.
///
/// Ephemeral: constructed per segment and consumed immediately.
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    /// Source media file
    pub source: PathBuf,
    /// Where to write the encoded segment (overwritten if present)
    pub output: PathBuf,
    /// Optional window start within the source, seconds
    pub start: Option<f64>,
    /// Optional window length, seconds
    pub duration: Option<f64>,
    /// Target frame width
    pub target_width: u32,
    /// Target frame height
    pub target_height: u32,
    /// Whether the source carries an audio stream
    pub has_audio: bool,
    /// Synthesize silent audio when the source has none
    pub force_audio: bool,
}

impl SegmentSpec {
    /// Spec for a whole-file segment (used for the insert clip).
    pub fn whole(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        target_width: u32,
        target_height: u32,
        has_audio: bool,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            start: None,
            duration: None,
            target_width,
            target_height,
            has_audio,
            force_audio: true,
        }
    }

    /// Spec for a time-bounded slice of the source.
    #[allow(clippy::too_many_arguments)]
    pub fn window(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        start: f64,
        duration: f64,
        target_width: u32,
        target_height: u32,
        has_audio: bool,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            start: Some(start),
            duration: Some(duration),
            target_width,
            target_height,
            has_audio,
            force_audio: true,
        }
    }
}

/// Scale to fit inside the target box, pad the remainder with centered
/// black bars, and force a square pixel aspect ratio so concatenation
/// never rescales.
pub fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black,\
         setsar=1"
    )
}

/// Build the FFmpeg command for one segment.
pub fn build_normalize_command(spec: &SegmentSpec, profile: &EncodingProfile) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(&spec.output)
        .input_with_window(&spec.source, spec.start, spec.duration);

    if !spec.has_audio && spec.force_audio {
        // Silent stereo track from lavfi; -shortest bounds the otherwise
        // endless generator to the video duration.
        cmd = cmd
            .lavfi_input(format!(
                "anullsrc=channel_layout=stereo:sample_rate={}",
                profile.sample_rate
            ))
            .map("0:v")
            .map("1:a")
            .shortest();
    }

    cmd.video_filter(scale_pad_filter(spec.target_width, spec.target_height))
        .profile(profile)
}

/// Re-encode one segment to the shared profile.
///
/// The output path must not be referenced by later stages until this call
/// returns successfully; a failed encode may leave a partial file behind
/// for the owning scratch directory to sweep up.
pub async fn normalize_segment(spec: &SegmentSpec, profile: &EncodingProfile) -> MediaResult<()> {
    debug!(
        source = %spec.source.display(),
        output = %spec.output.display(),
        start = ?spec.start,
        duration = ?spec.duration,
        "Normalizing segment"
    );

    run_ffmpeg(&build_normalize_command(spec, profile)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EncodingProfile {
        EncodingProfile::default()
    }

    #[test]
    fn test_filter_scales_pads_and_squares_sar() {
        let filter = scale_pad_filter(1080, 1920);
        assert!(filter.contains("scale=1080:1920:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=1080:1920:(ow-iw)/2:(oh-ih)/2:color=black"));
        assert!(filter.contains("setsar=1"));
    }

    #[test]
    fn test_audio_passthrough_has_single_input() {
        let spec = SegmentSpec::window("src.mp4", "out.mp4", 5.0, 10.0, 720, 1280, true);
        let args = build_normalize_command(&spec, &profile()).build_args();

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert!(!args.iter().any(|a| a.contains("anullsrc")));
        assert!(!args.contains(&"-shortest".to_string()));
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"5.000".to_string()));
        assert!(args.contains(&"10.000".to_string()));
    }

    #[test]
    fn test_silent_audio_synthesized_when_missing() {
        let spec = SegmentSpec::whole("insert.mp4", "out.mp4", 720, 1280, false);
        let args = build_normalize_command(&spec, &profile()).build_args();

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert!(args
            .iter()
            .any(|a| a == "anullsrc=channel_layout=stereo:sample_rate=44100"));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args.contains(&"0:v".to_string()));
        assert!(args.contains(&"1:a".to_string()));
    }

    #[test]
    fn test_segments_share_profile_geometry_args() {
        let with_audio = SegmentSpec::window("a.mp4", "o1.mp4", 0.0, 3.0, 720, 1280, true);
        let without_audio = SegmentSpec::whole("b.mp4", "o2.mp4", 720, 1280, false);

        let p = profile();
        let args_a = build_normalize_command(&with_audio, &p).build_args();
        let args_b = build_normalize_command(&without_audio, &p).build_args();

        for args in [&args_a, &args_b] {
            assert!(args.iter().any(|a| a.contains("scale=720:1280")));
            assert!(args.contains(&"-ar".to_string()));
            assert!(args.contains(&"44100".to_string()));
            assert!(args.contains(&"yuv420p".to_string()));
        }
    }
}
