//! FFprobe media inspection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Stream-level facts about a media file, extracted without decoding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Duration in seconds (millisecond precision)
    pub duration: f64,
    /// Width in pixels (0 when no video stream)
    pub width: u32,
    /// Height in pixels (0 when no video stream)
    pub height: u32,
    /// Whether a video stream is present
    pub has_video: bool,
    /// Whether an audio stream is present
    pub has_audio: bool,
}

impl MediaProbe {
    /// A probe is usable as composition input when it carries a video
    /// stream with a positive duration.
    pub fn has_usable_video(&self) -> bool {
        self.has_video && self.duration > 0.0
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaProbe> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe's JSON into a `MediaProbe`.
///
/// Duration comes from the video stream when it reports one, falling back
/// to the container format; some containers only carry it in one place.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaProbe> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    let format_duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok());

    let duration = video_stream
        .and_then(|s| s.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .or(format_duration)
        .unwrap_or(0.0);

    Ok(MediaProbe {
        duration,
        width: video_stream.and_then(|s| s.width).unwrap_or(0),
        height: video_stream.and_then(|s| s.height).unwrap_or(0),
        has_video: video_stream.is_some(),
        has_audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_with_audio() {
        let json = r#"{
            "format": { "duration": "90.500000" },
            "streams": [
                { "codec_type": "video", "width": 1080, "height": 1920, "duration": "90.483000" },
                { "codec_type": "audio" }
            ]
        }"#;

        let probe = parse_probe_output(json.as_bytes()).unwrap();
        assert!(probe.has_video);
        assert!(probe.has_audio);
        assert_eq!(probe.width, 1080);
        assert_eq!(probe.height, 1920);
        // Stream duration wins over format duration
        assert!((probe.duration - 90.483).abs() < 0.001);
        assert!(probe.has_usable_video());
    }

    #[test]
    fn test_parse_falls_back_to_format_duration() {
        let json = r#"{
            "format": { "duration": "12.345000" },
            "streams": [
                { "codec_type": "video", "width": 640, "height": 480 }
            ]
        }"#;

        let probe = parse_probe_output(json.as_bytes()).unwrap();
        assert!((probe.duration - 12.345).abs() < 0.001);
        assert!(!probe.has_audio);
    }

    #[test]
    fn test_parse_audio_only_file() {
        let json = r#"{
            "format": { "duration": "30.000000" },
            "streams": [ { "codec_type": "audio" } ]
        }"#;

        let probe = parse_probe_output(json.as_bytes()).unwrap();
        assert!(!probe.has_video);
        assert!(probe.has_audio);
        assert_eq!(probe.width, 0);
        assert!(!probe.has_usable_video());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_probe_output(b"not json").is_err());
    }
}
