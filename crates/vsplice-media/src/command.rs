//! FFmpeg command builder and runner.
//!
//! Composition needs commands with more than one input (a media file plus
//! a lavfi silence generator, or N segments feeding the concat filter), so
//! the builder models an ordered list of inputs, each with its own
//! input-side arguments.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use vsplice_models::EncodingProfile;

use crate::error::{MediaError, MediaResult};

/// One `-i` input with its preceding arguments.
#[derive(Debug, Clone)]
struct FfmpegInput {
    /// Arguments placed before this input's `-i`
    args: Vec<String>,
    /// The input specifier (file path or lavfi graph)
    source: String,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    output: PathBuf,
    /// Arguments placed after all inputs
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new command writing to `output`, overwriting if present.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a file input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_window(path, None, None)
    }

    /// Add a file input limited to `[start, start+duration)`.
    ///
    /// `-ss`/`-t` go on the input side so decode starts at the seek point.
    pub fn input_with_window(
        mut self,
        path: impl AsRef<Path>,
        start: Option<f64>,
        duration: Option<f64>,
    ) -> Self {
        let mut args = Vec::new();
        if let Some(start) = start {
            if start > 0.0 {
                args.push("-ss".to_string());
                args.push(format!("{start:.3}"));
            }
        }
        if let Some(duration) = duration {
            args.push("-t".to_string());
            args.push(format!("{duration:.3}"));
        }
        self.inputs.push(FfmpegInput {
            args,
            source: path.as_ref().to_string_lossy().to_string(),
        });
        self
    }

    /// Add a lavfi (filter source) input, e.g. an `anullsrc` silence generator.
    pub fn lavfi_input(mut self, graph: impl Into<String>) -> Self {
        self.inputs.push(FfmpegInput {
            args: vec!["-f".to_string(), "lavfi".to_string()],
            source: graph.into(),
        });
        self
    }

    /// Add a single output-side argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output-side arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the video filter chain (`-vf`).
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set a filter graph spanning multiple inputs (`-filter_complex`).
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream into the output (`-map`).
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Stop encoding when the shortest stream ends.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Apply the fixed encoding profile's output arguments.
    pub fn profile(self, profile: &EncodingProfile) -> Self {
        self.output_args(profile.to_ffmpeg_args())
    }

    /// Build the full argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Run an FFmpeg command, capturing stderr for diagnostics.
pub async fn run_ffmpeg(cmd: &FfmpegCommand) -> MediaResult<()> {
    check_ffmpeg()?;

    let args = cmd.build_args();
    debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if output.status.success() {
        Ok(())
    } else {
        Err(MediaError::encode_failed(
            "FFmpeg exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ))
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_input_with_window() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input_with_window("in.mp4", Some(10.0), Some(30.0))
            .video_filter("setsar=1");

        let args = cmd.build_args();
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"10.000".to_string()));
        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"30.000".to_string()));
        assert!(args.contains(&"-vf".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_zero_seek_is_omitted() {
        let cmd = FfmpegCommand::new("out.mp4").input_with_window("in.mp4", Some(0.0), Some(5.0));
        let args = cmd.build_args();
        assert!(!args.contains(&"-ss".to_string()));
        assert!(args.contains(&"-t".to_string()));
    }

    #[test]
    fn test_input_args_precede_their_input() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input("a.mp4")
            .lavfi_input("anullsrc=channel_layout=stereo:sample_rate=44100");

        let args = cmd.build_args();
        let lavfi_pos = args.iter().position(|a| a == "lavfi").unwrap();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        // -f lavfi belongs to the second input, after the first -i
        assert!(lavfi_pos > first_i);
    }

    #[test]
    fn test_maps_and_profile() {
        let profile = vsplice_models::EncodingProfile::default();
        let cmd = FfmpegCommand::new("out.mp4")
            .input("a.mp4")
            .input("b.mp4")
            .filter_complex("[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[v][a]")
            .map("[v]")
            .map("[a]")
            .profile(&profile);

        let args = cmd.build_args();
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(args.iter().filter(|a| *a == "-map").count(), 2);
        assert!(args.contains(&"libx264".to_string()));
    }
}
