//! The composition orchestrator.
//!
//! Drives one job end to end: probe the insert, fetch the source, plan the
//! segment layout, normalize every piece to the shared profile, and
//! concatenate. All intermediates live in a per-task scratch directory that
//! is removed on every exit path. Only the final output survives, and only
//! on success, at which point the caller owns it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use vsplice_models::{CompositionJob, EncodingProfile, TaskId};

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::fetch::{download_client, fetch_to_file};
use crate::normalize::{normalize_segment, SegmentSpec};
use crate::plan::{ensure_insert_fits, plan_composition};
use crate::probe::{probe_media, MediaProbe};

/// Per-task scratch directory holding the downloaded original and all
/// intermediate segments.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    async fn create(dir: PathBuf) -> MediaResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Remove the directory and everything in it. Failure is logged, not
    /// propagated: cleanup must never mask the pipeline's own result.
    async fn cleanup(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

/// Splices the insert clip into source videos.
pub struct Composer {
    http: reqwest::Client,
    profile: EncodingProfile,
    temp_dir: PathBuf,
}

impl Composer {
    /// Create a composer writing its temporaries under `temp_dir`.
    pub fn new(profile: EncodingProfile, temp_dir: impl Into<PathBuf>) -> MediaResult<Self> {
        let temp_dir = temp_dir.into();
        std::fs::create_dir_all(&temp_dir)?;
        Ok(Self {
            http: download_client()?,
            profile,
            temp_dir,
        })
    }

    /// Compose one job, returning the path of the finished output file.
    ///
    /// The returned file is the caller's to delete once consumed; every
    /// other artifact of this job is gone by the time this returns,
    /// whichever way it returns.
    pub async fn compose(&self, job: &CompositionJob) -> MediaResult<PathBuf> {
        let task_id = TaskId::new();
        info!(
            task_id = %task_id,
            url = %job.source_url,
            position = job.insert_position_percent,
            "Starting composition"
        );

        // Caller errors and the insert gate are checked before anything is
        // downloaded or written.
        if !(0..=100).contains(&job.insert_position_percent) {
            return Err(MediaError::InvalidPosition(job.insert_position_percent));
        }

        if !job.insert_path.exists() {
            return Err(MediaError::invalid_insert(format!(
                "Insert clip not found: {}",
                job.insert_path.display()
            )));
        }

        let insert_probe = probe_media(&job.insert_path).await.map_err(|e| {
            MediaError::invalid_insert(format!(
                "Failed to probe {}: {e}",
                job.insert_path.display()
            ))
        })?;

        if !insert_probe.has_usable_video() {
            return Err(MediaError::invalid_insert(format!(
                "{} has no usable video stream",
                job.insert_path.display()
            )));
        }

        ensure_insert_fits(insert_probe.duration, job.max_total_duration)?;

        let scratch = Scratch::create(self.temp_dir.join(task_id.as_str())).await?;
        let output_path = self.temp_dir.join(format!("processed_{task_id}.mp4"));

        let result = self
            .run_pipeline(job, &insert_probe, &scratch, &output_path, &task_id)
            .await;

        scratch.cleanup().await;

        match result {
            Ok(()) => {
                info!(task_id = %task_id, output = %output_path.display(), "Composition complete");
                Ok(output_path)
            }
            Err(e) => {
                if output_path.exists() {
                    if let Err(rm) = tokio::fs::remove_file(&output_path).await {
                        warn!(path = %output_path.display(), error = %rm, "Failed to remove output after error");
                    }
                }
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        job: &CompositionJob,
        insert_probe: &MediaProbe,
        scratch: &Scratch,
        output_path: &Path,
        task_id: &TaskId,
    ) -> MediaResult<()> {
        let original = scratch.path("original.mp4");
        fetch_to_file(&self.http, &job.source_url, &original).await?;

        let source = probe_media(&original)
            .await
            .map_err(|e| MediaError::invalid_source(format!("Failed to probe source: {e}")))?;

        if !source.has_usable_video() {
            return Err(MediaError::invalid_source(
                "Source has no usable video stream or duration".to_string(),
            ));
        }

        let plan = plan_composition(
            source.duration,
            insert_probe.duration,
            job.insert_position_percent,
            job.max_total_duration,
        )?;

        info!(
            task_id = %task_id,
            source_duration = source.duration,
            insert_duration = insert_probe.duration,
            split_point = plan.split_point,
            segments = plan.segment_count(),
            "Planned composition"
        );

        // The output geometry follows the source; the insert is fitted to it.
        let (width, height) = (source.width, source.height);
        let mut segments: Vec<PathBuf> = Vec::with_capacity(3);

        if let Some(window) = plan.part1 {
            let part1 = scratch.path("part1.mp4");
            let spec = SegmentSpec::window(
                &original,
                &part1,
                window.start,
                window.duration,
                width,
                height,
                source.has_audio,
            );
            normalize_segment(&spec, &self.profile).await?;
            segments.push(part1);
        }

        let insert_norm = scratch.path("insert_norm.mp4");
        let spec = SegmentSpec::whole(
            &job.insert_path,
            &insert_norm,
            width,
            height,
            insert_probe.has_audio,
        );
        normalize_segment(&spec, &self.profile).await?;
        segments.push(insert_norm);

        if let Some(window) = plan.part2 {
            let part2 = scratch.path("part2.mp4");
            let spec = SegmentSpec::window(
                &original,
                &part2,
                window.start,
                window.duration,
                width,
                height,
                source.has_audio,
            );
            normalize_segment(&spec, &self.profile).await?;
            segments.push(part2);
        }

        concat_segments(&segments, output_path, &self.profile).await
    }
}

/// Build the concat filter graph for `n` inputs, consuming each input's
/// video and audio stream in order.
pub fn concat_filter(n: usize) -> String {
    let mut filter = String::new();
    for i in 0..n {
        let _ = write!(filter, "[{i}:v][{i}:a]");
    }
    let _ = write!(filter, "concat=n={n}:v=1:a=1[v][a]");
    filter
}

/// Concatenate already-conformant segments into one output file.
///
/// Inputs must share codec, resolution, pixel format and sample rate,
/// which normalization guarantees; this function never receives raw media.
async fn concat_segments(
    segments: &[PathBuf],
    output: &Path,
    profile: &EncodingProfile,
) -> MediaResult<()> {
    let mut cmd = FfmpegCommand::new(output);
    for segment in segments {
        cmd = cmd.input(segment);
    }
    let cmd = cmd
        .filter_complex(concat_filter(segments.len()))
        .map("[v]")
        .map("[a]")
        .profile(profile);

    run_ffmpeg(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concat_filter_interleaves_streams() {
        assert_eq!(
            concat_filter(3),
            "[0:v][0:a][1:v][1:a][2:v][2:a]concat=n=3:v=1:a=1[v][a]"
        );
        assert_eq!(concat_filter(1), "[0:v][0:a]concat=n=1:v=1:a=1[v][a]");
    }

    #[tokio::test]
    async fn test_scratch_cleanup_removes_everything() {
        let root = TempDir::new().unwrap();
        let scratch = Scratch::create(root.path().join("task1")).await.unwrap();

        tokio::fs::write(scratch.path("part1.mp4"), b"x")
            .await
            .unwrap();
        assert!(scratch.path("part1.mp4").exists());

        scratch.cleanup().await;
        assert!(!scratch.dir.exists());
    }

    #[tokio::test]
    async fn test_missing_insert_fails_before_any_download() {
        let root = TempDir::new().unwrap();
        let composer =
            Composer::new(EncodingProfile::default(), root.path().join("temp")).unwrap();

        let job = CompositionJob::new(
            "http://127.0.0.1:1/video.mp4",
            root.path().join("no-such-insert.mp4"),
            50,
            60.0,
        );

        let err = composer.compose(&job).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidInsert(_)));

        // Nothing was left behind in the temp namespace
        let mut entries = tokio::fs::read_dir(root.path().join("temp")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_position_rejected_up_front() {
        let root = TempDir::new().unwrap();
        let composer =
            Composer::new(EncodingProfile::default(), root.path().join("temp")).unwrap();

        // Insert path deliberately missing; position check comes first
        let job = CompositionJob::new(
            "http://127.0.0.1:1/video.mp4",
            root.path().join("insert.mp4"),
            150,
            60.0,
        );

        let err = composer.compose(&job).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidPosition(150)));
    }
}
