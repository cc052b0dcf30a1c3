//! Segment planning for composition.
//!
//! All duration math lives here as pure functions so the split-point and
//! gating rules can be tested without touching FFmpeg or the network.

use crate::error::{MediaError, MediaResult};

/// Minimum room the source must retain after the insert is accounted for.
/// At or below this, the job fails rather than emitting a near-empty splice.
pub const MIN_SOURCE_ROOM_SECS: f64 = 5.0;

/// Segments shorter than this are omitted entirely; many encoders
/// mishandle near-zero-length inputs during concatenation.
pub const MIN_SEGMENT_SECS: f64 = 0.1;

/// A time window within the source video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWindow {
    /// Offset into the source, seconds
    pub start: f64,
    /// Window length, seconds
    pub duration: f64,
}

/// The computed layout of one composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    /// How much of the source survives the total-duration cap
    pub final_source_duration: f64,
    /// Where the insert goes, seconds into the (truncated) source
    pub split_point: f64,
    /// Source content before the insert, if long enough to keep
    pub part1: Option<SegmentWindow>,
    /// Source content after the insert, if long enough to keep
    pub part2: Option<SegmentWindow>,
}

impl CompositionPlan {
    /// Number of segments that will be concatenated (parts + insert).
    pub fn segment_count(&self) -> usize {
        1 + self.part1.is_some() as usize + self.part2.is_some() as usize
    }

    /// Total source duration carried into the output.
    pub fn source_duration(&self) -> f64 {
        self.part1.map(|w| w.duration).unwrap_or(0.0) + self.part2.map(|w| w.duration).unwrap_or(0.0)
    }
}

/// Check that the insert leaves meaningful room for source content.
///
/// This gate depends only on the insert and the cap, so the composer
/// evaluates it before the source is ever downloaded.
pub fn ensure_insert_fits(insert_duration: f64, max_total_duration: f64) -> MediaResult<()> {
    let allowed = max_total_duration - insert_duration;
    if allowed <= MIN_SOURCE_ROOM_SECS {
        return Err(MediaError::InsertTooLong {
            insert_duration,
            max_total_duration,
        });
    }
    Ok(())
}

/// Compute the segment layout for one composition.
///
/// Out-of-range positions are rejected, never clamped: a caller sending
/// 150 has a bug we should surface, not silently reinterpret.
pub fn plan_composition(
    source_duration: f64,
    insert_duration: f64,
    position_percent: i32,
    max_total_duration: f64,
) -> MediaResult<CompositionPlan> {
    if !(0..=100).contains(&position_percent) {
        return Err(MediaError::InvalidPosition(position_percent));
    }

    ensure_insert_fits(insert_duration, max_total_duration)?;

    let allowed_source_duration = max_total_duration - insert_duration;
    let final_source_duration = source_duration.min(allowed_source_duration);
    let split_point = final_source_duration * (position_percent as f64 / 100.0);

    let part1 = (split_point > MIN_SEGMENT_SECS).then_some(SegmentWindow {
        start: 0.0,
        duration: split_point,
    });

    let remaining = final_source_duration - split_point;
    let part2 = (remaining > MIN_SEGMENT_SECS).then_some(SegmentWindow {
        start: split_point,
        duration: remaining,
    });

    Ok(CompositionPlan {
        final_source_duration,
        split_point,
        part1,
        part2,
    })
}
