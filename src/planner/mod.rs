//! Segment planning
//!
//! Turns a total duration and a per-segment duration into the ordered list
//! of time ranges to extract. The final range is not shortened: extraction
//! is time-bounded, so the engine simply stops at the end of the media.

use tracing::{debug, warn};

use crate::domain::model::SegmentPlanEntry;

/// Largest plan ever produced
pub const MAX_SEGMENTS: usize = 1_000_000;

/// Plan fixed-length segments covering `total_duration`
///
/// Returns an empty plan when either duration is not a positive finite
/// number, or when covering the duration would take more than
/// [`MAX_SEGMENTS`] segments.
pub fn plan(total_duration: f64, segment_duration: f64) -> Vec<SegmentPlanEntry> {
    if !is_positive(total_duration) || !is_positive(segment_duration) {
        debug!(total_duration, segment_duration, "Nothing to plan");
        return Vec::new();
    }

    let count = (total_duration / segment_duration).ceil();
    if !count.is_finite() || count > MAX_SEGMENTS as f64 {
        warn!(total_duration, segment_duration, "Segment count exceeds {}", MAX_SEGMENTS);
        return Vec::new();
    }
    let count = count as usize;
    let entries: Vec<SegmentPlanEntry> = (1..=count)
        .map(|index| SegmentPlanEntry {
            index,
            start_offset: (index - 1) as f64 * segment_duration,
            length: segment_duration,
        })
        .collect();

    debug!(
        total_duration,
        segment_duration,
        segments = entries.len(),
        "Planned segments"
    );
    entries
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
