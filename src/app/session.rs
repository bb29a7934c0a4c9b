// Session store - Display state of the current split, fed by run events

use std::sync::Mutex;

use serde::Serialize;

use crate::domain::model::{Segment, VideoMetadata};
use crate::domain::rules::{clamp_segment_duration, DEFAULT_SEGMENT_DURATION};
use crate::engine::progress::{ProgressObserver, SplitEvent};
use crate::utils::Utils;

/// Delivered segment as the session shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub name: String,
    pub index: usize,
    pub size: u64,
}

/// Display state; never read back by the split logic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub file_name: Option<String>,
    pub file_size: u64,
    pub metadata: Option<VideoMetadata>,
    pub segment_duration: u32,
    pub is_processing: bool,
    /// Percentage, unrounded
    pub progress: f64,
    pub current_segment: usize,
    pub total_segments: usize,
    pub segments: Vec<SegmentSummary>,
    pub error: Option<String>,
    pub status_message: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            file_name: None,
            file_size: 0,
            metadata: None,
            segment_duration: DEFAULT_SEGMENT_DURATION,
            is_processing: false,
            progress: 0.0,
            current_segment: 0,
            total_segments: 0,
            segments: Vec::new(),
            error: None,
            status_message: String::new(),
        }
    }
}

impl SessionState {
    pub fn has_video(&self) -> bool {
        self.file_name.is_some()
    }

    /// Segments the current settings would produce
    pub fn estimated_segments(&self) -> usize {
        match &self.metadata {
            Some(metadata) if metadata.is_usable() => {
                (metadata.duration / self.segment_duration as f64).ceil() as usize
            }
            _ => 0,
        }
    }

    pub fn progress_percentage(&self) -> u32 {
        Utils::calculate_progress(self.current_segment, self.total_segments)
    }

    /// Empty until a file is selected
    pub fn formatted_file_size(&self) -> String {
        if self.has_video() {
            Utils::format_file_size(self.file_size)
        } else {
            String::new()
        }
    }

    /// Empty until a usable duration is known
    pub fn formatted_duration(&self) -> String {
        match &self.metadata {
            Some(metadata) if metadata.is_usable() => {
                Utils::format_clock_duration(metadata.duration)
            }
            _ => String::new(),
        }
    }
}

/// Thread-safe session store
#[derive(Debug, Default)]
pub struct SessionStore {
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().map(|state| state.clone()).unwrap_or_default()
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
    }

    /// Select a new source; clears the previous run
    pub fn set_video_file(&self, name: &str, size: u64) {
        self.update(|state| {
            state.file_name = Some(name.to_string());
            state.file_size = size;
            state.error = None;
            state.segments.clear();
            state.progress = 0.0;
            state.current_segment = 0;
            state.total_segments = 0;
            state.status_message.clear();
        });
    }

    pub fn set_video_info(&self, metadata: VideoMetadata) {
        self.update(|state| state.metadata = Some(metadata));
    }

    /// Store a segment duration clamped into the allowed range
    pub fn set_segment_duration(&self, seconds: u32) {
        self.update(|state| state.segment_duration = clamp_segment_duration(seconds));
    }

    pub fn start_processing(&self) {
        self.update(|state| {
            state.is_processing = true;
            state.progress = 0.0;
            state.current_segment = 0;
            state.segments.clear();
            state.error = None;
            state.status_message = "Starting video segmentation...".to_string();
        });
    }

    pub fn update_progress(&self, current: usize, total: usize, message: &str) {
        self.update(|state| {
            state.current_segment = current;
            state.total_segments = total;
            state.progress = if total > 0 {
                current as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            if !message.is_empty() {
                state.status_message = message.to_string();
            }
        });
    }

    pub fn add_segment(&self, segment: &Segment) {
        self.update(|state| {
            state.segments.push(SegmentSummary {
                name: segment.name.clone(),
                index: segment.index,
                size: segment.size(),
            })
        });
    }

    pub fn finish_processing(&self) {
        self.update(|state| {
            state.is_processing = false;
            state.progress = 100.0;
            state.status_message = "Processing complete!".to_string();
        });
    }

    pub fn set_error(&self, message: &str) {
        self.update(|state| {
            state.error = Some(message.to_string());
            state.is_processing = false;
            state.status_message.clear();
        });
    }

    pub fn set_status_message(&self, message: &str) {
        self.update(|state| state.status_message = message.to_string());
    }

    /// Forget the source and every result
    pub fn reset(&self) {
        self.update(|state| {
            let segment_duration = state.segment_duration;
            *state = SessionState {
                segment_duration,
                ..SessionState::default()
            };
        });
    }
}

impl ProgressObserver for SessionStore {
    fn on_event(&self, event: &SplitEvent) {
        match event {
            SplitEvent::Status { message } => self.set_status_message(message),
            SplitEvent::SegmentStart {
                current,
                total,
                message,
            } => self.update_progress(current.saturating_sub(1), *total, message),
            SplitEvent::SegmentComplete {
                current,
                total,
                message,
            } => self.update_progress(*current, *total, message),
            SplitEvent::Complete { .. } => self.finish_processing(),
            SplitEvent::Error { message } => self.set_error(message),
            SplitEvent::Log { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(duration: f64) -> VideoMetadata {
        VideoMetadata {
            duration,
            codec: "h264".to_string(),
            resolution: "1920x1080".to_string(),
        }
    }

    #[test]
    fn test_derived_values() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot().formatted_file_size(), "");
        assert_eq!(store.snapshot().estimated_segments(), 0);

        store.set_video_file("clip.mp4", 3 * 1024 * 1024);
        store.set_video_info(metadata(125.0));
        let state = store.snapshot();
        assert_eq!(state.formatted_file_size(), "3.00 MB");
        assert_eq!(state.formatted_duration(), "2:05");
        assert_eq!(state.estimated_segments(), 3);

        store.set_segment_duration(30);
        assert_eq!(store.snapshot().estimated_segments(), 5);
    }

    #[test]
    fn test_segment_duration_is_clamped() {
        let store = SessionStore::new();
        store.set_segment_duration(1);
        assert_eq!(store.snapshot().segment_duration, 5);
        store.set_segment_duration(10_000);
        assert_eq!(store.snapshot().segment_duration, 300);
    }

    #[test]
    fn test_events_drive_progress() {
        let store = SessionStore::new();
        store.start_processing();
        store.on_event(&SplitEvent::SegmentStart {
            current: 1,
            total: 3,
            message: "Processing segment 1 of 3...".to_string(),
        });
        assert_eq!(store.snapshot().progress_percentage(), 0);

        store.on_event(&SplitEvent::SegmentComplete {
            current: 2,
            total: 3,
            message: "Completed segment 2 of 3".to_string(),
        });
        let state = store.snapshot();
        assert_eq!(state.progress_percentage(), 67);
        assert_eq!(state.status_message, "Completed segment 2 of 3");

        store.on_event(&SplitEvent::Complete {
            total_segments: 3,
            message: "done".to_string(),
        });
        let state = store.snapshot();
        assert!(!state.is_processing);
        assert_eq!(state.progress, 100.0);
        assert_eq!(state.status_message, "Processing complete!");
    }

    #[test]
    fn test_error_stops_processing() {
        let store = SessionStore::new();
        store.start_processing();
        store.on_event(&SplitEvent::Error {
            message: "Failed to extract segment 2: boom".to_string(),
        });
        let state = store.snapshot();
        assert!(!state.is_processing);
        assert_eq!(state.error.as_deref(), Some("Failed to extract segment 2: boom"));
        assert!(state.status_message.is_empty());
    }

    #[test]
    fn test_reset_keeps_preferences() {
        let store = SessionStore::new();
        store.set_segment_duration(90);
        store.set_video_file("clip.mp4", 10);
        store.set_video_info(metadata(40.0));
        store.reset();
        let state = store.snapshot();
        assert!(!state.has_video());
        assert!(state.metadata.is_none());
        assert_eq!(state.segment_duration, 90);
    }
}
