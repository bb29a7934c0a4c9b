// Domain models - Core types and data structures

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::rules::{base_name_of, extension_of, mime_type_for};
use crate::error::{SplitError, SplitResult};
use crate::ports::HandleRegistry;

/// Source video accepted for one run
#[derive(Debug, Clone)]
pub struct SourceVideo {
    name: String,
    data: Vec<u8>,
}

impl SourceVideo {
    /// Create a source video from its file name and contents
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased extension including the dot, `.mp4` when there is none
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// File name without its final extension
    pub fn base_name(&self) -> &str {
        base_name_of(&self.name)
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type_for(&self.extension())
    }
}

/// Metadata recovered from the engine's probe output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoMetadata {
    /// Duration in seconds, 0 when the probe found none
    pub duration: f64,
    /// Primary video codec, empty when unparsed
    pub codec: String,
    /// `WxH`, empty when unparsed
    pub resolution: String,
}

impl VideoMetadata {
    /// Whether the duration is good enough to plan a split
    pub fn is_usable(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }
}

/// One planned segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentPlanEntry {
    /// 1-based ordinal
    pub index: usize,
    /// Seek offset in seconds
    pub start_offset: f64,
    /// Requested length in seconds
    pub length: f64,
}

/// Transient handle for a segment artifact, revoked exactly once
pub struct SegmentHandle {
    id: u64,
    registry: Arc<dyn HandleRegistry>,
    released: bool,
}

impl SegmentHandle {
    fn new(registry: Arc<dyn HandleRegistry>, name: &str, size: u64) -> Self {
        let id = registry.register(name, size);
        Self {
            id,
            registry,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Revoke the handle; later calls do nothing
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.revoke(self.id);
        }
    }
}

impl Drop for SegmentHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SegmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentHandle")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

/// One extracted segment
#[derive(Debug)]
pub struct Segment {
    /// Delivery name, `<base>_part_<NNN><ext>`
    pub name: String,
    /// 1-based ordinal
    pub index: usize,
    pub mime_type: &'static str,
    data: Vec<u8>,
    handle: SegmentHandle,
}

impl Segment {
    /// Wrap extracted bytes and allocate the artifact's handle
    pub fn new(
        name: String,
        index: usize,
        mime_type: &'static str,
        data: Vec<u8>,
        registry: Arc<dyn HandleRegistry>,
    ) -> Self {
        let handle = SegmentHandle::new(registry, &name, data.len() as u64);
        Self {
            name,
            index,
            mime_type,
            data,
            handle,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Revoke the artifact's handle; the bytes stay readable
    pub fn release(&mut self) {
        self.handle.release();
    }
}

/// Phase of a split run
#[derive(Debug, Clone, PartialEq)]
pub enum RunPhase {
    Idle,
    LoadingSource,
    Probing,
    Planning,
    Extracting { index: usize },
    Finalizing,
    Done,
    Failed { reason: String },
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed { .. })
    }

    /// Legal successor check; `total` is the planned segment count
    fn allows(&self, next: &RunPhase, total: usize) -> bool {
        match (self, next) {
            (current, RunPhase::Failed { .. }) => !current.is_terminal(),
            (RunPhase::Idle, RunPhase::LoadingSource) => true,
            (RunPhase::LoadingSource, RunPhase::Probing) => true,
            (RunPhase::Probing, RunPhase::Planning) => true,
            (RunPhase::Planning, RunPhase::Extracting { index }) => *index == 1 && total >= 1,
            (RunPhase::Extracting { index }, RunPhase::Extracting { index: next }) => {
                *next == index + 1 && *next <= total
            }
            (RunPhase::Extracting { index }, RunPhase::Finalizing) => *index == total,
            (RunPhase::Finalizing, RunPhase::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::LoadingSource => write!(f, "loading-source"),
            RunPhase::Probing => write!(f, "probing"),
            RunPhase::Planning => write!(f, "planning"),
            RunPhase::Extracting { index } => write!(f, "extracting({})", index),
            RunPhase::Finalizing => write!(f, "finalizing"),
            RunPhase::Done => write!(f, "done"),
            RunPhase::Failed { reason } => write!(f, "failed({})", reason),
        }
    }
}

/// State of one split run
#[derive(Debug)]
pub struct RunState {
    phase: RunPhase,
    current: usize,
    total: usize,
    status: String,
    segments: Vec<Segment>,
    in_flight: Option<String>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            current: 0,
            total: 0,
            status: String::new(),
            segments: Vec::new(),
            in_flight: None,
        }
    }

    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Move to `next`, rejecting transitions the run cannot take
    pub fn advance(&mut self, next: RunPhase) -> SplitResult<()> {
        if !self.phase.allows(&next, self.total) {
            return Err(SplitError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        if let RunPhase::Extracting { index } = next {
            self.current = index;
        }
        self.phase = next;
        Ok(())
    }

    /// Record the planned segment count; only meaningful while planning
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remember the engine-side output currently being produced
    pub fn set_in_flight(&mut self, name: impl Into<String>) {
        self.in_flight = Some(name.into());
    }

    pub fn clear_in_flight(&mut self) {
        self.in_flight = None;
    }

    pub fn take_in_flight(&mut self) -> Option<String> {
        self.in_flight.take()
    }

    /// Enter `Failed`, revoking every handle produced so far
    ///
    /// Returns how many segment handles were released.
    pub fn fail(&mut self, reason: impl Into<String>) -> usize {
        let reason = reason.into();
        let released = self.segments.len();
        for segment in self.segments.iter_mut() {
            segment.release();
        }
        self.segments.clear();
        if !self.phase.is_terminal() {
            self.phase = RunPhase::Failed {
                reason: reason.clone(),
            };
        }
        self.status = reason;
        released
    }

    /// Hand the finished segments to the caller
    pub fn into_segments(self) -> SplitResult<Vec<Segment>> {
        if self.phase == RunPhase::Done {
            Ok(self.segments)
        } else {
            Err(SplitError::InvalidTransition {
                from: self.phase.to_string(),
                to: "result".to_string(),
            })
        }
    }
}
