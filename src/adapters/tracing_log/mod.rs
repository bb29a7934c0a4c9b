// Tracing log adapter - Mirrors run events into tracing

use tracing::{debug, error, info};

use crate::engine::progress::{ProgressObserver, SplitEvent};

/// Observer that writes run events to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressObserver for TracingLogAdapter {
    fn on_event(&self, event: &SplitEvent) {
        match event {
            SplitEvent::Status { message } => info!("{}", message),
            SplitEvent::SegmentStart {
                current,
                total,
                message,
            } => debug!(current, total, "{}", message),
            SplitEvent::SegmentComplete {
                current,
                total,
                message,
            } => info!(current, total, "{}", message),
            SplitEvent::Complete {
                total_segments,
                message,
            } => info!(total_segments, "{}", message),
            SplitEvent::Log { .. } => {}
            SplitEvent::Error { message } => error!("{}", message),
        }
    }
}
