//! Progress events and observer plumbing for split runs

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::ports::EngineEvent;

/// Event emitted to observers while a run progresses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitEvent {
    /// Phase change or other status line
    Status { message: String },
    /// Extraction of segment `current` of `total` is starting
    SegmentStart {
        current: usize,
        total: usize,
        message: String,
    },
    /// Segment `current` of `total` has been extracted
    SegmentComplete {
        current: usize,
        total: usize,
        message: String,
    },
    /// Run finished; carries the final segment count
    Complete {
        total_segments: usize,
        message: String,
    },
    /// Informational engine output
    Log { message: String },
    /// Run failed; always the last event of a failed run
    Error { message: String },
}

impl SplitEvent {
    /// Short tag naming the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            SplitEvent::Status { .. } => "status",
            SplitEvent::SegmentStart { .. } => "segment_start",
            SplitEvent::SegmentComplete { .. } => "segment_complete",
            SplitEvent::Complete { .. } => "complete",
            SplitEvent::Log { .. } => "log",
            SplitEvent::Error { .. } => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SplitEvent::Status { message }
            | SplitEvent::SegmentStart { message, .. }
            | SplitEvent::SegmentComplete { message, .. }
            | SplitEvent::Complete { message, .. }
            | SplitEvent::Log { message }
            | SplitEvent::Error { message } => message,
        }
    }
}

/// Subscriber for run events
///
/// Events arrive synchronously, in the order the run emits them.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &SplitEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&SplitEvent) + Send + Sync,
{
    fn on_event(&self, event: &SplitEvent) {
        self(event)
    }
}

/// Subscriber for raw engine events
pub trait EngineObserver: Send + Sync {
    fn on_engine_event(&self, event: &EngineEvent);
}

/// Observer that drops every event
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_event(&self, _event: &SplitEvent) {}
}

impl EngineObserver for NullObserver {
    fn on_engine_event(&self, _event: &EngineEvent) {}
}

/// Delivers each event to several observers in registration order
#[derive(Default)]
pub struct ObserverFanout {
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl ObserverFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl ProgressObserver for ObserverFanout {
    fn on_event(&self, event: &SplitEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Engine observer that keeps every log line it sees
#[derive(Default)]
pub struct LogCollector {
    lines: Mutex<Vec<String>>,
}

impl LogCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected lines
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl EngineObserver for LogCollector {
    fn on_engine_event(&self, event: &EngineEvent) {
        if let EngineEvent::Log(line) = event {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(line.clone());
            }
        }
    }
}

/// Forwards engine log lines into a run's event stream as `log` events
pub struct EngineLogForwarder {
    sink: Arc<dyn ProgressObserver>,
}

impl EngineLogForwarder {
    pub fn new(sink: Arc<dyn ProgressObserver>) -> Self {
        Self { sink }
    }
}

impl EngineObserver for EngineLogForwarder {
    fn on_engine_event(&self, event: &EngineEvent) {
        if let EngineEvent::Log(line) = event {
            self.sink.on_event(&SplitEvent::Log {
                message: line.clone(),
            });
        }
    }
}

/// Prints each event as one JSON object per line on stdout
pub struct JsonEventPrinter;

impl ProgressObserver for JsonEventPrinter {
    fn on_event(&self, event: &SplitEvent) {
        if let SplitEvent::Log { .. } = event {
            return;
        }
        let line = serde_json::json!({
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = SplitEvent::SegmentStart {
            current: 2,
            total: 3,
            message: "Processing segment 2 of 3...".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "segment_start");
        assert_eq!(value["current"], 2);
        assert_eq!(value["total"], 3);
        assert_eq!(event.kind(), "segment_start");
    }

    #[test]
    fn test_fanout_preserves_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = seen.clone();
        let second = seen.clone();
        let fanout = ObserverFanout::new()
            .with(Arc::new(move |e: &SplitEvent| {
                first.lock().unwrap().push(format!("a:{}", e.kind()))
            }))
            .with(Arc::new(move |e: &SplitEvent| {
                second.lock().unwrap().push(format!("b:{}", e.kind()))
            }));

        fanout.on_event(&SplitEvent::Status {
            message: "x".into(),
        });
        assert_eq!(*seen.lock().unwrap(), vec!["a:status", "b:status"]);
    }

    #[test]
    fn test_log_collector_ignores_progress() {
        let collector = LogCollector::new();
        collector.on_engine_event(&EngineEvent::Log("Duration: 00:00:01.00".into()));
        collector.on_engine_event(&EngineEvent::Progress { time: 1.0 });
        assert_eq!(collector.lines(), vec!["Duration: 00:00:01.00"]);
    }
}
