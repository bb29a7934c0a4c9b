// Split interactor - Drives one segmentation run from source to segments

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::cancel::CancelFlag;
use crate::domain::model::{
    RunPhase, RunState, Segment, SegmentPlanEntry, SourceVideo, VideoMetadata,
};
use crate::domain::rules::{engine_input_name, engine_output_name, segment_file_name};
use crate::engine::commands::ExtractCommand;
use crate::engine::progress::{ProgressObserver, SplitEvent};
use crate::engine::EngineAdapter;
use crate::error::{SplitError, SplitResult};
use crate::planner;
use crate::ports::HandleRegistry;
use crate::probe::{MetadataProber, MetadataValidator};

/// Input of one split run
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub source: SourceVideo,
    /// Requested seconds per segment
    pub segment_duration: f64,
    pub cancel: Option<CancelFlag>,
}

impl SplitRequest {
    pub fn new(source: SourceVideo, segment_duration: f64) -> Self {
        Self {
            source,
            segment_duration,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }
}

/// Result of a successful run; the caller owns the segments
#[derive(Debug)]
pub struct SplitOutcome {
    pub metadata: VideoMetadata,
    pub segments: Vec<Segment>,
}

/// Orchestrates probing, planning and stream-copy extraction
pub struct SplitInteractor {
    engine: Arc<EngineAdapter>,
    prober: MetadataProber,
    handles: Arc<dyn HandleRegistry>,
    observer: Arc<dyn ProgressObserver>,
}

impl SplitInteractor {
    pub fn new(
        engine: Arc<EngineAdapter>,
        handles: Arc<dyn HandleRegistry>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            prober: MetadataProber::new(Arc::clone(&engine)),
            engine,
            handles,
            observer,
        }
    }

    /// Probe the source, plan it and extract every segment
    ///
    /// Either every planned segment comes back or the run fails as a whole:
    /// on failure all engine-side files of the run are deleted, the handles
    /// of segments produced so far are revoked and an `error` event is the
    /// last event emitted. Runs sharing the engine are serialized.
    pub async fn split(&self, request: &SplitRequest) -> SplitResult<SplitOutcome> {
        let _reserved = self.engine.reserve().await;
        let input_name = engine_input_name(&request.source.extension());
        let mut run = RunState::new();

        let result = match self.engine.load(self.observer.as_ref()).await {
            Ok(()) => self.drive(request, &input_name, &mut run).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(metadata) => {
                let segments = run.into_segments()?;
                info!(
                    source = request.source.name(),
                    segments = segments.len(),
                    "Split completed"
                );
                Ok(SplitOutcome { metadata, segments })
            }
            Err(e) => {
                self.abort(&mut run, &input_name, &e).await;
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        request: &SplitRequest,
        input_name: &str,
        run: &mut RunState,
    ) -> SplitResult<VideoMetadata> {
        let source = &request.source;
        let extension = source.extension();

        run.advance(RunPhase::LoadingSource)?;
        self.status(run, "Loading video into memory...");
        self.engine.write_file(input_name, source.data()).await?;
        debug!(input_name, bytes = source.size(), "Source resident");

        run.advance(RunPhase::Probing)?;
        self.status(run, "Analyzing video...");
        let metadata = self.prober.probe(input_name).await?;
        MetadataValidator::validate(&metadata)?;

        run.advance(RunPhase::Planning)?;
        let entries = planner::plan(metadata.duration, request.segment_duration);
        if entries.is_empty() {
            return Err(SplitError::NoSegments {
                duration: metadata.duration,
                segment_duration: request.segment_duration,
            });
        }
        let total = entries.len();
        run.set_total(total);
        self.status(run, format!("Splitting video into {} segments...", total));

        for entry in &entries {
            if request.is_cancelled() {
                return Err(SplitError::Cancelled {
                    completed: run.segments().len(),
                });
            }
            run.advance(RunPhase::Extracting { index: entry.index })?;
            let segment = self
                .extract(source, input_name, &extension, entry, total, run)
                .await
                .map_err(|e| e.in_segment(entry.index))?;
            run.push_segment(segment);
            self.emit(
                run,
                SplitEvent::SegmentComplete {
                    current: entry.index,
                    total,
                    message: format!("Completed segment {} of {}", entry.index, total),
                },
            );
        }

        run.advance(RunPhase::Finalizing)?;
        self.status(run, "Finalizing...");
        self.engine.discard(input_name).await;
        run.advance(RunPhase::Done)?;
        self.emit(
            run,
            SplitEvent::Complete {
                total_segments: total,
                message: "All segments processed successfully!".to_string(),
            },
        );
        Ok(metadata)
    }

    async fn extract(
        &self,
        source: &SourceVideo,
        input_name: &str,
        extension: &str,
        entry: &SegmentPlanEntry,
        total: usize,
        run: &mut RunState,
    ) -> SplitResult<Segment> {
        let index = entry.index;
        self.emit(
            run,
            SplitEvent::SegmentStart {
                current: index,
                total,
                message: format!("Processing segment {} of {}...", index, total),
            },
        );

        let output_name = engine_output_name(index, extension);
        run.set_in_flight(output_name.clone());

        let command = ExtractCommand {
            input: input_name.to_string(),
            output: output_name.clone(),
            start: entry.start_offset,
            length: entry.length,
        };
        self.engine.exec(&command.to_args()).await?;

        let data = self.engine.read_file(&output_name).await?;
        self.engine.discard(&output_name).await;
        run.clear_in_flight();

        debug!(index, bytes = data.len(), start = entry.start_offset, "Segment extracted");
        Ok(Segment::new(
            segment_file_name(source.base_name(), index, extension),
            index,
            source.mime_type(),
            data,
            Arc::clone(&self.handles),
        ))
    }

    /// Failure path: delete the run's engine files, revoke its handles and
    /// report the error
    async fn abort(&self, run: &mut RunState, input_name: &str, error: &SplitError) {
        if self.engine.is_loaded().await {
            if let Some(output_name) = run.take_in_flight() {
                self.engine.discard(&output_name).await;
            }
            self.engine.discard(input_name).await;
        }

        let message = error.to_string();
        let released = run.fail(message.clone());
        warn!(phase = %run.phase(), released, "Split failed: {}", message);
        self.observer.on_event(&SplitEvent::Error { message });
    }

    fn status(&self, run: &mut RunState, message: impl Into<String>) {
        self.emit(
            run,
            SplitEvent::Status {
                message: message.into(),
            },
        );
    }

    fn emit(&self, run: &mut RunState, event: SplitEvent) {
        run.set_status(event.message());
        self.observer.on_event(&event);
    }
}
