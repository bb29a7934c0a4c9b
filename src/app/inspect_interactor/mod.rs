// Inspect interactor - Reports metadata of a single source video

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::model::{SourceVideo, VideoMetadata};
use crate::domain::rules::engine_probe_name;
use crate::engine::progress::ProgressObserver;
use crate::engine::EngineAdapter;
use crate::error::SplitResult;
use crate::probe::MetadataProber;

/// Metadata report for one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaReport {
    pub filename: String,
    /// Bytes
    pub size: u64,
    #[serde(flatten)]
    pub metadata: VideoMetadata,
}

/// Interactor for stand-alone metadata inspection
pub struct InspectInteractor {
    engine: Arc<EngineAdapter>,
    prober: MetadataProber,
    observer: Arc<dyn ProgressObserver>,
}

impl InspectInteractor {
    pub fn new(engine: Arc<EngineAdapter>, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            prober: MetadataProber::new(Arc::clone(&engine)),
            engine,
            observer,
        }
    }

    /// Copy `source` into the engine, probe it and delete the copy again
    ///
    /// The copy is deleted whether or not probing succeeds. An unusable
    /// duration is reported as `0`, not as an error.
    pub async fn inspect(&self, source: &SourceVideo) -> SplitResult<MediaReport> {
        let _reserved = self.engine.reserve().await;
        self.engine.load(self.observer.as_ref()).await?;

        let resident = engine_probe_name(&source.extension());
        let probed = match self.engine.write_file(&resident, source.data()).await {
            Ok(()) => self.prober.probe(&resident).await,
            Err(e) => Err(e),
        };
        self.engine.discard(&resident).await;

        let metadata = probed?;
        info!(filename = source.name(), duration = metadata.duration, "Inspection finished");
        Ok(MediaReport {
            filename: source.name().to_string(),
            size: source.size(),
            metadata,
        })
    }
}
