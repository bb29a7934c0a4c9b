use std::sync::Arc;

use crate::adapters::{FfmpegEngine, HandleTable};
use crate::app::{inspect_interactor::InspectInteractor, split_interactor::SplitInteractor};
use crate::engine::progress::{EngineLogForwarder, ProgressObserver};
use crate::engine::EngineAdapter;
use crate::ports::{HandleRegistry, TranscodeEngine};

pub trait AppContainer: Send + Sync {
    fn split_interactor(&self) -> Arc<SplitInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn engine(&self) -> Arc<EngineAdapter>;
}

pub struct DefaultAppContainer {
    engine: Arc<EngineAdapter>,
    handles: Arc<HandleTable>,
    split_interactor: Arc<SplitInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg engine; `observer` receives every run event and,
    /// as `log` events, every engine log line
    pub fn new(
        ffmpeg_path: Option<std::path::PathBuf>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self::with_engine(Arc::new(FfmpegEngine::new(ffmpeg_path)), observer)
    }

    /// Wire an arbitrary engine implementation
    pub fn with_engine(engine: Arc<dyn TranscodeEngine>, observer: Arc<dyn ProgressObserver>) -> Self {
        let engine = Arc::new(EngineAdapter::with_observer(
            engine,
            Arc::new(EngineLogForwarder::new(Arc::clone(&observer))),
        ));
        let handles = Arc::new(HandleTable::new());

        let split_interactor = Arc::new(SplitInteractor::new(
            Arc::clone(&engine),
            Arc::clone(&handles) as Arc<dyn HandleRegistry>,
            Arc::clone(&observer),
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(Arc::clone(&engine), observer));

        Self {
            engine,
            handles,
            split_interactor,
            inspect_interactor,
        }
    }

    /// Registry of live segment handles
    pub fn handles(&self) -> Arc<HandleTable> {
        Arc::clone(&self.handles)
    }
}

impl AppContainer for DefaultAppContainer {
    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn engine(&self) -> Arc<EngineAdapter> {
        Arc::clone(&self.engine)
    }
}
