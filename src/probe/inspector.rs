//! Metadata prober

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::model::VideoMetadata;
use crate::engine::commands::probe_args;
use crate::engine::progress::LogCollector;
use crate::engine::EngineAdapter;
use crate::error::SplitResult;
use crate::probe::parser::parse_probe_log;

/// Recovers duration, codec and resolution of a resident file
pub struct MetadataProber {
    engine: Arc<EngineAdapter>,
}

impl MetadataProber {
    pub fn new(engine: Arc<EngineAdapter>) -> Self {
        Self { engine }
    }

    /// Probe a file already resident in the engine workspace
    ///
    /// The probe command usually ends in an engine-reported failure; that
    /// outcome is ignored and only the captured log text is read. A missing
    /// duration comes back as `0.0`, not as an error.
    pub async fn probe(&self, resident_name: &str) -> SplitResult<VideoMetadata> {
        let collector = Arc::new(LogCollector::new());
        let report = {
            let _guard = self.engine.install_observer(collector.clone());
            self.engine.run(&probe_args(resident_name)).await?
        };

        if report.engine_reported_failure {
            debug!(
                resident_name,
                exit_code = ?report.exit_code,
                "Probe command reported failure; reading its log anyway"
            );
        }

        let lines = collector.lines();
        debug!(lines = lines.len(), "Probe log captured");
        let metadata = parse_probe_log(&lines[..]);
        info!(
            duration = metadata.duration,
            codec = %metadata.codec,
            resolution = %metadata.resolution,
            "Probed {}",
            resident_name
        );
        Ok(metadata)
    }
}
