//! Engine adapter
//!
//! Synchronous-looking facade over a [`TranscodeEngine`]: load lifecycle,
//! command execution with complete log capture, workspace file access with
//! best-effort deletes, and a single engine-observer slot that can only be
//! swapped through a scoped guard.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::engine::progress::{EngineObserver, ProgressObserver, SplitEvent};
use crate::error::{SplitError, SplitResult};
use crate::ports::{EngineEvent, EngineEventSink, TranscodeEngine};

pub mod commands;
pub mod progress;

/// Everything an engine command produced, whatever its outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecReport {
    /// Every log line emitted while the command ran
    pub logs: Vec<String>,
    /// The engine itself considered the command failed
    pub engine_reported_failure: bool,
    pub exit_code: Option<i32>,
}

impl ExecReport {
    /// Best single-line explanation of a failed command
    pub fn failure_summary(&self) -> String {
        self.logs
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| match self.exit_code {
                Some(code) => format!("engine exited with code {}", code),
                None => "engine terminated without an exit code".to_string(),
            })
    }
}

/// Routes engine events to the transcript of the running command and to
/// the currently installed observer
struct EventBus {
    observer: Mutex<Option<Arc<dyn EngineObserver>>>,
    transcript: Mutex<Option<Vec<String>>>,
}

impl EventBus {
    fn new(observer: Option<Arc<dyn EngineObserver>>) -> Self {
        Self {
            observer: Mutex::new(observer),
            transcript: Mutex::new(None),
        }
    }

    fn dispatch(&self, event: EngineEvent) {
        match &event {
            EngineEvent::Log(line) => {
                tracing::trace!(target: "splitx::engine", "{}", line);
                if let Ok(mut transcript) = self.transcript.lock() {
                    if let Some(lines) = transcript.as_mut() {
                        lines.push(line.clone());
                    }
                }
            }
            EngineEvent::Progress { time } => {
                tracing::trace!(target: "splitx::engine", time, "Engine progress");
            }
        }

        // Call outside the lock so observers may touch the slot
        let observer = self.observer.lock().ok().and_then(|slot| slot.clone());
        if let Some(observer) = observer {
            observer.on_engine_event(&event);
        }
    }

    fn swap(&self, next: Option<Arc<dyn EngineObserver>>) -> Option<Arc<dyn EngineObserver>> {
        match self.observer.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, next),
            Err(_) => None,
        }
    }

    fn begin_transcript(&self) {
        if let Ok(mut transcript) = self.transcript.lock() {
            *transcript = Some(Vec::new());
        }
    }

    fn end_transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .ok()
            .and_then(|mut transcript| transcript.take())
            .unwrap_or_default()
    }
}

/// Keeps a temporary engine observer installed; restores the previous one
/// when dropped, whichever way the scope is left
pub struct ObserverGuard<'a> {
    bus: &'a EventBus,
    previous: Option<Arc<dyn EngineObserver>>,
}

impl Drop for ObserverGuard<'_> {
    fn drop(&mut self) {
        self.bus.swap(self.previous.take());
    }
}

/// Exclusive use of the engine for one run, released on drop
pub type RunGuard<'a> = tokio::sync::MutexGuard<'a, ()>;

/// Facade over the transcoding engine
pub struct EngineAdapter {
    engine: Arc<dyn TranscodeEngine>,
    bus: Arc<EventBus>,
    loaded: tokio::sync::Mutex<bool>,
    run_lock: tokio::sync::Mutex<()>,
}

impl EngineAdapter {
    /// Wrap an engine with no engine observer installed
    pub fn new(engine: Arc<dyn TranscodeEngine>) -> Self {
        Self::build(engine, None)
    }

    /// Wrap an engine with `observer` as the standing engine observer
    pub fn with_observer(engine: Arc<dyn TranscodeEngine>, observer: Arc<dyn EngineObserver>) -> Self {
        Self::build(engine, Some(observer))
    }

    fn build(engine: Arc<dyn TranscodeEngine>, observer: Option<Arc<dyn EngineObserver>>) -> Self {
        Self {
            engine,
            bus: Arc::new(EventBus::new(observer)),
            loaded: tokio::sync::Mutex::new(false),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Wait for exclusive use of the engine
    ///
    /// The workspace, the observer slot and the log transcript are single
    /// slots, so a run holds this guard from its first engine call to the
    /// end of its cleanup. Not reentrant.
    pub async fn reserve(&self) -> RunGuard<'_> {
        let guard = self.run_lock.lock().await;
        debug!("Engine reserved");
        guard
    }

    /// Load the engine; a second call while loaded does nothing
    pub async fn load(&self, progress: &dyn ProgressObserver) -> SplitResult<()> {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            debug!("Transcoding engine already loaded");
            return Ok(());
        }

        progress.on_event(&SplitEvent::Status {
            message: "Loading FFmpeg core...".to_string(),
        });

        let bus = Arc::clone(&self.bus);
        let sink: EngineEventSink = Arc::new(move |event| bus.dispatch(event));
        self.engine.load(sink).await.map_err(|e| match e {
            SplitError::EngineLoad { .. } => e,
            other => SplitError::EngineLoad {
                message: other.to_string(),
            },
        })?;

        *loaded = true;
        info!("Transcoding engine loaded");
        Ok(())
    }

    pub async fn is_loaded(&self) -> bool {
        *self.loaded.lock().await
    }

    /// Shut the engine down; the next `load` initializes it again
    pub async fn terminate(&self) {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            self.engine.terminate().await;
            *loaded = false;
            info!("Transcoding engine terminated");
        }
    }

    async fn ensure_loaded(&self) -> SplitResult<()> {
        if self.is_loaded().await {
            Ok(())
        } else {
            Err(SplitError::EngineNotLoaded)
        }
    }

    /// Install `observer` until the returned guard is dropped
    pub fn install_observer(&self, observer: Arc<dyn EngineObserver>) -> ObserverGuard<'_> {
        let previous = self.bus.swap(Some(observer));
        ObserverGuard {
            bus: &*self.bus,
            previous,
        }
    }

    /// Run a command and report its logs and outcome
    ///
    /// A command the engine reports as failed is still `Ok` here; only a
    /// command that could not be run at all is an error.
    pub async fn run(&self, argv: &[String]) -> SplitResult<ExecReport> {
        self.ensure_loaded().await?;

        self.bus.begin_transcript();
        let outcome = self.engine.exec(argv).await;
        let logs = self.bus.end_transcript();

        let exit = outcome?;
        Ok(ExecReport {
            logs,
            engine_reported_failure: !exit.is_success(),
            exit_code: exit.code,
        })
    }

    /// Run a command that is expected to succeed
    pub async fn exec(&self, argv: &[String]) -> SplitResult<ExecReport> {
        let report = self.run(argv).await?;
        if report.engine_reported_failure {
            return Err(SplitError::Engine {
                message: report.failure_summary(),
            });
        }
        Ok(report)
    }

    pub async fn write_file(&self, name: &str, data: &[u8]) -> SplitResult<()> {
        self.ensure_loaded().await?;
        self.engine.write_file(name, data).await
    }

    pub async fn read_file(&self, name: &str) -> SplitResult<Vec<u8>> {
        self.ensure_loaded().await?;
        self.engine.read_file(name).await
    }

    /// Delete a workspace file; a missing file is not an error
    pub async fn delete_file(&self, name: &str) -> SplitResult<()> {
        self.ensure_loaded().await?;
        match self.engine.delete_file(name).await {
            Ok(()) | Err(SplitError::FileNotFound { .. }) => Ok(()),
            Err(e) => Err(SplitError::Cleanup {
                name: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Best-effort delete: failures are logged and swallowed
    pub async fn discard(&self, name: &str) {
        if let Err(e) = self.delete_file(name).await {
            warn!(name, error = %e, "Cleanup failed");
        }
    }
}
