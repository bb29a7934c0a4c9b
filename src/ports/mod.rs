// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SplitResult;

/// Event reported by the transcoding engine while it works
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// One diagnostic line, exactly as the engine printed it
    Log(String),
    /// Position reached in the media timeline, in seconds
    Progress { time: f64 },
}

/// Callback the engine pushes its events into
pub type EngineEventSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Outcome of one engine command as the engine itself reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineExit {
    /// Process-style exit code, if the engine produced one
    pub code: Option<i32>,
}

impl EngineExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Port for the transcoding engine: an opaque command executor with a
/// private file workspace
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Initialize the engine; all later events are delivered to `events`
    async fn load(&self, events: EngineEventSink) -> SplitResult<()>;

    /// Write a file into the engine workspace
    async fn write_file(&self, name: &str, data: &[u8]) -> SplitResult<()>;

    /// Read a file from the engine workspace
    ///
    /// Returns `SplitError::FileNotFound` when the name is not resident.
    async fn read_file(&self, name: &str) -> SplitResult<Vec<u8>>;

    /// Delete a file from the engine workspace
    ///
    /// Returns `SplitError::FileNotFound` when the name is not resident.
    async fn delete_file(&self, name: &str) -> SplitResult<()>;

    /// Run one command; `Err` only when the command could not be run at all
    async fn exec(&self, argv: &[String]) -> SplitResult<EngineExit>;

    /// Release engine resources; a later `load` starts over
    async fn terminate(&self);
}

/// Port for transient handles attached to segment artifacts
///
/// A handle stands for something the host allocates per artifact (an
/// object URL, a staged file) that must be revoked exactly once.
pub trait HandleRegistry: Send + Sync {
    /// Allocate a handle for an artifact
    fn register(&self, name: &str, size: u64) -> u64;

    /// Revoke a previously allocated handle
    fn revoke(&self, id: u64);
}
