//! Error handling module for SplitX

use thiserror::Error;

/// Main error type for SplitX operations
#[derive(Error, Debug)]
pub enum SplitError {
    /// Transcoding engine failed to initialize
    #[error("Failed to load transcoding engine: {message}")]
    EngineLoad { message: String },

    /// An operation needed the engine before it was loaded
    #[error("Transcoding engine is not loaded")]
    EngineNotLoaded,

    /// An engine command reported failure
    #[error("Engine command failed: {message}")]
    Engine { message: String },

    /// File missing from the engine's workspace
    #[error("File not found in engine workspace: {name}")]
    FileNotFound { name: String },

    /// Probe finished but yielded no usable duration
    #[error("Could not determine video duration from engine output")]
    ProbeUnusable,

    /// Planner produced nothing to extract
    #[error("No segments to extract (duration {duration:.2}s, segment length {segment_duration}s)")]
    NoSegments { duration: f64, segment_duration: f64 },

    /// A single segment extraction failed; the whole run is aborted
    #[error("Failed to extract segment {index}: {message}")]
    Extraction { index: usize, message: String },

    /// Best-effort cleanup failed (callers log and swallow this)
    #[error("Failed to delete {name}: {message}")]
    Cleanup { name: String, message: String },

    /// Run stopped through its cancel flag
    #[error("Split cancelled after {completed} segment(s)")]
    Cancelled { completed: usize },

    /// Run state machine was asked for an illegal transition
    #[error("Invalid run transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Archive writer error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SplitX operations
pub type SplitResult<T> = std::result::Result<T, SplitError>;

impl SplitError {
    /// Attribute an error raised while producing segment `index` to it
    pub fn in_segment(self, index: usize) -> Self {
        match self {
            SplitError::Extraction { .. } => self,
            SplitError::Engine { message } => SplitError::Extraction { index, message },
            other => SplitError::Extraction {
                index,
                message: other.to_string(),
            },
        }
    }
}
