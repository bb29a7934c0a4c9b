//! SplitX Video Splitter Library
//!
//! Splits a video into fixed-length segments by driving a transcoding
//! engine through lossless stream-copy extractions, and packs the results
//! into a zip archive.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{Segment, SegmentPlanEntry, SourceVideo, VideoMetadata};
pub use engine::progress::{ProgressObserver, SplitEvent};
pub use error::{SplitError, SplitResult};
