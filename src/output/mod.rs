//! Archive packaging and delivery of split results

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod archive;
pub mod writer;

pub use archive::pack;
pub use writer::{OutputWriter, WriteOutcome};

/// Overwrite policy for delivered files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Always overwrite
    #[default]
    Always,
    /// Never overwrite
    Never,
}
