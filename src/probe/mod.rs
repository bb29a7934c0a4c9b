//! Media metadata probing
//!
//! Metadata is recovered from the engine's diagnostic text rather than from
//! a structured API: a near-empty null-sink pass makes the engine print its
//! container and stream summary, which [`parser`] then reads.

pub mod inspector;
pub mod parser;
pub mod validator;

pub use inspector::MetadataProber;
pub use parser::parse_probe_log;
pub use validator::MetadataValidator;
