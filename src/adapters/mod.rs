// Adapters - External system implementations

pub mod ffmpeg_engine;
pub mod handle_table;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use ffmpeg_engine::FfmpegEngine;
pub use handle_table::HandleTable;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
