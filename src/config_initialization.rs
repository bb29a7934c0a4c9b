//! Configuration initialization and hierarchy management
//!
//! Values are layered with precedence CLI > environment > file > defaults.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use crate::adapters::toml_config::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::domain::rules::{clamp_segment_duration, DEFAULT_SEGMENT_DURATION};
use crate::error::{SplitError, SplitResult};
use crate::output::OverwritePolicy;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Default archive file name
pub const DEFAULT_ARCHIVE_NAME: &str = "video_segments.zip";

/// Effective configuration of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterConfig {
    /// `None` looks `ffmpeg` up on `PATH`
    pub ffmpeg_path: Option<PathBuf>,
    /// Seconds, always within the allowed range
    pub segment_duration: u32,
    pub output_dir: PathBuf,
    pub write_segments: bool,
    pub archive: bool,
    pub archive_name: String,
    pub overwrite: OverwritePolicy,
    pub logging: LoggingConfig,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            segment_duration: DEFAULT_SEGMENT_DURATION,
            output_dir: PathBuf::from("."),
            write_segments: true,
            archive: false,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            overwrite: OverwritePolicy::Always,
            logging: LoggingConfig::default(),
        }
    }
}

/// One configuration layer; unset keys leave lower layers in place
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub segment_duration: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub write_segments: Option<bool>,
    pub archive: Option<bool>,
    pub archive_name: Option<String>,
    pub overwrite: Option<OverwritePolicy>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
}

impl PartialConfig {
    /// Number of keys this layer sets
    pub fn len(&self) -> usize {
        [
            self.ffmpeg_path.is_some(),
            self.segment_duration.is_some(),
            self.output_dir.is_some(),
            self.write_segments.is_some(),
            self.archive.is_some(),
            self.archive_name.is_some(),
            self.overwrite.is_some(),
            self.log_level.is_some(),
            self.log_format.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SplitterConfig {
    /// Overlay `layer`; the segment duration is clamped into range
    pub fn apply(&mut self, layer: PartialConfig) {
        if let Some(path) = layer.ffmpeg_path {
            self.ffmpeg_path = Some(path);
        }
        if let Some(seconds) = layer.segment_duration {
            self.segment_duration = clamp_segment_duration(seconds);
        }
        if let Some(dir) = layer.output_dir {
            self.output_dir = dir;
        }
        if let Some(write) = layer.write_segments {
            self.write_segments = write;
        }
        if let Some(archive) = layer.archive {
            self.archive = archive;
        }
        if let Some(name) = layer.archive_name {
            self.archive_name = name;
        }
        if let Some(policy) = layer.overwrite {
            self.overwrite = policy;
        }
        if let Some(level) = layer.log_level {
            self.logging.level = level;
        }
        if let Some(format) = layer.log_format {
            self.logging.format = format;
        }
    }
}

impl SplitterConfig {
    /// A split must deliver segment files, an archive or both
    pub fn ensure_deliverable(&self) -> SplitResult<()> {
        if !self.write_segments && !self.archive {
            return Err(SplitError::Config {
                message: "nothing to deliver: segment files are disabled and no archive was requested"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Effective configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SplitterConfig,
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

/// Resolve the configuration hierarchy for `cli`
pub fn initialize_configuration_hierarchy(cli: &Cli) -> SplitResult<LoadedConfig> {
    let mut config = SplitterConfig::default();

    let file = match TomlConfigAdapter::discover(cli.config.as_deref())? {
        Some((path, layer)) => {
            config.apply(layer);
            Some(path)
        }
        None => None,
    };

    let env = environment_layer(|key| std::env::var(key).ok())?;
    let env_overrides = env.len();
    config.apply(env);

    let overrides = cli_layer(cli);
    let cli_overrides = overrides.len();
    config.apply(overrides);

    validate(&config)?;
    Ok(LoadedConfig {
        config,
        file,
        env_overrides,
        cli_overrides,
    })
}

/// Read the `SPLITX_*` variables through `lookup`
pub fn environment_layer<F>(lookup: F) -> SplitResult<PartialConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    Ok(PartialConfig {
        ffmpeg_path: get("SPLITX_FFMPEG_PATH").map(PathBuf::from),
        segment_duration: get("SPLITX_SEGMENT_DURATION")
            .map(|v| parse_env("SPLITX_SEGMENT_DURATION", &v, |s| s.trim().parse::<u32>().ok()))
            .transpose()?,
        output_dir: get("SPLITX_OUTPUT_DIR").map(PathBuf::from),
        write_segments: get("SPLITX_WRITE_SEGMENTS")
            .map(|v| parse_env("SPLITX_WRITE_SEGMENTS", &v, parse_bool))
            .transpose()?,
        archive: get("SPLITX_ARCHIVE")
            .map(|v| parse_env("SPLITX_ARCHIVE", &v, parse_bool))
            .transpose()?,
        archive_name: get("SPLITX_ARCHIVE_NAME"),
        overwrite: get("SPLITX_OVERWRITE")
            .map(|v| {
                parse_env("SPLITX_OVERWRITE", &v, |s| {
                    OverwritePolicy::from_str(s.trim(), true).ok()
                })
            })
            .transpose()?,
        log_level: get("SPLITX_LOG_LEVEL")
            .map(|v| parse_env("SPLITX_LOG_LEVEL", &v, |s| LogLevel::from_str(s.trim(), true).ok()))
            .transpose()?,
        log_format: get("SPLITX_LOG_FORMAT")
            .map(|v| {
                parse_env("SPLITX_LOG_FORMAT", &v, |s| LogFormat::from_str(s.trim(), true).ok())
            })
            .transpose()?,
    })
}

/// Values given explicitly on the command line
pub fn cli_layer(cli: &Cli) -> PartialConfig {
    let mut layer = PartialConfig {
        ffmpeg_path: cli.ffmpeg.clone(),
        log_level: cli.log_level,
        log_format: cli.log_format,
        ..PartialConfig::default()
    };

    if let Commands::Split(args) = &cli.command {
        layer.segment_duration = args.segment_duration;
        layer.output_dir = args.output_dir.clone();
        layer.archive_name = args.archive_name.clone();
        layer.overwrite = args.overwrite;
        if args.zip {
            layer.archive = Some(true);
        }
        if args.no_files {
            layer.write_segments = Some(false);
        }
    }
    layer
}

fn parse_env<T>(key: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> SplitResult<T> {
    parse(value).ok_or_else(|| SplitError::Config {
        message: format!("invalid value for {}: {:?}", key, value),
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validate(config: &SplitterConfig) -> SplitResult<()> {
    let name = config.archive_name.trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(SplitError::Config {
            message: format!("archive_name must be a plain file name, got {:?}", config.archive_name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SplitterConfig::default();
        assert_eq!(config.segment_duration, 60);
        assert_eq!(config.archive_name, "video_segments.zip");
        assert!(config.write_segments);
        assert!(!config.archive);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_environment_layer() {
        let layer = environment_layer(env(&[
            ("SPLITX_SEGMENT_DURATION", "45"),
            ("SPLITX_ARCHIVE", "yes"),
            ("SPLITX_OVERWRITE", "Never"),
            ("SPLITX_LOG_FORMAT", "compact"),
            ("SPLITX_OUTPUT_DIR", ""),
        ]))
        .unwrap();
        assert_eq!(layer.segment_duration, Some(45));
        assert_eq!(layer.archive, Some(true));
        assert_eq!(layer.overwrite, Some(OverwritePolicy::Never));
        assert_eq!(layer.log_format, Some(LogFormat::Compact));
        assert_eq!(layer.output_dir, None);
        assert_eq!(layer.len(), 4);
    }

    #[test]
    fn test_environment_rejects_garbage() {
        let result = environment_layer(env(&[("SPLITX_SEGMENT_DURATION", "soon")]));
        assert!(matches!(result, Err(SplitError::Config { .. })));
    }

    #[test]
    fn test_layers_apply_in_order_and_clamp() {
        let mut config = SplitterConfig::default();
        config.apply(PartialConfig {
            segment_duration: Some(1000),
            archive_name: Some("file.zip".to_string()),
            ..PartialConfig::default()
        });
        assert_eq!(config.segment_duration, 300);

        config.apply(PartialConfig {
            segment_duration: Some(1),
            ..PartialConfig::default()
        });
        assert_eq!(config.segment_duration, 5);
        assert_eq!(config.archive_name, "file.zip");
    }

    #[test]
    fn test_cli_layer_from_split_args() {
        let cli = Cli::try_parse_from([
            "splitter",
            "--log-level",
            "debug",
            "split",
            "-i",
            "clip.mp4",
            "-d",
            "30",
            "--zip",
            "--no-files",
        ])
        .unwrap();
        let layer = cli_layer(&cli);
        assert_eq!(layer.segment_duration, Some(30));
        assert_eq!(layer.archive, Some(true));
        assert_eq!(layer.write_segments, Some(false));
        assert_eq!(layer.log_level, Some(LogLevel::Debug));
        assert_eq!(layer.overwrite, None);
    }

    #[test]
    fn test_archive_name_must_be_plain() {
        let mut config = SplitterConfig::default();
        config.archive_name = "../escape.zip".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_nothing_to_deliver_is_rejected() {
        let mut config = SplitterConfig::default();
        config.write_segments = false;
        assert!(config.ensure_deliverable().is_err());
        config.archive = true;
        assert!(config.ensure_deliverable().is_ok());
    }
}
