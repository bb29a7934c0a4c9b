// TOML config adapter - Reads the [splitx] table of a configuration file

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::config_initialization::PartialConfig;
use crate::error::{SplitError, SplitResult};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "splitx.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    splitx: PartialConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration text; a missing `[splitx]` table yields no values
    pub fn parse(content: &str) -> SplitResult<PartialConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| SplitError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })?;
        Ok(file.splitx)
    }

    pub fn load(path: &Path) -> SplitResult<PartialConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| SplitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Load `explicit` (which must exist), else the default file if present
    pub fn discover(explicit: Option<&Path>) -> SplitResult<Option<(PathBuf, PartialConfig)>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(SplitError::Config {
                    message: format!("Config file does not exist: {}", path.display()),
                });
            }
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }

        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            let config = Self::load(&fallback)?;
            return Ok(Some((fallback, config)));
        }
        Ok(None)
    }
}
