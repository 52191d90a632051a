// src/system/display_config.rs

use crate::constants::DISPLAY_CONFIG_FILENAME;
use serde::{Deserialize, Serialize};
use std::{env, fs, io, path::Path, path::PathBuf};
use thiserror::Error;

/// Failure to load the display config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read display config at '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse display config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Presentation settings carried by the worker and honoured by the presenter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print the application header before dispatch.
    pub show_header: bool,
    /// Print the elapsed time and phase summary after dispatch.
    pub show_footer: bool,
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_header: true,
            show_footer: true,
            color: true,
        }
    }
}

impl DisplayConfig {
    /// Parses a config from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads `path` if it exists, defaults otherwise. `NO_COLOR` always wins over the file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&content)?
        } else {
            log::debug!("No display config at '{}', using defaults.", path.display());
            Self::default()
        };
        if env::var_os("NO_COLOR").is_some() {
            config.color = false;
        }
        Ok(config)
    }

    /// Loads `<config dir>/<app_name>/display.toml`.
    pub fn load(app_name: &str) -> Result<Self, ConfigError> {
        match config_path(app_name) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Location of the display config for `app_name`, if the platform has a config directory.
pub fn config_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app_name).join(DISPLAY_CONFIG_FILENAME))
}
