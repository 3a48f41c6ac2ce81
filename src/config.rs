use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::launcher::RendererConfig;
use crate::osc::OscEndpoint;

pub const APP_QUALIFIER: &str = "com";
pub const APP_ORG: &str = "videoeffects";
pub const APP_NAME: &str = "VideoEffectsController";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Invalid config in {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// Application settings (read-only; the app never writes this file)
///
/// Every field falls back to its default when missing, so a config
/// file only needs the keys the user wants to change, e.g.
/// `{ "osc": { "port": 12001 } }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Renderer's OSC endpoint
    pub osc: OscEndpoint,

    /// How the launcher finds and starts the renderer
    pub renderer: RendererConfig,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            osc: OscEndpoint::default(),
            renderer: RendererConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// `<platform config dir>/config.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location. A missing file means defaults;
    /// an unreadable or broken one is reported and also means defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                // Logging isn't up yet at this point
                eprintln!("[Config] {} - using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
