/// Runtime settings
///
/// Layered as: built-in defaults, then an optional TOML file in the user's
/// config directory, then environment variables.
/// - Linux: ~/.config/image-pipeline-viewer/config.toml
/// - macOS: ~/Library/Application Support/image-pipeline-viewer/config.toml
/// - Windows: %APPDATA%\image-pipeline-viewer\config.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Hugging Face Space hosting the preprocessing pipeline
pub const DEFAULT_ENDPOINT: &str = "Ashvitta/Image_preprocessing";
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";
pub const DEFAULT_API_NAME: &str = "/process_image";

pub const ENV_ENDPOINT: &str = "PIPELINE_VIEWER_ENDPOINT";
pub const ENV_HUB_URL: &str = "PIPELINE_VIEWER_HUB_URL";
pub const ENV_API_NAME: &str = "PIPELINE_VIEWER_API_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Space id (`owner/name`) or full URL of the Gradio app
    pub endpoint: String,
    /// Hub used to resolve Space ids to their host
    pub hub_url: String,
    /// Named endpoint that runs the pipeline
    pub api_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            api_name: DEFAULT_API_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from every layer. Never fails: bad layers are logged and skipped.
    pub fn load() -> Self {
        let mut settings = match config_path() {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(settings) => {
                    info!(path = %path.display(), "Loaded config file");
                    settings
                }
                Err(err) => {
                    warn!(%err, "Ignoring config file");
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Parse a TOML file. Keys it leaves out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.normalize();
        Ok(settings)
    }

    /// Override fields from the environment; blank values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_ENDPOINT) {
            self.endpoint = value;
        }
        if let Some(value) = read(ENV_HUB_URL) {
            self.hub_url = value;
        }
        if let Some(value) = read(ENV_API_NAME) {
            self.api_name = value;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let defaults = Settings::default();
        for (field, default) in [
            (&mut self.endpoint, defaults.endpoint),
            (&mut self.hub_url, defaults.hub_url),
            (&mut self.api_name, defaults.api_name),
        ] {
            let trimmed = field.trim();
            *field = if trimmed.is_empty() {
                default
            } else {
                trimmed.to_string()
            };
        }
        self.hub_url = self.hub_url.trim_end_matches('/').to_string();
    }
}

/// Where the optional config file lives
pub fn config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("image-pipeline-viewer");
    path.push("config.toml");
    Some(path)
}
