/*!
 * Config Loader
 * Reads JSON or TOML documents, chosen by file extension
 */

use super::model::SimulationConfig;
use crate::core::errors::ConfigError;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Parse and validate a document in this format
    pub fn parse(&self, source: &str) -> Result<SimulationConfig, ConfigError> {
        let config: SimulationConfig = match self {
            Self::Json => serde_json::from_str(source).map_err(|e| ConfigError::Parse {
                format: self.as_str().to_string(),
                message: e.to_string(),
            })?,
            Self::Toml => toml::from_str(source).map_err(|e| ConfigError::Parse {
                format: self.as_str().to_string(),
                message: e.to_string(),
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Load and validate a simulation document from disk
pub fn load(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    debug!(path = %path.display(), format = format.as_str(), "loading config");

    let source = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = format.parse(&source)?;

    info!(
        path = %path.display(),
        processes = config.processes.len(),
        events = config.simulation.events.len(),
        "config loaded"
    );
    Ok(config)
}
