//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Database file name inside the data directory
    pub database_file: String,
    /// Map settings
    pub map: MapSettings,
    /// Enrichment settings
    pub enrichment: EnrichmentSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database_file: "maptrail.db".to_string(),
            map: MapSettings::default(),
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the snapshot database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

/// Map-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Fallback latitude when no position can be acquired
    pub default_lat: f64,
    /// Fallback longitude when no position can be acquired
    pub default_lng: f64,
    /// Initial zoom level
    pub zoom_level: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_lat: 40.2033,
            default_lng: -8.4103,
            zoom_level: 13,
        }
    }
}

/// Enrichment-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSettings {
    /// Whether enrichment lookups run at workout creation
    pub enabled: bool,
    /// Lookup deadline in milliseconds
    pub timeout_ms: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 5000,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "maptrail", "MapTrail")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.database_file, "maptrail.db");
        assert_eq!(config.map.zoom_level, 13);
        assert!(!config.enrichment.enabled);
        assert_eq!(config.enrichment.timeout_ms, 5000);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = AppConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.database_file, config.database_file);
        assert_eq!(back.map.default_lat, config.map.default_lat);
    }
}
