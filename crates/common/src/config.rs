//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lowest UDP port the remote listener may bind.
pub const MIN_REMOTE_PORT: u16 = 1024;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote-control listener settings.
    pub remote: RemoteDefaults,

    /// Face-tracker defaults.
    pub tracker: TrackerDefaults,

    /// Consumer tick interval in milliseconds.
    pub tick_interval_ms: u64,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default remote-control listener parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDefaults {
    /// UDP port to listen on (1024..=65535).
    pub port: u16,
}

/// Default face-tracker parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDefaults {
    /// Capture device index handed to the landmark source.
    pub camera_index: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "rigpad=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteDefaults::default(),
            tracker: TrackerDefaults::default(),
            tick_interval_ms: 50,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RemoteDefaults {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

impl Default for TrackerDefaults {
    fn default() -> Self {
        Self { camera_index: 0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Validate field ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.remote.port < MIN_REMOTE_PORT {
            return Err(format!(
                "remote port {} below minimum {}",
                self.remote.port, MIN_REMOTE_PORT
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick interval must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("rigpad").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.remote.port, 5000);
    }

    #[test]
    fn test_privileged_port_rejected() {
        let mut config = AppConfig::default();
        config.remote.port = 80;
        assert!(config.validate().is_err());
    }
}
