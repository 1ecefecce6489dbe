//! Session configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for one game session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// WebSocket endpoint of the game process
    pub endpoint: String,

    /// How long to wait for a reply before failing a command
    #[serde(with = "duration_secs")]
    pub command_timeout: Duration,

    /// Interval between keep-alive pings while connected
    #[serde(with = "duration_secs")]
    pub keepalive_interval: Duration,

    /// Fixed delay between reconnect attempts after a drop.
    ///
    /// Deliberately not a backoff: the game is a long-lived local companion
    /// process, so retry cost is not a concern.
    #[serde(with = "duration_secs")]
    pub reconnect_delay: Duration,

    /// Bound on each individual connect attempt
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8765/game".to_string(),
            command_timeout: Duration::from_secs(15),
            keepalive_interval: Duration::from_secs(15),
            reconnect_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Create a config for the given endpoint with default timings
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: SessionConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(path: &Path, config: &SessionConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Helper module for Duration serialization as seconds
///
/// Serializes `std::time::Duration` as a u64 of seconds, which is more
/// readable in TOML configuration files.
pub mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a Duration from seconds (u64)
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
