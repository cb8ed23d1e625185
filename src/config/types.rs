//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::actor::ActorConfig;
use super::cache::CacheConfig;
use super::queue::QueueConfig;
use super::state::StateConfig;
use super::validation::validate;
use crate::error::ValidationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Bridge core configuration.
///
/// Every section is optional; an empty document yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// Request cache sizing.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Inbound event ordering.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Room state tracking.
    #[serde(default)]
    pub state: StateConfig,
    /// Actor defaults.
    #[serde(default)]
    pub actor: ActorConfig,
}

impl BridgeConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}
