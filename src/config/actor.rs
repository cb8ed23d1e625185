//! Actor behaviour configuration.

use serde::Deserialize;

use super::defaults::default_true;

/// Defaults applied to every actor built from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    /// Skip power level checks for everything but `m.room.power_levels`.
    #[serde(default)]
    pub dont_check_power_level: bool,
    /// Send presence updates.
    #[serde(default = "default_true")]
    pub enable_presence: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            dont_check_power_level: false,
            enable_presence: true,
        }
    }
}
