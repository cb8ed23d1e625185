//! Event ordering configuration.

use serde::Deserialize;

use super::defaults::default_queue_policy;
use crate::error::ValidationError;
use crate::queue::OrderingPolicy;

/// Event ordering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Ordering policy: "none", "single" or "per_room".
    #[serde(default = "default_queue_policy")]
    pub policy: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            policy: default_queue_policy(),
        }
    }
}

impl QueueConfig {
    /// Parse the configured policy.
    pub fn policy(&self) -> Result<OrderingPolicy, ValidationError> {
        self.policy.parse()
    }
}
