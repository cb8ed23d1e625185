//! State tracker configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::default_retry_delay_ms;

/// State tracker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// State event types to track. Empty tracks every type.
    #[serde(default)]
    pub event_types: Vec<String>,
    /// Delay between retries of a failed initial fetch, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            event_types: Vec::new(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl StateConfig {
    /// Retry delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The event type filter, `None` when every type is tracked.
    pub fn event_type_filter(&self) -> Option<Vec<String>> {
        if self.event_types.is_empty() {
            None
        } else {
            Some(self.event_types.clone())
        }
    }
}
