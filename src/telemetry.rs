//! Telemetry utilities for action timing and tracing setup.

use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Guard for timing an actor action and recording metrics.
///
/// Records action latency when dropped.
pub struct ActionTimer {
    action: &'static str,
    start: Instant,
}

impl ActionTimer {
    /// Start timing an action.
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            start: Instant::now(),
        }
    }
}

impl Drop for ActionTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_action(self.action, duration);
    }
}

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// For binaries embedding the toolkit. Returns `false` if a global
/// subscriber was already installed.
pub fn init_subscriber() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Standardized span constructors for bridge observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for an actor action.
    pub fn action(name: &str, user_id: &str, room_id: Option<&str>) -> Span {
        if let Some(room_id) = room_id {
            info_span!("action", name = %name, user_id = %user_id, room_id = %room_id)
        } else {
            info_span!("action", name = %name, user_id = %user_id)
        }
    }

    /// Create a span for a state fetch.
    pub fn state_fetch(room_id: &str) -> Span {
        info_span!("state_fetch", room_id = %room_id)
    }

    /// Create a span for a queue drain loop.
    pub fn drain(partition: &str) -> Span {
        info_span!("drain", partition = %partition)
    }
}
