//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Cache Defaults
// =============================================================================

pub fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1000
}

pub fn default_cache_max_size() -> usize {
    1024
}

// =============================================================================
// Queue Defaults
// =============================================================================

pub fn default_queue_policy() -> String {
    "single".to_string()
}

// =============================================================================
// State Tracker Defaults
// =============================================================================

pub fn default_retry_delay_ms() -> u64 {
    3000
}
