//! Configuration validation.
//!
//! Validates configuration at load time to catch common errors early.

use super::BridgeConfig;
use crate::error::ValidationError;

/// Validate a configuration, returning all errors found.
pub fn validate(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.ttl_ms == 0 {
        errors.push(ValidationError::ZeroTtl);
    }
    if config.cache.max_size == 0 {
        errors.push(ValidationError::ZeroMaxSize);
    }

    if let Err(e) = config.queue.policy() {
        errors.push(e);
    }

    if config.state.retry_delay_ms == 0 {
        errors.push(ValidationError::ZeroRetryDelay);
    }
    if config.state.event_types.iter().any(|t| t.trim().is_empty()) {
        errors.push(ValidationError::EmptyEventType);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let toml = r#"
[cache]
ttl_ms = 0
max_size = 0

[queue]
policy = "fifo"

[state]
retry_delay_ms = 0
event_types = ["m.room.name", " "]
"#;
        let config: BridgeConfig = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTtl));
        assert!(errors.contains(&ValidationError::ZeroMaxSize));
        assert!(errors.contains(&ValidationError::UnknownPolicy("fifo".into())));
        assert!(errors.contains(&ValidationError::ZeroRetryDelay));
        assert!(errors.contains(&ValidationError::EmptyEventType));
    }
}
