//! Power level content (`m.room.power_levels`).
//!
//! Missing fields take the protocol defaults: users and timeline events
//! default to level 0, state events and moderation actions to 50.

use crate::event::event_types;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_fifty() -> i64 {
    50
}

/// The content of an `m.room.power_levels` state event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerLevels {
    /// Explicit per-user levels.
    #[serde(default)]
    pub users: BTreeMap<String, i64>,
    /// Level of users not listed in `users`.
    #[serde(default)]
    pub users_default: i64,
    /// Explicit per-event-type required levels.
    #[serde(default)]
    pub events: BTreeMap<String, i64>,
    /// Required level for timeline events without an override.
    #[serde(default)]
    pub events_default: i64,
    /// Required level for state events without an override.
    #[serde(default = "default_fifty")]
    pub state_default: i64,
    /// Required level to invite.
    #[serde(default)]
    pub invite: i64,
    /// Required level to kick.
    #[serde(default = "default_fifty")]
    pub kick: i64,
    /// Required level to ban or unban.
    #[serde(default = "default_fifty")]
    pub ban: i64,
    /// Required level to redact other users' events.
    #[serde(default = "default_fifty")]
    pub redact: i64,
}

impl Default for PowerLevels {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            users_default: 0,
            events: BTreeMap::new(),
            events_default: 0,
            state_default: 50,
            invite: 0,
            kick: 50,
            ban: 50,
            redact: 50,
        }
    }
}

impl PowerLevels {
    /// The effective level of `user_id`.
    pub fn user_level(&self, user_id: &str) -> i64 {
        self.users
            .get(user_id)
            .copied()
            .unwrap_or(self.users_default)
    }

    /// The level required to send `event_type`.
    ///
    /// An explicit entry in `events` wins; otherwise state events use
    /// `state_default` and timeline events use `events_default`.
    pub fn required_for_event(&self, event_type: &str, is_state: bool) -> i64 {
        if let Some(level) = self.events.get(event_type) {
            return *level;
        }
        if is_state {
            self.state_default
        } else {
            self.events_default
        }
    }

    /// The level required to change this content.
    pub fn required_to_edit(&self) -> i64 {
        self.required_for_event(event_types::POWER_LEVELS, true)
    }

    /// True if `user_id` can send `event_type`.
    pub fn can_send(&self, user_id: &str, event_type: &str, is_state: bool) -> bool {
        self.user_level(user_id) >= self.required_for_event(event_type, is_state)
    }

    /// Set the explicit level of `user_id`.
    pub fn set_user_level(&mut self, user_id: impl Into<String>, level: i64) {
        self.users.insert(user_id.into(), level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PowerLevels {
        serde_json::from_value(json!({
            "users": {"@admin:hs": 100, "@mod:hs": 50},
            "users_default": 0,
            "events": {"m.room.name": 75, "m.reaction": 10},
            "events_default": 0,
            "state_default": 50
        }))
        .unwrap()
    }

    #[test]
    fn missing_fields_use_protocol_defaults() {
        let pl: PowerLevels = serde_json::from_value(json!({})).unwrap();
        assert_eq!(pl, PowerLevels::default());
        assert_eq!(pl.kick, 50);
        assert_eq!(pl.invite, 0);
    }

    #[test]
    fn user_level_falls_back_to_users_default() {
        let pl = sample();
        assert_eq!(pl.user_level("@admin:hs"), 100);
        assert_eq!(pl.user_level("@nobody:hs"), 0);
    }

    #[test]
    fn overrides_win_over_thresholds() {
        let pl = sample();
        assert_eq!(pl.required_for_event("m.room.name", true), 75);
        assert_eq!(pl.required_for_event("m.reaction", false), 10);
        assert_eq!(pl.required_for_event("m.room.topic", true), 50);
        assert_eq!(pl.required_for_event("m.room.message", false), 0);
    }

    #[test]
    fn set_user_level_allows_send() {
        let mut pl = sample();
        assert!(!pl.can_send("@puppet:hs", "m.room.topic", true));
        pl.set_user_level("@puppet:hs", 50);
        assert!(pl.can_send("@puppet:hs", "m.room.topic", true));
    }
}
