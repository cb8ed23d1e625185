use crate::config::ActorConfig;
use appbridge_proto::{PowerLevels, event_types};

/// Per-actor behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorOptions {
    /// The identity is already registered; never call `register`.
    pub registered: bool,
    /// Skip power level checks except for `m.room.power_levels` itself.
    pub dont_check_power_level: bool,
    /// Never join rooms implicitly.
    pub dont_join: bool,
    /// Send presence updates; when false `set_presence` does nothing.
    pub enable_presence: bool,
}

impl Default for ActorOptions {
    fn default() -> Self {
        Self {
            registered: false,
            dont_check_power_level: false,
            dont_join: false,
            enable_presence: true,
        }
    }
}

impl From<&ActorConfig> for ActorOptions {
    fn from(config: &ActorConfig) -> Self {
        Self {
            dont_check_power_level: config.dont_check_power_level,
            enable_presence: config.enable_presence,
            ..Self::default()
        }
    }
}

/// What an action needs from the room's power levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    /// Sending an event of this type.
    Event { event_type: &'a str, is_state: bool },
    /// Inviting a user.
    Invite,
    /// Kicking a user.
    Kick,
    /// Banning or unbanning a user.
    Ban,
}

impl<'a> Requirement<'a> {
    /// A timeline event of `event_type`.
    pub fn message(event_type: &'a str) -> Self {
        Self::Event {
            event_type,
            is_state: false,
        }
    }

    /// A state event of `event_type`.
    pub fn state(event_type: &'a str) -> Self {
        Self::Event {
            event_type,
            is_state: true,
        }
    }

    /// The level `content` demands for this requirement.
    pub fn required_level(&self, content: &PowerLevels) -> i64 {
        match *self {
            Self::Event {
                event_type,
                is_state,
            } => content.required_for_event(event_type, is_state),
            Self::Invite => content.invite,
            Self::Kick => content.kick,
            Self::Ban => content.ban,
        }
    }

    /// True when the action edits the power levels themselves.
    pub fn is_power_levels(&self) -> bool {
        matches!(self, Self::Event { event_type, .. } if *event_type == event_types::POWER_LEVELS)
    }

    /// Name used in logs and errors.
    pub fn label(&self) -> &'a str {
        match *self {
            Self::Event { event_type, .. } => event_type,
            Self::Invite => "invite",
            Self::Kick => "kick",
            Self::Ban => "ban",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_requirements_use_dedicated_levels() {
        let content = PowerLevels {
            invite: 10,
            kick: 60,
            ban: 70,
            ..PowerLevels::default()
        };
        assert_eq!(Requirement::Invite.required_level(&content), 10);
        assert_eq!(Requirement::Kick.required_level(&content), 60);
        assert_eq!(Requirement::Ban.required_level(&content), 70);
    }

    #[test]
    fn event_requirements_split_on_state() {
        let content = PowerLevels::default();
        assert_eq!(Requirement::message("m.room.message").required_level(&content), 0);
        assert_eq!(Requirement::state("m.room.topic").required_level(&content), 50);
    }

    #[test]
    fn only_power_level_events_are_flagged() {
        assert!(Requirement::state(event_types::POWER_LEVELS).is_power_levels());
        assert!(!Requirement::state(event_types::NAME).is_power_levels());
        assert!(!Requirement::Kick.is_power_levels());
    }

    #[test]
    fn options_follow_config() {
        let config = ActorConfig {
            dont_check_power_level: true,
            enable_presence: false,
        };
        let options = ActorOptions::from(&config);
        assert!(options.dont_check_power_level);
        assert!(!options.enable_presence);
        assert!(!options.registered);
    }
}
