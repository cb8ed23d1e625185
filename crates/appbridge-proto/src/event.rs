//! Room events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known event types.
pub mod event_types {
    /// Membership state event.
    pub const MEMBER: &str = "m.room.member";
    /// Power level state event.
    pub const POWER_LEVELS: &str = "m.room.power_levels";
    /// Room name state event.
    pub const NAME: &str = "m.room.name";
    /// Room topic state event.
    pub const TOPIC: &str = "m.room.topic";
    /// Room avatar state event.
    pub const AVATAR: &str = "m.room.avatar";
    /// Timeline message event.
    pub const MESSAGE: &str = "m.room.message";
}

/// A room event, either timeline or state.
///
/// State events are the ones carrying a `state_key` (possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event id assigned by the service, absent for locally built events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Room the event belongs to.
    pub room_id: String,
    /// Sender user id.
    pub sender: String,
    /// Event type (e.g. `m.room.message`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// State key; `Some` marks a state event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    /// Event content.
    #[serde(default)]
    pub content: Value,
}

impl Event {
    /// Build a timeline event.
    pub fn message(
        room_id: impl Into<String>,
        sender: impl Into<String>,
        event_type: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            event_id: None,
            room_id: room_id.into(),
            sender: sender.into(),
            event_type: event_type.into(),
            state_key: None,
            content,
        }
    }

    /// Build a state event.
    pub fn state(
        room_id: impl Into<String>,
        sender: impl Into<String>,
        event_type: impl Into<String>,
        state_key: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            event_id: None,
            room_id: room_id.into(),
            sender: sender.into(),
            event_type: event_type.into(),
            state_key: Some(state_key.into()),
            content,
        }
    }

    /// Attach an event id.
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// True if this event carries a state key.
    pub fn is_state(&self) -> bool {
        self.state_key.is_some()
    }

    /// The `membership` field of an `m.room.member` event.
    pub fn membership(&self) -> Option<&str> {
        if self.event_type != event_types::MEMBER {
            return None;
        }
        self.content.get("membership").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_type_field() {
        let raw = json!({
            "event_id": "$1",
            "room_id": "!r:hs",
            "sender": "@a:hs",
            "type": "m.room.member",
            "state_key": "@a:hs",
            "content": {"membership": "join"}
        });
        let ev: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(ev.event_type, "m.room.member");
        assert!(ev.is_state());
        assert_eq!(ev.membership(), Some("join"));
    }

    #[test]
    fn timeline_event_has_no_membership() {
        let ev = Event::message("!r:hs", "@a:hs", "m.room.message", json!({"membership": "join"}));
        assert!(!ev.is_state());
        assert_eq!(ev.membership(), None);
    }
}
