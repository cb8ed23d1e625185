//! Timeline and state event sending.

use super::super::{Actor, Requirement};
use crate::error::ActorResult;
use appbridge_proto::event_types;
use serde_json::{Value, json};

impl Actor {
    /// Send a timeline event. Returns the event id.
    ///
    /// One transaction id is used for the original attempt and any retry,
    /// so the service can deduplicate.
    pub async fn send_event(&self, room_id: &str, event_type: &str, content: Value) -> ActorResult<String> {
        let txn_id = uuid::Uuid::new_v4().to_string();
        self.room_action(
            "send_event",
            room_id,
            Some(Requirement::message(event_type)),
            || self.client.send_event(room_id, event_type, &txn_id, &content),
        )
        .await
    }

    /// Send an `m.room.message` event.
    pub async fn send_message(&self, room_id: &str, content: Value) -> ActorResult<String> {
        self.send_event(room_id, event_types::MESSAGE, content).await
    }

    /// Send a plain text message.
    pub async fn send_text(&self, room_id: &str, text: &str) -> ActorResult<String> {
        self.send_message(room_id, json!({"msgtype": "m.text", "body": text}))
            .await
    }

    /// Send a notice.
    pub async fn send_notice(&self, room_id: &str, text: &str) -> ActorResult<String> {
        self.send_message(room_id, json!({"msgtype": "m.notice", "body": text}))
            .await
    }

    /// Send a state event. Returns the event id.
    pub async fn send_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
        content: Value,
    ) -> ActorResult<String> {
        self.room_action(
            "send_state_event",
            room_id,
            Some(Requirement::state(event_type)),
            || self.client.send_state_event(room_id, event_type, state_key, &content),
        )
        .await
    }

    pub async fn set_room_name(&self, room_id: &str, name: &str) -> ActorResult<String> {
        self.send_state_event(room_id, event_types::NAME, "", json!({"name": name}))
            .await
    }

    pub async fn set_room_topic(&self, room_id: &str, topic: &str) -> ActorResult<String> {
        self.send_state_event(room_id, event_types::TOPIC, "", json!({"topic": topic}))
            .await
    }

    pub async fn set_room_avatar(&self, room_id: &str, url: &str) -> ActorResult<String> {
        self.send_state_event(room_id, event_types::AVATAR, "", json!({"url": url}))
            .await
    }
}
