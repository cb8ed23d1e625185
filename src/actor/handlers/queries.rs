//! Reads. These need registration but never join.

use super::super::Actor;
use crate::error::{ActorError, ActorResult};
use appbridge_proto::Event;
use serde_json::Value;

impl Actor {
    /// Fetch a single event.
    pub async fn get_event(&self, room_id: &str, event_id: &str) -> ActorResult<Event> {
        self.instrumented("get_event", Some(room_id), async {
            self.ensure_registered().await?;
            Ok::<_, ActorError>(self.client.get_event(room_id, event_id).await?)
        })
        .await
    }

    /// Fetch the content of a state event.
    pub async fn get_state_event(&self, room_id: &str, event_type: &str, state_key: &str) -> ActorResult<Value> {
        self.instrumented("get_state_event", Some(room_id), async {
            self.ensure_registered().await?;
            Ok::<_, ActorError>(self.client.get_state_event(room_id, event_type, state_key).await?)
        })
        .await
    }

    /// Fetch the full current state of a room.
    pub async fn room_state(&self, room_id: &str) -> ActorResult<Vec<Event>> {
        self.instrumented("room_state", Some(room_id), async {
            self.ensure_registered().await?;
            Ok::<_, ActorError>(self.client.room_state(room_id).await?)
        })
        .await
    }
}
