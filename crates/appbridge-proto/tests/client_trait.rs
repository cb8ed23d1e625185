//! The client trait must stay object safe and usable behind `Arc<dyn _>`.

use appbridge_proto::{
    Event, Presence, Profile, ProtocolClient, ProtocolError, Result, RoomCreation,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

struct Offline {
    user_id: String,
}

#[async_trait]
impl ProtocolClient for Offline {
    fn user_id(&self) -> &str {
        &self.user_id
    }
    async fn register(&self) -> Result<()> {
        Err(ProtocolError::user_in_use("taken"))
    }
    async fn join_room(&self, _room_id: &str) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn leave_room(&self, _room_id: &str) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn invite(&self, _room_id: &str, _user_id: &str) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn kick(&self, _room_id: &str, _user_id: &str, _reason: Option<&str>) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn ban(&self, _room_id: &str, _user_id: &str, _reason: Option<&str>) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn unban(&self, _room_id: &str, _user_id: &str) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn send_event(
        &self,
        _room_id: &str,
        _event_type: &str,
        _txn_id: &str,
        _content: &Value,
    ) -> Result<String> {
        Err(ProtocolError::transient("offline"))
    }
    async fn send_state_event(
        &self,
        _room_id: &str,
        _event_type: &str,
        _state_key: &str,
        _content: &Value,
    ) -> Result<String> {
        Err(ProtocolError::transient("offline"))
    }
    async fn get_event(&self, room_id: &str, event_id: &str) -> Result<Event> {
        Ok(Event::message(room_id, "@x:hs", "m.room.message", json!({})).with_event_id(event_id))
    }
    async fn get_state_event(
        &self,
        _room_id: &str,
        _event_type: &str,
        _state_key: &str,
    ) -> Result<Value> {
        Err(ProtocolError::service(404, "M_NOT_FOUND", "no state"))
    }
    async fn room_state(&self, _room_id: &str) -> Result<Vec<Event>> {
        Ok(Vec::new())
    }
    async fn set_permission_level(&self, _room_id: &str, _user_id: &str, _level: i64) -> Result<()> {
        Err(ProtocolError::transient("offline"))
    }
    async fn get_profile(&self, _user_id: &str) -> Result<Profile> {
        Ok(Profile::default())
    }
    async fn set_display_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }
    async fn set_avatar_url(&self, _url: &str) -> Result<()> {
        Ok(())
    }
    async fn set_presence(&self, _presence: Presence, _status_msg: Option<&str>) -> Result<()> {
        Ok(())
    }
    async fn create_room(&self, _options: &RoomCreation) -> Result<String> {
        Ok("!new:hs".to_string())
    }
}

#[tokio::test]
async fn client_works_as_trait_object() {
    let client: Arc<dyn ProtocolClient> = Arc::new(Offline {
        user_id: "@bot:hs".to_string(),
    });

    assert_eq!(client.user_id(), "@bot:hs");
    assert!(client.register().await.unwrap_err().kind() == appbridge_proto::ErrorKind::AlreadyExists);
    assert!(client.join_room("!r:hs").await.unwrap_err().is_transient());

    let ev = client.get_event("!r:hs", "$e").await.unwrap();
    assert_eq!(ev.event_id.as_deref(), Some("$e"));

    let created = client.create_room(&RoomCreation::default()).await.unwrap();
    assert_eq!(created, "!new:hs");
}
