//! The protocol client trait.
//!
//! A [`ProtocolClient`] is scoped to one identity. Transports implement it;
//! the appbridge core only ever calls through it.

use crate::error::Result;
use crate::event::Event;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presence states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Online.
    Online,
    /// Offline.
    Offline,
    /// Away.
    Unavailable,
}

/// Public profile of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    #[serde(default, rename = "displayname", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar content URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Options for creating a room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomCreation {
    /// Room name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Room topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Users to invite on creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invite: Vec<String>,
    /// Whether the room is listed in the public directory.
    #[serde(default)]
    pub public: bool,
    /// Extra state events to set at creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_state: Vec<Event>,
}

/// A client for the remote service, scoped to a single user.
///
/// Every method is one network round trip and may fail with a classified
/// [`ProtocolError`](crate::ProtocolError).
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// The user id this client acts as.
    fn user_id(&self) -> &str;

    /// Register the user with the service.
    async fn register(&self) -> Result<()>;

    /// Join a room.
    async fn join_room(&self, room_id: &str) -> Result<()>;

    /// Leave a room.
    async fn leave_room(&self, room_id: &str) -> Result<()>;

    /// Invite `user_id` into a room.
    async fn invite(&self, room_id: &str, user_id: &str) -> Result<()>;

    /// Kick `user_id` from a room.
    async fn kick(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> Result<()>;

    /// Ban `user_id` from a room.
    async fn ban(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> Result<()>;

    /// Lift a ban.
    async fn unban(&self, room_id: &str, user_id: &str) -> Result<()>;

    /// Send a timeline event. Returns the event id.
    async fn send_event(
        &self,
        room_id: &str,
        event_type: &str,
        txn_id: &str,
        content: &Value,
    ) -> Result<String>;

    /// Send a state event. Returns the event id.
    async fn send_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
        content: &Value,
    ) -> Result<String>;

    /// Fetch a single event.
    async fn get_event(&self, room_id: &str, event_id: &str) -> Result<Event>;

    /// Fetch the content of a state event.
    async fn get_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
    ) -> Result<Value>;

    /// Fetch the full current state of a room.
    async fn room_state(&self, room_id: &str) -> Result<Vec<Event>>;

    /// Set `user_id`'s power level in a room.
    async fn set_permission_level(&self, room_id: &str, user_id: &str, level: i64) -> Result<()>;

    /// Fetch a user's profile.
    async fn get_profile(&self, user_id: &str) -> Result<Profile>;

    /// Set this user's display name.
    async fn set_display_name(&self, name: &str) -> Result<()>;

    /// Set this user's avatar.
    async fn set_avatar_url(&self, url: &str) -> Result<()>;

    /// Set this user's presence.
    async fn set_presence(&self, presence: Presence, status_msg: Option<&str>) -> Result<()>;

    /// Create a room. Returns the new room id.
    async fn create_room(&self, options: &RoomCreation) -> Result<String>;
}
