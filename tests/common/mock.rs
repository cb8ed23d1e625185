//! Scripted protocol client.

use appbridge_proto::{
    Event, Presence, Profile, ProtocolClient, ProtocolError, Result, RoomCreation,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Ordered record of calls made by every client sharing it.
///
/// Entries read `"<user> <method> <args...>"`, e.g. `"@bot:hs invite !r:hs @ghost:hs"`.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Entries whose method is `method`.
    pub fn calls_to(&self, method: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.split(' ').nth(1) == Some(method))
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls_to(method).len()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

type Scripted = (Duration, std::result::Result<Value, ProtocolError>);

/// A [`ProtocolClient`] answering from per-method scripts.
///
/// Each method pops its next scripted answer; when none is left it succeeds
/// with a sensible default.
pub struct MockClient {
    user_id: String,
    log: CallLog,
    scripts: Mutex<HashMap<&'static str, VecDeque<Scripted>>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new(user_id: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            user_id: user_id.to_string(),
            log: log.clone(),
            scripts: Mutex::new(HashMap::new()),
        })
    }

    /// Answer the next call to `method` with `result`.
    pub fn script(&self, method: &'static str, result: std::result::Result<Value, ProtocolError>) {
        self.script_after(method, Duration::ZERO, result);
    }

    /// Answer the next call to `method` with `result`, after `delay`.
    pub fn script_after(
        &self,
        method: &'static str,
        delay: Duration,
        result: std::result::Result<Value, ProtocolError>,
    ) {
        self.scripts
            .lock()
            .entry(method)
            .or_default()
            .push_back((delay, result));
    }

    /// Fail the next call to `method`.
    pub fn fail(&self, method: &'static str, error: ProtocolError) {
        self.script(method, Err(error));
    }

    /// Answer the next state fetch (normally the power levels) with `content`.
    pub fn with_power_levels(&self, content: Value) {
        self.script("get_state_event", Ok(content));
    }

    async fn respond<T: DeserializeOwned>(
        &self,
        method: &'static str,
        args: &[&str],
        default: Value,
    ) -> Result<T> {
        let mut entry = format!("{} {}", self.user_id, method);
        for arg in args {
            entry.push(' ');
            entry.push_str(arg);
        }
        self.log.push(entry);

        let scripted = self.scripts.lock().get_mut(method).and_then(VecDeque::pop_front);
        let (delay, result) = scripted.unwrap_or((Duration::ZERO, Ok(default)));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let value = result?;
        Ok(serde_json::from_value(value).expect("scripted value has the wrong shape"))
    }
}

/// Power level content giving `users` explicit levels.
#[allow(dead_code)]
pub fn power_levels(users: &[(&str, i64)]) -> Value {
    let users: serde_json::Map<String, Value> = users
        .iter()
        .map(|(user, level)| (user.to_string(), json!(level)))
        .collect();
    json!({ "users": users })
}

#[async_trait]
impl ProtocolClient for MockClient {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn register(&self) -> Result<()> {
        self.respond("register", &[], Value::Null).await
    }

    async fn join_room(&self, room_id: &str) -> Result<()> {
        self.respond("join", &[room_id], Value::Null).await
    }

    async fn leave_room(&self, room_id: &str) -> Result<()> {
        self.respond("leave", &[room_id], Value::Null).await
    }

    async fn invite(&self, room_id: &str, user_id: &str) -> Result<()> {
        self.respond("invite", &[room_id, user_id], Value::Null).await
    }

    async fn kick(&self, room_id: &str, user_id: &str, _reason: Option<&str>) -> Result<()> {
        self.respond("kick", &[room_id, user_id], Value::Null).await
    }

    async fn ban(&self, room_id: &str, user_id: &str, _reason: Option<&str>) -> Result<()> {
        self.respond("ban", &[room_id, user_id], Value::Null).await
    }

    async fn unban(&self, room_id: &str, user_id: &str) -> Result<()> {
        self.respond("unban", &[room_id, user_id], Value::Null).await
    }

    async fn send_event(
        &self,
        room_id: &str,
        event_type: &str,
        txn_id: &str,
        _content: &Value,
    ) -> Result<String> {
        let id = format!("${txn_id}");
        self.respond("send_event", &[room_id, event_type, txn_id], json!(id))
            .await
    }

    async fn send_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
        _content: &Value,
    ) -> Result<String> {
        self.respond("send_state_event", &[room_id, event_type, state_key], json!("$state"))
            .await
    }

    async fn get_event(&self, room_id: &str, event_id: &str) -> Result<Event> {
        let default = json!({
            "event_id": event_id,
            "room_id": room_id,
            "sender": "@someone:hs",
            "type": "m.room.message",
            "content": {},
        });
        self.respond("get_event", &[room_id, event_id], default).await
    }

    async fn get_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
    ) -> Result<Value> {
        self.respond("get_state_event", &[room_id, event_type, state_key], json!({}))
            .await
    }

    async fn room_state(&self, room_id: &str) -> Result<Vec<Event>> {
        self.respond("room_state", &[room_id], json!([])).await
    }

    async fn set_permission_level(&self, room_id: &str, user_id: &str, level: i64) -> Result<()> {
        let level = level.to_string();
        self.respond("set_permission_level", &[room_id, user_id, level.as_str()], Value::Null)
            .await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.respond("get_profile", &[user_id], json!({ "displayname": user_id }))
            .await
    }

    async fn set_display_name(&self, name: &str) -> Result<()> {
        self.respond("set_display_name", &[name], Value::Null).await
    }

    async fn set_avatar_url(&self, url: &str) -> Result<()> {
        self.respond("set_avatar_url", &[url], Value::Null).await
    }

    async fn set_presence(&self, presence: Presence, _status_msg: Option<&str>) -> Result<()> {
        let presence = format!("{presence:?}");
        self.respond("set_presence", &[presence.as_str()], Value::Null).await
    }

    async fn create_room(&self, options: &RoomCreation) -> Result<String> {
        let name = options.name.clone().unwrap_or_default();
        self.respond("create_room", &[name.as_str()], json!("!new:hs")).await
    }
}
