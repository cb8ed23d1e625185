//! Virtual identities acting against the remote service.
//!
//! An [`Actor`] wraps a [`ProtocolClient`] scoped to one user and makes sure
//! the preconditions of each action hold before issuing it:
//!
//! - **Registration**: the identity is registered once, lazily.
//! - **Membership**: room-mutating actions join the room first, escalating
//!   through the administrative actor when a plain join is refused.
//! - **Power**: actions that need a power level get it from the
//!   administrative actor when the actor's own level is too low.
//!
//! # Concurrency
//!
//! Actors hold no per-room locks. Two concurrent actions against the same
//! room race independently; route events through
//! [`EventQueue`](crate::queue::EventQueue) when ordering matters. The
//! [`MembershipStore`] behind an actor is last-write-wins.

use crate::cache::{RequestCache, RequestCacheBuilder};
use crate::config::CacheConfig;
use crate::error::{ActorResult, ValidationError};
use crate::state::{InMemoryMembershipStore, MembershipStore};
use crate::telemetry::{ActionTimer, spans};
use appbridge_proto::{
    Event, MembershipState, PowerLevels, Profile, ProtocolClient, ProtocolError, event_types,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, warn};

mod escalation;
mod handlers;
mod types;

pub use types::{ActorOptions, Requirement};

/// A per-identity facade over a [`ProtocolClient`].
pub struct Actor {
    user_id: String,
    client: Arc<dyn ProtocolClient>,
    admin: Option<Arc<Actor>>,
    store: Arc<dyn MembershipStore>,
    profiles: RequestCache<(), Profile, ProtocolError>,
    options: ActorOptions,
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("user_id", &self.user_id)
            .field("admin", &self.admin.as_ref().map(|a| a.user_id()))
            .field("options", &self.options)
            .finish()
    }
}

impl Actor {
    /// Start building an actor for `client`'s identity.
    pub fn builder(client: Arc<dyn ProtocolClient>) -> ActorBuilder {
        ActorBuilder::new(client)
    }

    /// The user id this actor acts as.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The client scoped to this identity.
    pub fn client(&self) -> &Arc<dyn ProtocolClient> {
        &self.client
    }

    /// The administrative actor used for escalation, if any.
    pub fn admin(&self) -> Option<&Arc<Actor>> {
        self.admin.as_ref()
    }

    /// The membership store this actor reads and writes.
    pub fn store(&self) -> &Arc<dyn MembershipStore> {
        &self.store
    }

    pub fn options(&self) -> ActorOptions {
        self.options
    }

    /// Keep the read models in step with a pushed event.
    ///
    /// `m.room.member` events update the membership of their state key;
    /// `m.room.power_levels` events replace the room's snapshot.
    pub fn on_event(&self, event: &Event) {
        let Some(state_key) = event.state_key.as_deref() else {
            return;
        };
        match event.event_type.as_str() {
            event_types::MEMBER => {
                if let Some(membership) = event.membership() {
                    // FromStr for MembershipState is infallible.
                    let state = membership.parse().unwrap_or_default();
                    self.store.set_membership(&event.room_id, state_key, state);
                }
            }
            event_types::POWER_LEVELS if state_key.is_empty() => {
                match serde_json::from_value::<PowerLevels>(event.content.clone()) {
                    Ok(content) => self.store.set_power_levels(&event.room_id, content),
                    Err(e) => {
                        warn!(room_id = %event.room_id, error = %e, "ignoring malformed power levels event");
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn mark_membership(&self, room_id: &str, user_id: &str, state: MembershipState) {
        self.store.set_membership(room_id, user_id, state);
    }

    /// Run a room-mutating action with every precondition applied.
    ///
    /// Joins first, then checks `requirement` (if any), then runs `op`. A
    /// permission failure from `op` itself forces one rejoin and one retry.
    pub(crate) async fn room_action<T, F, Fut>(
        &self,
        action: &'static str,
        room_id: &str,
        requirement: Option<Requirement<'_>>,
        op: F,
    ) -> ActorResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProtocolError>>,
    {
        self.instrumented(action, Some(room_id), async {
            self.ensure_joined(room_id, false).await?;
            if let Some(requirement) = requirement {
                self.ensure_permission(room_id, requirement).await?;
            }
            self.join_guard(room_id, op).await
        })
        .await
    }

    /// Wrap an action in its span, timer and error accounting.
    pub(crate) async fn instrumented<T>(
        &self,
        action: &'static str,
        room_id: Option<&str>,
        fut: impl Future<Output = ActorResult<T>>,
    ) -> ActorResult<T> {
        let _timer = ActionTimer::new(action);
        let result = fut
            .instrument(spans::action(action, &self.user_id, room_id))
            .await;
        if let Err(e) = &result {
            crate::metrics::record_action_error(action, e.error_code());
            debug!(action, user_id = %self.user_id, error = %e, "action failed");
        }
        result
    }
}

/// Builder for [`Actor`].
pub struct ActorBuilder {
    client: Arc<dyn ProtocolClient>,
    admin: Option<Arc<Actor>>,
    store: Option<Arc<dyn MembershipStore>>,
    options: ActorOptions,
    cache: CacheConfig,
}

impl ActorBuilder {
    pub fn new(client: Arc<dyn ProtocolClient>) -> Self {
        Self {
            client,
            admin: None,
            store: None,
            options: ActorOptions::default(),
            cache: CacheConfig::default(),
        }
    }

    /// The administrative actor used for escalation.
    pub fn admin(mut self, admin: Arc<Actor>) -> Self {
        self.admin = Some(admin);
        self
    }

    /// Share a membership store instead of a private one.
    pub fn store(mut self, store: Arc<dyn MembershipStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn options(mut self, options: ActorOptions) -> Self {
        self.options = options;
        self
    }

    /// Sizing of the profile cache.
    pub fn cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn build(self) -> Result<Actor, ValidationError> {
        let fetch_client = Arc::clone(&self.client);
        let profiles = RequestCacheBuilder::from_config(&self.cache)
            .fetch(move |user_id: String, ()| {
                let client = Arc::clone(&fetch_client);
                async move { client.get_profile(&user_id).await }
            })
            .build()?;

        Ok(Actor {
            user_id: self.client.user_id().to_string(),
            client: self.client,
            admin: self.admin,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryMembershipStore::new()) as Arc<dyn MembershipStore>),
            profiles,
            options: self.options,
        })
    }
}
