//! Room state read model.
//!
//! A [`StateTracker`] keeps, per tracked room, the latest state event for
//! every `(event_type, state_key)` pair of the types it is interested in. A
//! room's snapshot is seeded by one full state fetch and then kept current by
//! events pushed through [`StateTracker::on_event`].
//!
//! Events pushed while the seeding fetch is still outstanding are held back
//! and applied on top of the fetch result, so they always win over it.

use crate::config::StateConfig;
use crate::error::StateError;
use crate::state::DashMapExt;
use appbridge_proto::{Event, ProtocolClient};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{Instrument, debug, info, warn};

type TrackFuture = Shared<BoxFuture<'static, Result<(), StateError>>>;

/// `event_type -> state_key -> event`
type Snapshot = HashMap<String, BTreeMap<String, Event>>;

enum Phase {
    /// Seeding fetch outstanding; pushed events wait here.
    Pending(Vec<Event>),
    Ready,
}

struct RoomEntry {
    /// Distinguishes this tracking from an earlier untracked one.
    generation: u64,
    phase: Phase,
    snapshot: Snapshot,
    track: TrackFuture,
}

struct Inner {
    client: Arc<dyn ProtocolClient>,
    event_types: Option<Vec<String>>,
    retry_delay: Duration,
    rooms: DashMap<String, RoomEntry>,
    next_generation: AtomicU64,
}

impl Inner {
    fn wants(&self, event: &Event) -> bool {
        event.is_state()
            && self
                .event_types
                .as_ref()
                .is_none_or(|types| types.iter().any(|t| *t == event.event_type))
    }

    fn is_current(&self, room_id: &str, generation: u64) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|entry| entry.generation == generation)
    }

    fn forget(&self, room_id: &str, generation: u64) {
        if self
            .rooms
            .remove_if(room_id, |_, entry| entry.generation == generation)
            .is_some()
        {
            crate::metrics::tracked_rooms_add(-1);
        }
    }

    /// Install the fetched state, then replay whatever arrived meanwhile.
    fn resolve(&self, room_id: &str, generation: u64, events: Vec<Event>) -> Result<(), StateError> {
        let Some(mut entry) = self.rooms.get_mut(room_id) else {
            return Err(StateError::Untracked(room_id.to_string()));
        };
        if entry.generation != generation {
            return Err(StateError::Untracked(room_id.to_string()));
        }

        let mut snapshot = Snapshot::new();
        for event in events.into_iter().filter(|e| self.wants(e)) {
            insert(&mut snapshot, event);
        }
        let queued = match std::mem::replace(&mut entry.phase, Phase::Ready) {
            Phase::Pending(queued) => queued,
            Phase::Ready => Vec::new(),
        };
        let replayed = queued.len();
        for event in queued {
            insert(&mut snapshot, event);
        }
        entry.snapshot = snapshot;
        debug!(room_id, replayed, "room state seeded");
        Ok(())
    }
}

fn insert(snapshot: &mut Snapshot, event: Event) {
    let state_key = event.state_key.clone().unwrap_or_default();
    snapshot
        .entry(event.event_type.clone())
        .or_default()
        .insert(state_key, event);
}

async fn fetch_loop(inner: Arc<Inner>, room_id: String, generation: u64) -> Result<(), StateError> {
    loop {
        if !inner.is_current(&room_id, generation) {
            debug!(room_id = %room_id, "room untracked, giving up on state fetch");
            return Err(StateError::Untracked(room_id));
        }

        match inner.client.room_state(&room_id).await {
            Ok(events) => return inner.resolve(&room_id, generation, events),
            Err(e) if e.is_structured() => {
                warn!(room_id = %room_id, error = %e, "state fetch failed permanently");
                inner.forget(&room_id, generation);
                return Err(e.into());
            }
            Err(e) => {
                crate::metrics::record_state_retry();
                debug!(room_id = %room_id, error = %e, delay_ms = inner.retry_delay.as_millis() as u64, "state fetch failed, retrying");
                tokio::time::sleep(inner.retry_delay).await;
            }
        }
    }
}

/// Tracks the current state of a set of rooms.
///
/// Cloning is cheap and clones share the same rooms.
#[derive(Clone)]
pub struct StateTracker {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTracker")
            .field("event_types", &self.inner.event_types)
            .field("retry_delay", &self.inner.retry_delay)
            .field("rooms", &self.inner.rooms.len())
            .finish()
    }
}

impl StateTracker {
    /// Track every state event type, retrying transient failures after
    /// `retry_delay`.
    pub fn new(client: Arc<dyn ProtocolClient>, retry_delay: Duration) -> Self {
        Self::build(client, None, retry_delay)
    }

    /// Track only the given state event types.
    pub fn with_event_types<I, S>(client: Arc<dyn ProtocolClient>, event_types: I, retry_delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types = event_types.into_iter().map(Into::into).collect();
        Self::build(client, Some(types), retry_delay)
    }

    pub fn from_config(client: Arc<dyn ProtocolClient>, config: &StateConfig) -> Self {
        Self::build(client, config.event_type_filter(), config.retry_delay())
    }

    fn build(client: Arc<dyn ProtocolClient>, event_types: Option<Vec<String>>, retry_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                event_types,
                retry_delay,
                rooms: DashMap::new(),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Start tracking `room_id` and wait for its state to be seeded.
    ///
    /// Calling this again while the fetch is outstanding waits on the same
    /// fetch; calling it after success returns at once. The fetch runs on its
    /// own task, so dropping the returned future does not stop it.
    ///
    /// A structured service error fails the call and forgets the room.
    /// Anything else is retried until the fetch succeeds or the room is
    /// [`untrack`](Self::untrack)ed, in which case this returns
    /// [`StateError::Untracked`].
    pub async fn track(&self, room_id: &str) -> Result<(), StateError> {
        let (track, started) = match self.inner.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) => (entry.get().track.clone(), false),
            Entry::Vacant(slot) => {
                let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                let track = fetch_loop(Arc::clone(&self.inner), room_id.to_string(), generation)
                    .instrument(crate::telemetry::spans::state_fetch(room_id))
                    .boxed()
                    .shared();
                slot.insert(RoomEntry {
                    generation,
                    phase: Phase::Pending(Vec::new()),
                    snapshot: Snapshot::new(),
                    track: track.clone(),
                });
                (track, true)
            }
        };

        if started {
            crate::metrics::tracked_rooms_add(1);
            info!(room_id, "tracking room state");
            tokio::spawn(track.clone());
        }
        track.await
    }

    /// Stop tracking `room_id`, dropping its snapshot.
    ///
    /// An outstanding fetch stops at its next retry check.
    pub fn untrack(&self, room_id: &str) -> bool {
        if self.inner.rooms.remove(room_id).is_some() {
            crate::metrics::tracked_rooms_add(-1);
            debug!(room_id, "untracked room");
            true
        } else {
            false
        }
    }

    /// Apply a pushed event.
    ///
    /// Ignored for untracked rooms, non-state events and filtered-out types.
    /// Held back until the seeding fetch resolves if it has not yet.
    pub fn on_event(&self, event: &Event) {
        if !self.inner.wants(event) {
            return;
        }
        let Some(mut guard) = self.inner.rooms.get_mut(&event.room_id) else {
            return;
        };
        let entry = &mut *guard;
        match &mut entry.phase {
            Phase::Pending(queued) => queued.push(event.clone()),
            Phase::Ready => insert(&mut entry.snapshot, event.clone()),
        }
    }

    /// Every tracked event of `event_type` in the room, ordered by state key.
    pub fn get_state(&self, room_id: &str, event_type: &str) -> Vec<Event> {
        self.inner
            .rooms
            .get(room_id)
            .and_then(|entry| {
                entry
                    .snapshot
                    .get(event_type)
                    .map(|by_key| by_key.values().cloned().collect())
            })
            .unwrap_or_default()
    }

    /// The tracked event for `(event_type, state_key)`, if any.
    pub fn get_state_event(&self, room_id: &str, event_type: &str, state_key: &str) -> Option<Event> {
        let entry = self.inner.rooms.get(room_id)?;
        entry.snapshot.get(event_type)?.get(state_key).cloned()
    }

    pub fn is_tracked(&self, room_id: &str) -> bool {
        self.inner.rooms.contains_key(room_id)
    }

    /// Rooms currently tracked, seeded or not, sorted.
    pub fn tracked_rooms(&self) -> Vec<String> {
        let mut rooms = self.inner.rooms.keys_cloned();
        rooms.sort();
        rooms
    }
}
