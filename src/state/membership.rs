//! Membership and power level read model.
//!
//! A [`MembershipStore`] answers "is this user joined to this room?" and
//! "what are the room's power levels?" without a network call. Actors write
//! to it after successful operations and when pushed events arrive. Writes
//! are last-write-wins; nothing here is transactional.
//!
//! Each actor gets a private [`InMemoryMembershipStore`] unless a shared
//! store is injected, which lets many actors reuse each other's reads.

use super::dashmap_ext::DashMapExt;
use appbridge_proto::{MembershipState, PowerLevels, RoomId, UserId};
use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// Read model of room memberships, power levels and user registration.
pub trait MembershipStore: Send + Sync {
    /// Membership of `user_id` in `room_id`; `Unknown` if never recorded.
    fn membership(&self, room_id: &str, user_id: &str) -> MembershipState;

    /// Record the membership of `user_id` in `room_id`.
    fn set_membership(&self, room_id: &str, user_id: &str, state: MembershipState);

    /// The cached power level snapshot of `room_id`.
    fn power_levels(&self, room_id: &str) -> Option<PowerLevels>;

    /// Replace the power level snapshot of `room_id`.
    fn set_power_levels(&self, room_id: &str, content: PowerLevels);

    /// True if `user_id` is known to be registered with the service.
    fn is_registered(&self, user_id: &str) -> bool;

    /// Record whether `user_id` is registered.
    fn set_registered(&self, user_id: &str, registered: bool);

    /// Users recorded as joined to `room_id`.
    fn members(&self, room_id: &str) -> Vec<UserId>;

    /// Drop everything recorded about `room_id`.
    fn forget_room(&self, room_id: &str);
}

/// Process-memory [`MembershipStore`].
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    memberships: DashMap<RoomId, HashMap<UserId, MembershipState>>,
    power_levels: DashMap<RoomId, PowerLevels>,
    registered: DashSet<UserId>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MembershipStore for InMemoryMembershipStore {
    fn membership(&self, room_id: &str, user_id: &str) -> MembershipState {
        self.memberships
            .get(room_id)
            .and_then(|room| room.get(user_id).copied())
            .unwrap_or_default()
    }

    fn set_membership(&self, room_id: &str, user_id: &str, state: MembershipState) {
        self.memberships
            .entry(room_id.to_string())
            .or_default()
            .insert(user_id.to_string(), state);
    }

    fn power_levels(&self, room_id: &str) -> Option<PowerLevels> {
        self.power_levels.get_cloned(room_id)
    }

    fn set_power_levels(&self, room_id: &str, content: PowerLevels) {
        self.power_levels.insert(room_id.to_string(), content);
    }

    fn is_registered(&self, user_id: &str) -> bool {
        self.registered.contains(user_id)
    }

    fn set_registered(&self, user_id: &str, registered: bool) {
        if registered {
            self.registered.insert(user_id.to_string());
        } else {
            self.registered.remove(user_id);
        }
    }

    fn members(&self, room_id: &str) -> Vec<UserId> {
        let Some(room) = self.memberships.get_cloned(room_id) else {
            return Vec::new();
        };
        let mut joined: Vec<UserId> = room
            .into_iter()
            .filter(|(_, state)| *state == MembershipState::Joined)
            .map(|(user, _)| user)
            .collect();
        joined.sort();
        joined
    }

    fn forget_room(&self, room_id: &str) {
        self.memberships.remove(room_id);
        self.power_levels.remove(room_id);
    }
}
