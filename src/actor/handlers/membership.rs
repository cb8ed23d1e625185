//! Membership and power actions.

use super::super::{Actor, Requirement};
use crate::error::{ActorError, ActorResult};
use appbridge_proto::{MembershipState, RoomCreation, event_types};

impl Actor {
    /// Join `room_id`, escalating through the administrative actor if needed.
    ///
    /// A no-op without network traffic once the store says `joined`.
    pub async fn join(&self, room_id: &str) -> ActorResult<()> {
        self.instrumented("join", Some(room_id), self.ensure_joined(room_id, false))
            .await
    }

    /// Leave `room_id`.
    pub async fn leave(&self, room_id: &str) -> ActorResult<()> {
        self.instrumented("leave", Some(room_id), async {
            self.ensure_registered().await?;
            self.client.leave_room(room_id).await?;
            self.mark_membership(room_id, &self.user_id, MembershipState::Left);
            Ok::<_, ActorError>(())
        })
        .await
    }

    /// Invite `user_id` into `room_id`.
    pub async fn invite(&self, room_id: &str, user_id: &str) -> ActorResult<()> {
        self.room_action("invite", room_id, Some(Requirement::Invite), || {
            self.client.invite(room_id, user_id)
        })
        .await?;
        self.mark_membership(room_id, user_id, MembershipState::Invited);
        Ok(())
    }

    /// Kick `user_id` from `room_id`.
    pub async fn kick(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActorResult<()> {
        self.room_action("kick", room_id, Some(Requirement::Kick), || {
            self.client.kick(room_id, user_id, reason)
        })
        .await?;
        self.mark_membership(room_id, user_id, MembershipState::Left);
        Ok(())
    }

    /// Ban `user_id` from `room_id`.
    pub async fn ban(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActorResult<()> {
        self.room_action("ban", room_id, Some(Requirement::Ban), || {
            self.client.ban(room_id, user_id, reason)
        })
        .await?;
        self.mark_membership(room_id, user_id, MembershipState::Banned);
        Ok(())
    }

    /// Lift a ban on `user_id` in `room_id`.
    pub async fn unban(&self, room_id: &str, user_id: &str) -> ActorResult<()> {
        self.room_action("unban", room_id, Some(Requirement::Ban), || {
            self.client.unban(room_id, user_id)
        })
        .await?;
        self.mark_membership(room_id, user_id, MembershipState::Left);
        Ok(())
    }

    /// Set `user_id`'s power level in `room_id`.
    ///
    /// The stored snapshot, if any, is patched to the new level.
    pub async fn set_power_level(&self, room_id: &str, user_id: &str, level: i64) -> ActorResult<()> {
        self.room_action(
            "set_power_level",
            room_id,
            Some(Requirement::state(event_types::POWER_LEVELS)),
            || self.client.set_permission_level(room_id, user_id, level),
        )
        .await?;
        if let Some(mut content) = self.store.power_levels(room_id) {
            content.set_user_level(user_id, level);
            self.store.set_power_levels(room_id, content);
        }
        Ok(())
    }

    /// Create a room as this actor. Returns the new room id.
    ///
    /// The creator is recorded as joined.
    pub async fn create_room(&self, options: &RoomCreation) -> ActorResult<String> {
        self.instrumented("create_room", None, async {
            self.ensure_registered().await?;
            let room_id = self.client.create_room(options).await?;
            self.mark_membership(&room_id, &self.user_id, MembershipState::Joined);
            for invitee in &options.invite {
                self.mark_membership(&room_id, invitee, MembershipState::Invited);
            }
            Ok::<_, ActorError>(room_id)
        })
        .await
    }
}
