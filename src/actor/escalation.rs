//! Precondition checks and their escalation protocols.
//!
//! Only [`ErrorKind::PermissionDenied`](appbridge_proto::ErrorKind) failures
//! escalate. Every other failure is returned unchanged at the step where it
//! happened.

use super::{Actor, Requirement};
use crate::error::{ActorError, ActorResult};
use appbridge_proto::{ErrorKind, MembershipState, PowerLevels, ProtocolError, event_types};
use std::future::Future;
use tracing::{debug, info, warn};

impl Actor {
    /// Register the identity with the service unless already known to be.
    ///
    /// A "user in use" answer counts as success.
    pub async fn ensure_registered(&self) -> ActorResult<()> {
        if self.options.registered || self.store.is_registered(&self.user_id) {
            return Ok(());
        }

        match self.client.register().await {
            Ok(()) => {
                info!(user_id = %self.user_id, "registered");
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(user_id = %self.user_id, "already registered");
            }
            Err(e) => return Err(e.into()),
        }
        self.store.set_registered(&self.user_id, true);
        Ok(())
    }

    /// Make sure this actor is joined to `room_id`.
    ///
    /// Returns at once if the store already says `joined` and `force` is not
    /// set. Otherwise tries, stopping at the first success:
    ///
    /// 1. a direct join;
    /// 2. an invite from the administrative actor, then a join;
    /// 3. a join by the administrative actor, its invite, then a join.
    ///
    /// Each step only runs if the previous one was refused with a permission
    /// error. Any other error ends the attempt unchanged. A failure anywhere
    /// in the last step is [`ActorError::UnableToJoin`].
    pub async fn ensure_joined(&self, room_id: &str, force: bool) -> ActorResult<()> {
        if self.options.dont_join {
            return Ok(());
        }
        if !force && self.store.membership(room_id, &self.user_id) == MembershipState::Joined {
            return Ok(());
        }

        self.ensure_registered().await?;

        let denied = match self.client.join_room(room_id).await {
            Ok(()) => {
                crate::metrics::record_join_step("direct", "ok");
                self.mark_membership(room_id, &self.user_id, MembershipState::Joined);
                return Ok(());
            }
            Err(e) if e.is_permission_denied() => e,
            Err(e) => {
                crate::metrics::record_join_step("direct", "error");
                return Err(e.into());
            }
        };
        crate::metrics::record_join_step("direct", "denied");

        let Some(admin) = self.admin.as_deref() else {
            debug!(room_id, user_id = %self.user_id, "join denied and no administrative actor to escalate to");
            return Err(denied.into());
        };

        debug!(room_id, user_id = %self.user_id, admin = %admin.user_id, "join denied, asking for an invite");
        let invited = async {
            admin.client.invite(room_id, &self.user_id).await?;
            self.mark_membership(room_id, &self.user_id, MembershipState::Invited);
            self.client.join_room(room_id).await
        };
        match invited.await {
            Ok(()) => {
                crate::metrics::record_join_step("admin_invite", "ok");
                self.mark_membership(room_id, &self.user_id, MembershipState::Joined);
                return Ok(());
            }
            Err(e) if e.is_permission_denied() => {
                crate::metrics::record_join_step("admin_invite", "denied");
            }
            Err(e) => {
                crate::metrics::record_join_step("admin_invite", "error");
                return Err(e.into());
            }
        }

        debug!(room_id, user_id = %self.user_id, admin = %admin.user_id, "invite path denied, joining administrative actor first");
        let via_admin = async {
            admin.client.join_room(room_id).await?;
            admin.mark_membership(room_id, &admin.user_id, MembershipState::Joined);
            admin.client.invite(room_id, &self.user_id).await?;
            self.mark_membership(room_id, &self.user_id, MembershipState::Invited);
            self.client.join_room(room_id).await
        };
        match via_admin.await {
            Ok(()) => {
                crate::metrics::record_join_step("admin_join", "ok");
                self.mark_membership(room_id, &self.user_id, MembershipState::Joined);
                Ok(())
            }
            Err(source) => {
                crate::metrics::record_join_step("admin_join", "failed");
                warn!(room_id, user_id = %self.user_id, error = %source, "unable to join");
                Err(ActorError::UnableToJoin {
                    room_id: room_id.to_string(),
                    source,
                })
            }
        }
    }

    /// Make sure this actor's power level satisfies `requirement`.
    ///
    /// Reads the snapshot from the store, fetching it on a miss. When the
    /// actor falls short, the administrative actor raises it to exactly the
    /// required level, provided it may edit the power levels itself. The
    /// stored snapshot is then patched in place rather than re-fetched.
    ///
    /// Returns the snapshot the decision was made on.
    pub async fn ensure_permission(
        &self,
        room_id: &str,
        requirement: Requirement<'_>,
    ) -> ActorResult<PowerLevels> {
        if self.options.dont_check_power_level && !requirement.is_power_levels() {
            return Ok(self.store.power_levels(room_id).unwrap_or_default());
        }

        let mut content = self.power_levels(room_id).await?;
        let required = requirement.required_level(&content);
        if content.user_level(&self.user_id) >= required {
            return Ok(content);
        }

        let cannot_escalate = || ActorError::CannotEscalate {
            room_id: room_id.to_string(),
            event_type: requirement.label().to_string(),
            required,
        };
        let Some(admin) = self.admin.as_deref() else {
            crate::metrics::record_power_escalation("no_admin");
            return Err(cannot_escalate());
        };
        if content.user_level(&admin.user_id) < content.required_to_edit() {
            crate::metrics::record_power_escalation("admin_too_low");
            warn!(room_id, user_id = %self.user_id, admin = %admin.user_id, required, "administrative actor cannot edit power levels");
            return Err(cannot_escalate());
        }

        debug!(room_id, user_id = %self.user_id, required, action = requirement.label(), "raising power level");
        admin
            .client
            .set_permission_level(room_id, &self.user_id, required)
            .await?;
        crate::metrics::record_power_escalation("ok");

        content.set_user_level(self.user_id.clone(), required);
        self.store.set_power_levels(room_id, content.clone());
        Ok(content)
    }

    /// The room's power level snapshot, fetched only if none is stored.
    pub async fn power_levels(&self, room_id: &str) -> ActorResult<PowerLevels> {
        match self.store.power_levels(room_id) {
            Some(content) => Ok(content),
            None => self.refresh_power_levels(room_id).await,
        }
    }

    /// Fetch the room's power levels and replace the stored snapshot.
    pub async fn refresh_power_levels(&self, room_id: &str) -> ActorResult<PowerLevels> {
        let raw = self
            .client
            .get_state_event(room_id, event_types::POWER_LEVELS, "")
            .await?;
        let content: PowerLevels =
            serde_json::from_value(raw).map_err(|e| ActorError::MalformedPowerLevels {
                room_id: room_id.to_string(),
                reason: e.to_string(),
            })?;
        self.store.set_power_levels(room_id, content.clone());
        Ok(content)
    }

    /// Run `op`; on a permission failure, force a rejoin and run it once more.
    pub(crate) async fn join_guard<T, F, Fut>(&self, room_id: &str, op: F) -> ActorResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProtocolError>>,
    {
        match op().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_permission_denied() => {
                debug!(room_id, user_id = %self.user_id, error = %e, "action denied, rejoining before retry");
                self.ensure_joined(room_id, true).await?;
                op().await.map_err(ActorError::from)
            }
            Err(e) => Err(e.into()),
        }
    }
}
