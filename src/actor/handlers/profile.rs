//! Profile and presence.

use super::super::Actor;
use crate::error::{ActorError, ActorResult};
use appbridge_proto::{Presence, Profile};

impl Actor {
    /// Update this actor's profile. `None` fields are left untouched.
    pub async fn set_profile(&self, display_name: Option<&str>, avatar_url: Option<&str>) -> ActorResult<()> {
        self.instrumented("set_profile", None, async {
            self.ensure_registered().await?;
            if let Some(name) = display_name {
                self.client.set_display_name(name).await?;
            }
            if let Some(url) = avatar_url {
                self.client.set_avatar_url(url).await?;
            }
            self.profiles.invalidate(&self.user_id);
            Ok::<_, ActorError>(())
        })
        .await
    }

    pub async fn set_display_name(&self, name: &str) -> ActorResult<()> {
        self.set_profile(Some(name), None).await
    }

    pub async fn set_avatar_url(&self, url: &str) -> ActorResult<()> {
        self.set_profile(None, Some(url)).await
    }

    /// Set presence. Does nothing when presence is disabled.
    pub async fn set_presence(&self, presence: Presence, status_msg: Option<&str>) -> ActorResult<()> {
        if !self.options.enable_presence {
            return Ok(());
        }
        self.instrumented("set_presence", None, async {
            self.ensure_registered().await?;
            self.client.set_presence(presence, status_msg).await?;
            Ok::<_, ActorError>(())
        })
        .await
    }

    /// Look up a user's profile, from the cache when `use_cache` is set.
    pub async fn get_profile_info(&self, user_id: &str, use_cache: bool) -> ActorResult<Profile> {
        self.instrumented("get_profile_info", None, async {
            self.ensure_registered().await?;
            let profile = if use_cache {
                self.profiles.get(user_id, ()).await?
            } else {
                self.client.get_profile(user_id).await?
            };
            Ok::<_, ActorError>(profile)
        })
        .await
    }
}
