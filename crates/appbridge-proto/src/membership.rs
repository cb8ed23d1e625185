//! Room membership states.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Membership of a user in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    /// Nothing known yet.
    #[default]
    Unknown,
    /// Invited but not joined.
    #[serde(rename = "invite")]
    Invited,
    /// Joined.
    #[serde(rename = "join")]
    Joined,
    /// Left or kicked.
    #[serde(rename = "leave")]
    Left,
    /// Banned.
    #[serde(rename = "ban")]
    Banned,
}

impl MembershipState {
    /// The wire value for the `membership` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Invited => "invite",
            Self::Joined => "join",
            Self::Left => "leave",
            Self::Banned => "ban",
        }
    }
}

impl FromStr for MembershipState {
    type Err = std::convert::Infallible;

    /// Unrecognised values (e.g. `knock`) map to [`MembershipState::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "invite" => Self::Invited,
            "join" => Self::Joined,
            "leave" => Self::Left,
            "ban" => Self::Banned,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for MembershipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
