//! Shared read models.
//!
//! Contains the membership store consulted by actors before they touch the
//! network.

mod dashmap_ext;
mod membership;

pub(crate) use dashmap_ext::DashMapExt;
pub use membership::{InMemoryMembershipStore, MembershipStore};
