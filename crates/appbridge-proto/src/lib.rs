//! # appbridge-proto
//!
//! Protocol vocabulary shared by the appbridge core and the bridges built on
//! top of it.
//!
//! ## Features
//!
//! - Room and user identifiers
//! - Room events with optional state keys
//! - Membership states and power level content
//! - A classified [`ProtocolError`] that callers branch on by [`ErrorKind`]
//! - The [`ProtocolClient`] trait implemented by transports
//!
//! No wire format is defined here. Transports map their responses onto these
//! types.
//!
//! ## Quick Start
//!
//! ```rust
//! use appbridge_proto::{ErrorKind, ProtocolError};
//!
//! let err = ProtocolError::from_response(Some(403), "M_FORBIDDEN", "not allowed");
//! assert_eq!(err.kind(), ErrorKind::PermissionDenied);
//!
//! let err = ProtocolError::transient("connection reset");
//! assert!(err.is_transient());
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod event;
pub mod membership;
pub mod power_levels;

pub use client::{Presence, Profile, ProtocolClient, RoomCreation};
pub use error::{ErrorKind, ProtocolError, Result};
pub use event::{event_types, Event};
pub use membership::MembershipState;
pub use power_levels::PowerLevels;

/// Room identifier (e.g. `!abc:example.org`).
pub type RoomId = String;

/// User identifier (e.g. `@bot:example.org`).
pub type UserId = String;
