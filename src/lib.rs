//! # appbridge
//!
//! Building blocks for bridges that puppet many users on a chat service.
//!
//! ## Components
//!
//! - [`Actor`]: one virtual identity. Registers lazily, joins rooms before
//!   acting in them and borrows power from an administrative actor when its
//!   own level falls short.
//! - [`RequestCache`]: TTL-bounded memoization of async lookups.
//! - [`MembershipStore`]: who is in which room, and the room power levels.
//! - [`EventQueue`]: inbound event ordering (none, global or per room).
//! - [`StateTracker`]: live read model of selected room state.
//! - [`EventPipeline`]: feeds pushed events through all of the above.
//!
//! The service itself is reached through an
//! [`appbridge_proto::ProtocolClient`] implementation supplied by the bridge.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use appbridge::{Actor, BridgeConfig};
//! use appbridge_proto::ProtocolClient;
//! use std::sync::Arc;
//!
//! async fn relay(
//!     bot_client: Arc<dyn ProtocolClient>,
//!     ghost_client: Arc<dyn ProtocolClient>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BridgeConfig::load("appbridge.toml")?;
//!     let bot = Arc::new(Actor::builder(bot_client).build()?);
//!     let ghost = Actor::builder(ghost_client)
//!         .admin(Arc::clone(&bot))
//!         .options((&config.actor).into())
//!         .store(Arc::clone(bot.store()))
//!         .build()?;
//!     ghost.send_text("!room:example.org", "hello from the other side").await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]

pub mod actor;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod state;
pub mod telemetry;
pub mod tracker;

pub use actor::{Actor, ActorBuilder, ActorOptions, Requirement};
pub use bridge::EventPipeline;
pub use cache::{RequestCache, RequestCacheBuilder};
pub use config::BridgeConfig;
pub use error::{ActorError, ActorResult, StateError, ValidationError};
pub use queue::{EventQueue, OrderingPolicy};
pub use state::{InMemoryMembershipStore, MembershipStore};
pub use tracker::StateTracker;
