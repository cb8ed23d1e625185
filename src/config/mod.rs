//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Root config struct and loading (BridgeConfig, ConfigError)
//! - [`cache`]: Request cache sizing (CacheConfig)
//! - [`queue`]: Event ordering policy (QueueConfig)
//! - [`state`]: Room state tracking (StateConfig)
//! - [`actor`]: Actor defaults (ActorConfig)

mod actor;
mod cache;
mod defaults;
mod queue;
mod state;
mod types;
pub mod validation;

pub use actor::ActorConfig;
pub use cache::CacheConfig;
pub use queue::QueueConfig;
pub use state::StateConfig;
pub use types::{BridgeConfig, ConfigError};
