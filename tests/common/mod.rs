//! Integration test common infrastructure.
//!
//! Provides a scripted [`MockClient`] that records every call into a
//! [`CallLog`] shared between the clients of one test, so assertions can
//! check the exact order of network calls across actors.

pub mod mock;

#[allow(unused_imports)]
pub use mock::{CallLog, MockClient, power_levels};

#[allow(unused_imports)]
use appbridge::{Actor, ActorOptions};
#[allow(unused_imports)]
use std::sync::Arc;

/// An actor for `client`, optionally escalating through `admin`.
#[allow(dead_code)]
pub fn actor(client: &Arc<MockClient>, admin: Option<&Arc<Actor>>) -> Actor {
    let mut builder = Actor::builder(Arc::clone(client) as Arc<dyn appbridge_proto::ProtocolClient>);
    if let Some(admin) = admin {
        builder = builder.admin(Arc::clone(admin));
    }
    builder.build().expect("default actor config is valid")
}

/// An actor that skips registration, so logs only show room traffic.
#[allow(dead_code)]
pub fn registered_actor(client: &Arc<MockClient>, admin: Option<&Arc<Actor>>) -> Actor {
    let mut builder = Actor::builder(Arc::clone(client) as Arc<dyn appbridge_proto::ProtocolClient>)
        .options(ActorOptions {
            registered: true,
            ..ActorOptions::default()
        });
    if let Some(admin) = admin {
        builder = builder.admin(Arc::clone(admin));
    }
    builder.build().expect("default actor config is valid")
}
