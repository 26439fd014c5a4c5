//! # Concord Server
//! The authoritative side of a concord game. Hands every joining client its
//! identity, checks the messages clients send against the referee's world,
//! and relays them (or bounces them) so every replica converges.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use concord_shared::{
        ForumConfig, Identity, IdFactory, Message, Protocol, ProtocolPlugin, Subscriber, Token,
        World,
    };
}

mod error;
mod remote_actors;
mod server;

pub use error::ServerError;
pub use remote_actors::RemoteActors;
pub use server::{Server, ServerConfig};
