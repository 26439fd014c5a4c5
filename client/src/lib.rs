//! # Concord Client
//! A replica of a concord game. Joins a server through a handshake, then
//! executes its own actor's messages speculatively while the server relays
//! everyone else's, undoing or resyncing whenever the server disagrees.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use concord_shared::{
        ForumConfig, Identity, IdFactory, Message, Protocol, ProtocolPlugin, RoleKind,
        Subscriber, Token, World,
    };
}

mod client;
mod client_config;
mod error;
mod remote_forum;

pub use client::Client;
pub use client_config::ClientConfig;
pub use error::ClientError;
pub use remote_forum::RemoteForum;
