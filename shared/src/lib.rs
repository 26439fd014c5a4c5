//! # Concord Shared
//! Common functionality shared between concord-server & concord-client
//! crates: tokens and the worlds that hold them, messages and their sync
//! errors, the forum that carries them, and the conversations that set a
//! game up.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod actor;
pub mod constants;
pub mod conversation;
mod forum;
pub mod handshake;
mod id_factory;
mod messages;
pub mod pipe;
mod protocol;
mod token;
mod types;
mod world;

pub use actor::{Actor, ActorError, Referee, Reporter, REFEREE_KIND};
pub use forum::{
    Forum, ForumConfig, ForumError, ForumPublisher, ForumRole, LocalRole, Member, PipeIndex,
    Publisher, Reaction, Route, Subscriber, TimedForum,
};
pub use id_factory::{IdFactory, IdFactoryError, IdSpace};
pub use messages::{Message, MessageAny, MessageCore, MessageError, SyncError, TokenRemoval};
pub use protocol::{
    MessageKinds, PackError, PackedToken, Protocol, ProtocolError, ProtocolPlugin, TokenKinds,
    UnpackSession, UnpackedToken,
};
pub use token::{
    Access, ActorHandle, ExtensionRegistry, Registration, RoleKind, Token, TokenAny, TokenCore,
    TokenError, TokenExtension,
};
pub use types::{Flavor, Identity, Ticker, TokenId, REFEREE_ID, ROOT_TOKEN_ID};
pub use world::{UnlockGuard, World, WorldError, WorldGate};
