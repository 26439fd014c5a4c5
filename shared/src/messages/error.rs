use thiserror::Error;

use crate::{TokenError, WorldError};

/// Errors that can occur while building, checking, or applying a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The token lists of a message are frozen once it has been sent
    #[error("{message} has already been sent, its tokens can't change anymore")]
    AlreadySent {
        message: &'static str,
    },

    /// Only tokens that already have an id can be scheduled for removal
    #[error("{message} can't remove a {token} that has no id")]
    MissingTokenId {
        message: &'static str,
        token: &'static str,
    },

    /// A hard sync error reached a message that doesn't know how to recover
    #[error("{message} was rejected by the referee and doesn't override on_hard_sync_error()")]
    UnhandledSyncError {
        message: &'static str,
    },

    /// A token of the message could not be prepared
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Applying the message to the world failed
    #[error("World error: {0}")]
    World(#[from] WorldError),
}
