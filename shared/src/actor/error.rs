use thiserror::Error;

use crate::{Identity, MessageError};

/// Errors that can occur while an actor sends messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    /// The actor has no id factory or forum yet
    #[error("Actor is not connected to a forum yet, it can't send messages")]
    NotConnected,

    /// Actors are connected exactly once
    #[error("Actor is already connected as {identity}")]
    AlreadyConnected {
        identity: Identity,
    },

    /// Only the participant with the referee identity may referee
    #[error("A referee must have identity 0, not {identity}")]
    NotReferee {
        identity: Identity,
    },

    /// The message could not be prepared for sending
    #[error("Message error: {0}")]
    Message(#[from] MessageError),
}
