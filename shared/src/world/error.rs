use thiserror::Error;

use crate::{TokenError, TokenId};

/// Errors that can occur while adding, removing, or looking up tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Tokens need an id before they can join a world
    #[error("Can't add a {token} without an id to the world. Assign one from an IdFactory first")]
    MissingId {
        token: &'static str,
    },

    /// A token with the same id is already registered
    #[error("Can't add {token} {id} to the world twice")]
    AlreadyInWorld {
        token: &'static str,
        id: TokenId,
    },

    /// Removed tokens must be reset before they are added again
    #[error("{token} {id} was removed from the world. Call reset_registration() before adding it again")]
    UsingRemovedToken {
        token: &'static str,
        id: TokenId,
    },

    /// No token with this id is registered
    #[error("Token {id} is not part of the world")]
    NotInWorld {
        id: TokenId,
    },

    /// The operation changes the world, so it may only run while it's unlocked
    #[error("World is locked, {operation}() is only allowed while a message executes")]
    Locked {
        operation: &'static str,
    },

    /// The root token lives as long as the world does
    #[error("The root token can't be removed from the world")]
    CantRemoveRoot,

    /// The token exists but is of another type
    #[error("Token {id} is a {found}, not a {expected}")]
    WrongTokenType {
        id: TokenId,
        expected: &'static str,
        found: &'static str,
    },

    /// Building the token's extensions failed
    #[error("Failed to extend token: {0}")]
    Extension(#[from] TokenError),
}
