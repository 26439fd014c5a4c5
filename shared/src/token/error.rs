use thiserror::Error;

use crate::TokenId;

use super::Registration;

/// Errors that can occur while using or extending a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A method was called while the token was in the wrong lifecycle state
    #[error("{token}.{method}() may not be called while the token is {state}")]
    InvalidAccess {
        token: &'static str,
        method: &'static str,
        state: Registration,
    },

    /// A read-write method was called while the world was locked
    #[error("{token}.{method}() may only be called from inside a message, the world is locked")]
    WorldLocked {
        token: &'static str,
        method: &'static str,
    },

    /// Tokens get exactly one id over their whole lifetime
    #[error("{token} already has id {id}, ids may only be assigned once")]
    AlreadyHasId {
        token: &'static str,
        id: TokenId,
    },

    /// An extension asked to watch a method the token never reports
    #[error("{token} has no watchable method named '{method}'. Add it to Token::watchable_methods()")]
    NoSuchMethodToWatch {
        token: &'static str,
        method: &'static str,
    },

    /// Every (token type, role kind) pair can carry only one extension
    #[error("An extension is already bound to {token} for role '{kind}'")]
    ExtensionAlreadyBound {
        token: &'static str,
        kind: &'static str,
    },

    /// An extension factory was handed a token of another type
    #[error("Extension factory expected a {expected} but was given a {found}")]
    WrongTokenType {
        expected: &'static str,
        found: &'static str,
    },
}
