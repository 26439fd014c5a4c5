use thiserror::Error;

use crate::{Flavor, TokenId};

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.lock() has been called and no further changes are allowed")]
    AlreadyLocked,
}

/// Errors that can occur while packing or unpacking messages and tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// Message kind not found in registry
    #[error("Message {message} not registered with Protocol. Must call `add_message()` during protocol initialization")]
    MessageNotRegistered {
        message: &'static str,
    },

    /// Token kind not found in registry
    #[error("Token {token} not registered with Protocol. Must call `add_token()` during protocol initialization")]
    TokenNotRegistered {
        token: &'static str,
    },

    /// Flavor not found in message registry
    #[error("Flavor {flavor} not found in message registry. Both ends must register the same messages in the same order")]
    UnknownMessageFlavor {
        flavor: Flavor,
    },

    /// Flavor not found in token registry
    #[error("Flavor {flavor} not found in token registry. Both ends must register the same tokens in the same order")]
    UnknownTokenFlavor {
        flavor: Flavor,
    },

    /// A registered token arrived without an id
    #[error("Registered {token} has no id and can't be packed by reference")]
    MissingTokenId {
        token: &'static str,
    },

    /// A reference pointed at a token this world doesn't have
    #[error("Packed reference to token {id}, which is not part of the world")]
    UnknownToken {
        id: TokenId,
    },

    /// New tokens always travel by value
    #[error("Token {id} was packed by reference but has to be created by the message")]
    UnexpectedReference {
        id: TokenId,
    },

    /// bincode failed
    #[error("Codec error: {0}")]
    Codec(String),
}

impl From<bincode::Error> for PackError {
    fn from(err: bincode::Error) -> Self {
        PackError::Codec(err.to_string())
    }
}
