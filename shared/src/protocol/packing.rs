use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    messages::TokenRemoval, Flavor, Identity, Message, SyncError, Token, TokenId, World,
};

use super::{PackError, Protocol};

/// How a token crosses the wire.
///
/// Tokens that are part of the sender's world travel as their id and
/// resolve to the receiver's own instance. Everything else travels by value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackedToken {
    Reference(TokenId),
    Value { flavor: Flavor, payload: Vec<u8> },
}

#[derive(Serialize, Deserialize)]
struct PackedRemoval {
    id: TokenId,
    snapshot: Option<PackedToken>,
}

#[derive(Serialize, Deserialize)]
struct PackedMessage {
    sender_id: Option<Identity>,
    sync_error: SyncError,
    tokens_to_add: Vec<PackedToken>,
    tokens_to_remove: Vec<PackedRemoval>,
    payload: Vec<u8>,
}

impl Protocol {
    pub fn pack_token(&self, token: &dyn Token) -> Result<PackedToken, PackError> {
        if token.is_registered() {
            let id = token.id().ok_or(PackError::MissingTokenId {
                token: token.token_name(),
            })?;
            return Ok(PackedToken::Reference(id));
        }
        let (flavor, payload) = self.token_kinds.encode(token)?;
        Ok(PackedToken::Value { flavor, payload })
    }

    /// Packs a message into its flavor and bytes.
    ///
    /// Snapshots of removed tokens are only included when the message
    /// carries a hard sync error, since only then does the receiver need
    /// them to undo it.
    pub fn pack_message(&self, message: &dyn Message) -> Result<(Flavor, Vec<u8>), PackError> {
        let (flavor, payload) = self.message_kinds.encode(message)?;
        let core = message.core();
        let with_snapshots = core.sync_error() == SyncError::Hard;

        let tokens_to_add = core
            .tokens_to_add()
            .map(|token| self.pack_token(token))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tokens_to_remove = Vec::new();
        for removal in core.tokens_to_remove() {
            let snapshot = match removal.snapshot() {
                Some(token) if with_snapshots => {
                    let (flavor, payload) = self.token_kinds.encode(token)?;
                    Some(PackedToken::Value { flavor, payload })
                }
                _ => None,
            };
            tokens_to_remove.push(PackedRemoval {
                id: removal.id(),
                snapshot,
            });
        }

        let packed = PackedMessage {
            sender_id: core.sender_id(),
            sync_error: core.sync_error(),
            tokens_to_add,
            tokens_to_remove,
            payload,
        };
        Ok((flavor, bincode::serialize(&packed)?))
    }

    /// Starts resolving packed tokens and messages against `world`
    pub fn unpack_session<'w>(&'w self, world: &'w World) -> UnpackSession<'w> {
        UnpackSession::new(self, world)
    }
}

/// Result of unpacking one token
pub enum UnpackedToken<'w> {
    /// The receiver's own instance of a registered token
    Local(&'w dyn Token),
    /// A fresh, unregistered copy
    Detached(Box<dyn Token>),
}

impl UnpackedToken<'_> {
    pub fn as_token(&self) -> &dyn Token {
        match self {
            UnpackedToken::Local(token) => *token,
            UnpackedToken::Detached(token) => token.as_ref(),
        }
    }
}

/// Resolves packed data against one world. References resolved once are
/// cached, so every unpack in a session hands out the same instance.
pub struct UnpackSession<'w> {
    protocol: &'w Protocol,
    world: &'w World,
    resolved: HashMap<TokenId, &'w dyn Token>,
}

impl<'w> UnpackSession<'w> {
    fn new(protocol: &'w Protocol, world: &'w World) -> Self {
        Self {
            protocol,
            world,
            resolved: HashMap::new(),
        }
    }

    pub fn unpack_token(&mut self, packed: &PackedToken) -> Result<UnpackedToken<'w>, PackError> {
        match packed {
            PackedToken::Reference(id) => {
                if let Some(token) = self.resolved.get(id) {
                    return Ok(UnpackedToken::Local(*token));
                }
                let world: &'w World = self.world;
                let token = world.token(*id).ok_or(PackError::UnknownToken { id: *id })?;
                self.resolved.insert(*id, token);
                Ok(UnpackedToken::Local(token))
            }
            PackedToken::Value { flavor, payload } => Ok(UnpackedToken::Detached(
                self.protocol.token_kinds.decode(*flavor, payload)?,
            )),
        }
    }

    pub fn unpack_message(
        &mut self,
        flavor: Flavor,
        bytes: &[u8],
    ) -> Result<Box<dyn Message>, PackError> {
        let packed: PackedMessage = bincode::deserialize(bytes)?;
        let mut message = self.protocol.message_kinds.decode(flavor, &packed.payload)?;

        for packed_token in &packed.tokens_to_add {
            match self.unpack_token(packed_token)? {
                UnpackedToken::Detached(token) => message.core_mut().push_token_to_add(token),
                UnpackedToken::Local(token) => {
                    return Err(PackError::UnexpectedReference {
                        id: token.id().unwrap_or_default(),
                    });
                }
            }
        }

        for removal in &packed.tokens_to_remove {
            let snapshot = match &removal.snapshot {
                Some(packed_token) => match self.unpack_token(packed_token)? {
                    UnpackedToken::Detached(token) => Some(token),
                    UnpackedToken::Local(token) => Some(token.clone_token()),
                },
                None => self.world.token(removal.id).map(|token| token.clone_token()),
            };
            message
                .core_mut()
                .push_token_to_remove(TokenRemoval::new(removal.id, snapshot));
        }

        if let Some(sender_id) = packed.sender_id {
            message.core_mut().set_sender_id(sender_id);
        }
        message.core_mut().set_sync_error(packed.sync_error);
        Ok(message)
    }
}
