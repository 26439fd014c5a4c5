use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Identity, TokenId};

/// Errors that can occur while carving up a token id-space
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdFactoryError {
    /// An id-space needs room for at least one participant
    #[error("IdSpace spacing must be at least 1")]
    ZeroSpacing,

    /// The identity does not fit into the id-space
    #[error("Identity {identity} does not fit into an IdSpace with spacing {spacing}")]
    IdentityOutOfRange { identity: Identity, spacing: u32 },
}

/// The block of token ids shared by every participant of one game.
///
/// Ids are interleaved: participant `n` owns `base + n`, `base + n + spacing`,
/// `base + n + 2 * spacing`, ... so that every participant can create tokens
/// locally without ever colliding with anyone else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdSpace {
    base: TokenId,
    spacing: u32,
}

impl IdSpace {
    pub fn try_new(base: TokenId, spacing: u32) -> Result<Self, IdFactoryError> {
        if spacing == 0 {
            return Err(IdFactoryError::ZeroSpacing);
        }
        Ok(Self { base, spacing })
    }

    /// # Panics
    ///
    /// Panics if `spacing` is zero.
    pub fn new(base: TokenId, spacing: u32) -> Self {
        Self::try_new(base, spacing)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn base(&self) -> TokenId {
        self.base
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn try_factory(&self, identity: Identity) -> Result<IdFactory, IdFactoryError> {
        if identity >= self.spacing {
            return Err(IdFactoryError::IdentityOutOfRange {
                identity,
                spacing: self.spacing,
            });
        }
        Ok(IdFactory {
            identity,
            spacing: self.spacing,
            base: self.base,
            num_ids_assigned: 0,
        })
    }

    /// # Panics
    ///
    /// Panics if `identity` is not smaller than the spacing.
    pub fn factory(&self, identity: Identity) -> IdFactory {
        self.try_factory(identity)
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

/// Hands out the token ids owned by one participant, and doubles as that
/// participant's identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFactory {
    identity: Identity,
    spacing: u32,
    base: TokenId,
    num_ids_assigned: u64,
}

impl IdFactory {
    /// Identity of the participant this factory belongs to
    pub fn get(&self) -> Identity {
        self.identity
    }

    pub fn next(&mut self) -> TokenId {
        let next_id = self.base
            + self.num_ids_assigned * u64::from(self.spacing)
            + u64::from(self.identity);
        self.num_ids_assigned += 1;
        next_id
    }

    /// Whether `id` could have been issued by this factory
    pub fn contains(&self, id: TokenId) -> bool {
        if id < self.base {
            return false;
        }
        (id - self.base) % u64::from(self.spacing) == u64::from(self.identity)
    }

    pub fn num_ids_assigned(&self) -> u64 {
        self.num_ids_assigned
    }
}
