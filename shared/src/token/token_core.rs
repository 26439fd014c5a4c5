use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{world::WorldGate, IdFactory, TokenId};

use super::{extension::BoundExtension, TokenError};

/// Where a token currently stands in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// Created but not (yet) part of a world
    Unregistered,
    /// Owned by a world
    Registered,
    /// Taken out of a world. Frozen until `reset_registration()`
    Removed,
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Unregistered => write!(f, "unregistered"),
            Registration::Registered => write!(f, "registered"),
            Registration::Removed => write!(f, "removed"),
        }
    }
}

/// Which lifecycle states a token method may run in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Any state
    ReadOnly,
    /// Registered, and only while the world is unlocked
    ReadWrite,
    /// Unregistered only, to finish building a token before it is added
    BeforeWorld,
}

/// Bookkeeping every token embeds: id, lifecycle, parent, and the handle to
/// the gate of the world it lives in.
///
/// Only the id and the parent id cross the wire. A clone is a detached copy:
/// same id and parent, unregistered, without extensions.
#[derive(Default, Serialize, Deserialize)]
#[serde(from = "CoreRepr", into = "CoreRepr")]
pub struct TokenCore {
    id: Option<TokenId>,
    registration: Registration,
    parent: Option<TokenId>,
    gate: Option<WorldGate>,
    extensions: Vec<BoundExtension>,
}

impl Default for Registration {
    fn default() -> Self {
        Registration::Unregistered
    }
}

impl TokenCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<TokenId> {
        self.id
    }

    pub fn registration(&self) -> Registration {
        self.registration
    }

    pub fn parent(&self) -> Option<TokenId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<TokenId>) {
        self.parent = parent;
    }

    pub fn num_extensions(&self) -> usize {
        self.extensions.len()
    }

    /// Takes the next id from `id_factory`
    pub fn try_assign_id(
        &mut self,
        token: &'static str,
        id_factory: &mut IdFactory,
    ) -> Result<TokenId, TokenError> {
        if let Some(id) = self.id {
            return Err(TokenError::AlreadyHasId { token, id });
        }
        let id = id_factory.next();
        self.id = Some(id);
        Ok(id)
    }

    pub fn try_check_access(
        &self,
        token: &'static str,
        access: Access,
        method: &'static str,
    ) -> Result<(), TokenError> {
        let allowed = match access {
            Access::ReadOnly => true,
            Access::BeforeWorld => self.registration == Registration::Unregistered,
            Access::ReadWrite => {
                if self.registration == Registration::Registered {
                    if self.gate.as_ref().map_or(true, WorldGate::is_locked) {
                        return Err(TokenError::WorldLocked { token, method });
                    }
                    true
                } else {
                    false
                }
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(TokenError::InvalidAccess {
                token,
                method,
                state: self.registration,
            })
        }
    }

    /// Returns the token to the unregistered state so it can be added to a
    /// world again. The id is kept.
    pub fn reset_registration(&mut self) {
        self.registration = Registration::Unregistered;
        self.gate = None;
        self.extensions.clear();
    }

    // Crate-public

    pub(crate) fn set_id(&mut self, id: TokenId) {
        self.id = Some(id);
    }

    pub(crate) fn register(&mut self, gate: WorldGate, extensions: Vec<BoundExtension>) {
        self.registration = Registration::Registered;
        self.gate = Some(gate);
        self.extensions = extensions;
    }

    pub(crate) fn unregister(&mut self) {
        self.registration = Registration::Removed;
        self.gate = None;
        self.extensions.clear();
    }

    pub(crate) fn set_extensions(&mut self, extensions: Vec<BoundExtension>) {
        self.extensions = extensions;
    }

    pub(crate) fn take_extensions(&mut self) -> Vec<BoundExtension> {
        std::mem::take(&mut self.extensions)
    }
}

impl Clone for TokenCore {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            registration: Registration::Unregistered,
            parent: self.parent,
            gate: None,
            extensions: Vec::new(),
        }
    }
}

impl fmt::Debug for TokenCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCore")
            .field("id", &self.id)
            .field("registration", &self.registration)
            .field("parent", &self.parent)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct CoreRepr {
    id: Option<TokenId>,
    parent: Option<TokenId>,
}

impl From<CoreRepr> for TokenCore {
    fn from(repr: CoreRepr) -> Self {
        Self {
            id: repr.id,
            parent: repr.parent,
            ..Self::default()
        }
    }
}

impl From<TokenCore> for CoreRepr {
    fn from(core: TokenCore) -> Self {
        Self {
            id: core.id,
            parent: core.parent,
        }
    }
}
