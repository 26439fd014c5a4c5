use serde::{de::DeserializeOwned, Serialize};

use crate::{Message, Token};

pub mod error;
mod message_kinds;
mod packing;
mod token_kinds;

pub use error::{PackError, ProtocolError};
pub use message_kinds::MessageKinds;
pub use packing::{PackedToken, UnpackSession, UnpackedToken};
pub use token_kinds::TokenKinds;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
#[derive(Default)]
pub struct Protocol {
    pub message_kinds: MessageKinds,
    pub token_kinds: TokenKinds,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn add_message<M: Message + Serialize + DeserializeOwned>(&mut self) -> &mut Self {
        self.check_lock();
        self.message_kinds.add_message::<M>();
        self
    }

    pub fn add_token<T: Token + Clone + Serialize + DeserializeOwned>(&mut self) -> &mut Self {
        self.check_lock();
        self.token_kinds.add_token::<T>();
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(
        &mut self,
        plugin: P,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_message<M: Message + Serialize + DeserializeOwned>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.add_message::<M>();
        Ok(self)
    }

    pub fn try_add_token<T: Token + Clone + Serialize + DeserializeOwned>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.token_kinds.add_token::<T>();
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
