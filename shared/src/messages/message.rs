use std::{any::Any, collections::HashSet, fmt::Debug};

use crate::{
    token::short_type_name, Access, IdFactory, Identity, Token, World, WorldError, REFEREE_ID,
    ROOT_TOKEN_ID,
};

use super::{MessageCore, MessageError, SyncError, TokenRemoval};

/// A checkable, executable, undoable change to the world.
///
/// Every participant replays `on_execute` for every message, so it must be
/// deterministic and must only depend on the world and the message itself.
pub trait Message: MessageAny + Send + Debug + 'static {
    fn core(&self) -> &MessageCore;

    fn core_mut(&mut self) -> &mut MessageCore;

    fn message_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Game rules: may `sender` send this message given the current world?
    fn on_check(&self, _world: &World, _sender: Identity) -> bool {
        true
    }

    /// Asked by the referee when `on_check` failed. `true` turns the
    /// rejection into a soft sync error: the message is applied everywhere
    /// and every participant resynchronizes in `on_soft_sync_error`.
    fn on_check_for_soft_sync_error(&self, _world: &World) -> bool {
        false
    }

    fn on_execute(&mut self, _world: &mut World) {}

    fn on_soft_sync_error(&mut self, _world: &mut World) {}

    /// Runs on the sender after the tokens of a rejected message have been
    /// restored. Messages that can be rejected must override this.
    fn on_hard_sync_error(&mut self, _world: &mut World) -> Result<(), MessageError> {
        Err(MessageError::UnhandledSyncError {
            message: self.message_name(),
        })
    }

    // Tokens

    /// Schedules a new, unregistered token to be added when the message executes
    fn try_add_token<T: Token>(&mut self, token: T) -> Result<(), MessageError>
    where
        Self: Sized,
    {
        self.try_check_unsent()?;
        token.try_require(Access::BeforeWorld, "add_token")?;
        self.core_mut().push_token_to_add(Box::new(token));
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the message was sent already or the token is part of a world.
    fn add_token<T: Token>(&mut self, token: T)
    where
        Self: Sized,
    {
        self.try_add_token(token)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Schedules `token` to be removed when the message executes
    fn try_remove_token(&mut self, token: &dyn Token) -> Result<(), MessageError> {
        self.try_check_unsent()?;
        let id = token.id().ok_or_else(|| MessageError::MissingTokenId {
            message: self.message_name(),
            token: token.token_name(),
        })?;
        self.core_mut()
            .push_token_to_remove(TokenRemoval::new(id, Some(token.clone_token())));
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the message was sent already or the token has no id.
    fn remove_token(&mut self, token: &dyn Token) {
        self.try_remove_token(token)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    // Provenance

    fn sender_id(&self) -> Option<Identity> {
        self.core().sender_id()
    }

    fn sync_error(&self) -> SyncError {
        self.core().sync_error()
    }

    fn was_sent(&self) -> bool {
        self.sender_id().is_some()
    }

    fn was_sent_by(&self, identity: Identity) -> bool {
        self.sender_id() == Some(identity)
    }

    fn was_sent_by_referee(&self) -> bool {
        self.was_sent_by(REFEREE_ID)
    }

    fn try_check_unsent(&self) -> Result<(), MessageError> {
        if self.was_sent() {
            Err(MessageError::AlreadySent {
                message: self.message_name(),
            })
        } else {
            Ok(())
        }
    }
}

/// Object-safe plumbing implemented for every message
pub trait MessageAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: Message> MessageAny for M {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Message {
    pub fn is<M: Message>(&self) -> bool {
        self.as_any().is::<M>()
    }

    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    pub fn downcast_mut<M: Message>(&mut self) -> Option<&mut M> {
        self.as_any_mut().downcast_mut::<M>()
    }

    /// Stamps the sender. From here on the token lists are frozen.
    pub fn try_set_sender_id(&mut self, sender_id: Identity) -> Result<(), MessageError> {
        self.try_check_unsent()?;
        self.core_mut().set_sender_id(sender_id);
        Ok(())
    }

    pub fn set_sync_error(&mut self, sync_error: SyncError) {
        self.core_mut().set_sync_error(sync_error);
    }

    /// Gives every token to add an id from the sender's factory
    pub fn try_assign_token_ids(&mut self, id_factory: &mut IdFactory) -> Result<(), MessageError> {
        for token in self.core_mut().tokens_to_add_mut() {
            token.try_assign_id(id_factory)?;
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if a token to add already has an id.
    pub fn assign_token_ids(&mut self, id_factory: &mut IdFactory) {
        self.try_assign_token_ids(id_factory)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Structural checks first, then the game's own `on_check`. New tokens
    /// must be fresh and carry ids from `id_factory`, removed tokens must
    /// still exist.
    pub fn check(&self, world: &World, id_factory: &IdFactory) -> bool {
        for token in self.core().tokens_to_add() {
            let Some(id) = token.id() else {
                return false;
            };
            if world.contains(id) || !id_factory.contains(id) || token.is_registered() {
                return false;
            }
        }

        for removal in self.core().tokens_to_remove() {
            if !world.contains(removal.id()) {
                return false;
            }
        }

        self.on_check(world, id_factory.get())
    }

    /// Adds the new tokens, removes the old ones, then runs `on_execute`,
    /// all with the world unlocked. The world is left untouched when any of
    /// the tokens doesn't fit it.
    pub fn try_execute(&mut self, world: &mut World) -> Result<(), MessageError> {
        self.try_fit(world)?;

        let additions: Vec<Box<dyn Token>> = self
            .core()
            .tokens_to_add()
            .map(|token| token.clone_token())
            .collect();
        let removals: Vec<_> = self
            .core()
            .tokens_to_remove()
            .iter()
            .map(TokenRemoval::id)
            .collect();

        let mut world = world.unlock();
        let mut added = Vec::with_capacity(additions.len());
        for token in additions {
            match world.try_add_token(token) {
                Ok(id) => added.push(id),
                Err(err) => {
                    for id in added {
                        let _ = world.try_remove_token(id);
                    }
                    return Err(err.into());
                }
            }
        }
        for id in removals {
            world.try_remove_token(id)?;
        }
        self.on_execute(&mut world);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the message's tokens don't fit the world.
    pub fn execute(&mut self, world: &mut World) {
        self.try_execute(world)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn handle_soft_sync_error(&mut self, world: &mut World) {
        let mut world = world.unlock();
        self.on_soft_sync_error(&mut world);
    }

    /// Undoes a speculative execution: drops the tokens it added, restores
    /// the tokens it removed (same ids), then runs `on_hard_sync_error`
    pub fn try_handle_hard_sync_error(&mut self, world: &mut World) -> Result<(), MessageError> {
        let added: Vec<_> = self
            .core()
            .tokens_to_add()
            .filter_map(|token| token.id())
            .collect();
        let restored: Vec<Box<dyn Token>> = self
            .core()
            .tokens_to_remove()
            .iter()
            .filter(|removal| !world.contains(removal.id()))
            .filter_map(|removal| removal.snapshot().map(|token| token.clone_token()))
            .collect();

        let mut world = world.unlock();
        for id in added {
            if world.contains(id) {
                world.try_remove_token(id)?;
            }
        }
        for mut token in restored {
            token.core_mut().reset_registration();
            world.try_add_token(token)?;
        }
        self.on_hard_sync_error(&mut world)
    }

    /// # Panics
    ///
    /// Panics if the message does not handle hard sync errors.
    pub fn handle_hard_sync_error(&mut self, world: &mut World) {
        self.try_handle_hard_sync_error(world)
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

impl dyn Message {
    // Private

    /// Everything `try_execute` would trip over, checked up front
    fn try_fit(&self, world: &World) -> Result<(), MessageError> {
        let mut seen = HashSet::new();
        for token in self.core().tokens_to_add() {
            let name = token.token_name();
            let id = token.id().ok_or(WorldError::MissingId { token: name })?;
            if world.contains(id) || !seen.insert(id) {
                return Err(WorldError::AlreadyInWorld { token: name, id }.into());
            }
        }

        let mut removed = HashSet::new();
        for removal in self.core().tokens_to_remove() {
            let id = removal.id();
            if id == ROOT_TOKEN_ID {
                return Err(WorldError::CantRemoveRoot.into());
            }
            if !world.contains(id) || !removed.insert(id) {
                return Err(WorldError::NotInWorld { id }.into());
            }
        }
        Ok(())
    }
}
