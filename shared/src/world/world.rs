use std::{collections::BTreeMap, fmt};

use serde::{ser::Error as _, Serialize, Serializer};

use crate::{
    token::{short_type_name, ActorHandle, ExtensionRegistry, Registration, Token},
    TokenId, ROOT_TOKEN_ID,
};

use super::{UnlockGuard, WorldError, WorldGate};

/// Arena of every token taking part in one game.
///
/// The world starts out locked. Tokens can only be mutated while it is
/// unlocked, which normally only happens while a message executes.
pub struct World {
    tokens: BTreeMap<TokenId, Box<dyn Token>>,
    gate: WorldGate,
    actors: Vec<ActorHandle>,
    extensions: ExtensionRegistry,
    game_ended: bool,
}

impl World {
    /// Creates a world around `root`, which always gets id 0
    pub fn new<R: Token>(mut root: R) -> Self {
        root.core_mut().set_id(ROOT_TOKEN_ID);

        let mut world = Self {
            tokens: BTreeMap::new(),
            gate: WorldGate::new_locked(),
            actors: Vec::new(),
            extensions: ExtensionRegistry::new(),
            game_ended: false,
        };
        world.add_token(Box::new(root));
        world
    }

    // Lock

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    /// Unlocks the world until the returned guard is dropped.
    /// Unlocking an already unlocked world is a no-op.
    pub fn unlock(&mut self) -> UnlockGuard<'_> {
        UnlockGuard::new(self)
    }

    pub fn with_unlocked<T>(&mut self, f: impl FnOnce(&mut World) -> T) -> T {
        let mut guard = self.unlock();
        f(&mut guard)
    }

    // Tokens

    pub fn try_add_token(&mut self, mut token: Box<dyn Token>) -> Result<TokenId, WorldError> {
        let name = token.token_name();
        let Some(id) = token.id() else {
            return Err(WorldError::MissingId { token: name });
        };
        if self.tokens.contains_key(&id) {
            return Err(WorldError::AlreadyInWorld { token: name, id });
        }
        match token.registration() {
            Registration::Unregistered => {}
            Registration::Registered => {
                return Err(WorldError::AlreadyInWorld { token: name, id });
            }
            Registration::Removed => {
                return Err(WorldError::UsingRemovedToken { token: name, id });
            }
        }

        let extensions = self.extensions.try_build(&self.actors, token.as_ref())?;
        token.core_mut().register(self.gate.clone(), extensions);
        token.on_add_to_world(self);

        self.tokens.insert(id, token);
        Ok(id)
    }

    /// # Panics
    ///
    /// Panics if the token has no id, is already part of a world, was removed
    /// without being reset, or its extensions can't be built.
    /// Consider using `try_add_token` for non-panicking error handling.
    pub fn add_token(&mut self, token: Box<dyn Token>) -> TokenId {
        self.try_add_token(token)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Takes a token out of the world. It comes back in the removed state,
    /// with its id.
    pub fn try_remove_token(&mut self, id: TokenId) -> Result<Box<dyn Token>, WorldError> {
        if id == ROOT_TOKEN_ID {
            return Err(WorldError::CantRemoveRoot);
        }
        let mut token = self
            .tokens
            .remove(&id)
            .ok_or(WorldError::NotInWorld { id })?;

        token.on_remove_from_world(self);
        token.core_mut().unregister();
        Ok(token)
    }

    /// # Panics
    ///
    /// Panics if no such token is registered, or if `id` is the root.
    /// Consider using `try_remove_token` for non-panicking error handling.
    pub fn remove_token(&mut self, id: TokenId) -> Box<dyn Token> {
        self.try_remove_token(id)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.tokens.contains_key(&id)
    }

    pub fn token(&self, id: TokenId) -> Option<&dyn Token> {
        self.tokens.get(&id).map(|token| token.as_ref())
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut dyn Token> {
        match self.tokens.get_mut(&id) {
            Some(token) => Some(token.as_mut()),
            None => None,
        }
    }

    pub fn try_token_as<T: Token>(&self, id: TokenId) -> Result<&T, WorldError> {
        let token = self.token(id).ok_or(WorldError::NotInWorld { id })?;
        token
            .downcast_ref::<T>()
            .ok_or_else(|| WorldError::WrongTokenType {
                id,
                expected: short_type_name::<T>(),
                found: token.token_name(),
            })
    }

    pub fn token_as<T: Token>(&self, id: TokenId) -> Option<&T> {
        self.try_token_as(id).ok()
    }

    pub fn token_as_mut<T: Token>(&mut self, id: TokenId) -> Option<&mut T> {
        self.tokens
            .get_mut(&id)
            .and_then(|token| token.downcast_mut::<T>())
    }

    pub fn try_root<T: Token>(&self) -> Result<&T, WorldError> {
        self.try_token_as(ROOT_TOKEN_ID)
    }

    /// # Panics
    ///
    /// Panics if the root token is not a `T`.
    pub fn root<T: Token>(&self) -> &T {
        self.try_root()
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// # Panics
    ///
    /// Panics if the root token is not a `T`.
    pub fn root_mut<T: Token>(&mut self) -> &mut T {
        self.token_as_mut(ROOT_TOKEN_ID)
            .unwrap_or_else(|| panic!("Root token is not a {}", short_type_name::<T>()))
    }

    /// Every registered token, in id order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Token> {
        self.tokens.values().map(|token| token.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Largest id in use. New id-spaces start right after it.
    pub fn last_id(&self) -> TokenId {
        self.tokens
            .keys()
            .next_back()
            .copied()
            .unwrap_or(ROOT_TOKEN_ID)
    }

    // Extensions

    pub fn actors(&self) -> &[ActorHandle] {
        &self.actors
    }

    /// Replaces the actors extensions are built for, rebuilding the
    /// extensions of every registered token
    pub fn try_set_actors(&mut self, actors: Vec<ActorHandle>) -> Result<(), WorldError> {
        self.actors = actors;
        for token in self.tokens.values_mut() {
            let extensions = self.extensions.try_build(&self.actors, token.as_ref())?;
            token.core_mut().set_extensions(extensions);
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if an extension can't be built.
    pub fn set_actors(&mut self, actors: Vec<ActorHandle>) {
        self.try_set_actors(actors)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    // Game loop

    /// Gives every token its per-tick update, with the world unlocked
    pub fn update_tokens(&mut self, dt: f32) {
        let mut world = self.unlock();
        for token in world.tokens.values_mut() {
            token.on_update_game(dt);
        }
    }

    pub fn has_game_ended(&self) -> bool {
        self.game_ended
    }

    /// Ends the game and lets every token wrap up. Server and clients stop
    /// ticking the world from here on. Ending it twice is a no-op.
    pub fn try_end_game(&mut self) -> Result<(), WorldError> {
        if self.is_locked() {
            return Err(WorldError::Locked {
                operation: "end_game",
            });
        }
        if self.game_ended {
            return Ok(());
        }
        self.game_ended = true;
        for token in self.tokens.values_mut() {
            token.on_finish_game();
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the world is locked. Call it from a message's `on_execute`.
    pub fn end_game(&mut self) {
        self.try_end_game()
            .unwrap_or_else(|e| panic!("{}", e))
    }

    // Crate-public

    pub(crate) fn gate(&self) -> &WorldGate {
        &self.gate
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("locked", &self.is_locked())
            .field("game_ended", &self.game_ended)
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// Worlds are never sent anywhere whole. Tokens travel one at a time.
impl Serialize for World {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom(
            "A World can't be serialized. Pack individual tokens instead",
        ))
    }
}
