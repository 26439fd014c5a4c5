use std::{any::Any, fmt::Debug};

use crate::{actor::Reporter, IdFactory, TokenId, World};

use super::{Access, Registration, TokenCore, TokenError};

/// A piece of shared game state living in a [`World`].
///
/// Implementors embed a [`TokenCore`] and guard every domain method with
/// [`Token::require`]. Methods that extensions may watch are listed in
/// [`Token::watchable_methods`] and report themselves through
/// [`Token::notify`].
pub trait Token: TokenAny + Send + Debug + 'static {
    fn core(&self) -> &TokenCore;

    fn core_mut(&mut self) -> &mut TokenCore;

    fn token_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    fn watchable_methods() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }

    /// Called right before the token is inserted into `world`
    fn on_add_to_world(&mut self, _world: &World) {}

    /// Called right after the token was taken out of `world`
    fn on_remove_from_world(&mut self, _world: &World) {}

    /// Called once per game tick, with the world unlocked
    fn on_update_game(&mut self, _dt: f32) {}

    /// Called once when the game ends, with the world unlocked
    fn on_finish_game(&mut self) {}

    /// Lets the token ask the referee to send messages on its behalf
    fn on_report_to_referee(&self, _reporter: &mut Reporter) {}

    fn id(&self) -> Option<TokenId> {
        self.core().id()
    }

    fn parent(&self) -> Option<TokenId> {
        self.core().parent()
    }

    fn registration(&self) -> Registration {
        self.core().registration()
    }

    fn is_registered(&self) -> bool {
        self.registration() == Registration::Registered
    }

    fn try_assign_id(&mut self, id_factory: &mut IdFactory) -> Result<TokenId, TokenError> {
        let name = self.token_name();
        self.core_mut().try_assign_id(name, id_factory)
    }

    /// # Panics
    ///
    /// Panics if the token already has an id.
    /// Consider using `try_assign_id` for non-panicking error handling.
    fn assign_id(&mut self, id_factory: &mut IdFactory) -> TokenId {
        self.try_assign_id(id_factory)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    fn try_require(&self, access: Access, method: &'static str) -> Result<(), TokenError> {
        self.core()
            .try_check_access(self.token_name(), access, method)
    }

    /// Guard for domain methods. Validates the lifecycle on every call.
    ///
    /// # Panics
    ///
    /// Panics if `method` may not run in the token's current state.
    fn require(&self, access: Access, method: &'static str) {
        if let Err(err) = self.try_require(access, method) {
            panic!("{}", err);
        }
    }

    /// Tells every extension watching `method` that it just ran
    fn notify(&mut self, method: &'static str)
    where
        Self: Sized,
    {
        let mut extensions = self.core_mut().take_extensions();
        for bound in extensions.iter_mut() {
            if bound.watches(method) {
                bound.extension_mut().on_token_method(&*self, method);
            }
        }
        self.core_mut().set_extensions(extensions);
    }
}

/// Object-safe plumbing implemented for every `Token + Clone`
pub trait TokenAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Detached copy: same id and fields, unregistered
    fn clone_token(&self) -> Box<dyn Token>;
}

impl<T: Token + Clone> TokenAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_token(&self) -> Box<dyn Token> {
        Box::new(self.clone())
    }
}

impl dyn Token {
    pub fn is<T: Token>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Token>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Token>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
