use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

use crate::Identity;

use super::{token::short_type_name, Token, TokenError};

/// Per-role companion of a token, e.g. the sprite a GUI keeps for it.
/// Gets told whenever one of the token methods it watches runs.
pub trait TokenExtension: Send {
    fn on_token_method(&mut self, token: &dyn Token, method: &'static str);
}

/// Names a family of actors (e.g. "gui", "ai") that share extension bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoleKind(pub &'static str);

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a world knows about each actor it builds extensions for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorHandle {
    pub identity: Identity,
    pub kind: RoleKind,
}

impl ActorHandle {
    pub fn new(identity: Identity, kind: RoleKind) -> Self {
        Self { identity, kind }
    }
}

pub(crate) struct BoundExtension {
    watches: Vec<&'static str>,
    extension: Box<dyn TokenExtension>,
}

impl BoundExtension {
    pub(crate) fn watches(&self, method: &str) -> bool {
        self.watches.iter().any(|watched| *watched == method)
    }

    pub(crate) fn extension_mut(&mut self) -> &mut dyn TokenExtension {
        self.extension.as_mut()
    }
}

type BuildFn =
    Box<dyn Fn(&ActorHandle, &dyn Token) -> Result<Box<dyn TokenExtension>, TokenError> + Send>;

struct Binding {
    watches: Vec<&'static str>,
    build: BuildFn,
}

/// Table of (token type, role kind) → extension factory.
/// Bindings are validated when they are registered, not when tokens show up.
#[derive(Default)]
pub struct ExtensionRegistry {
    bindings: HashMap<(TypeId, RoleKind), Binding>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_bind<T, E, F>(
        &mut self,
        kind: RoleKind,
        watches: &[&'static str],
        build: F,
    ) -> Result<&mut Self, TokenError>
    where
        T: Token,
        E: TokenExtension + 'static,
        F: Fn(&ActorHandle, &T) -> E + Send + 'static,
    {
        let token = short_type_name::<T>();
        for method in watches {
            if !T::watchable_methods().contains(method) {
                return Err(TokenError::NoSuchMethodToWatch {
                    token,
                    method: *method,
                });
            }
        }

        let key = (TypeId::of::<T>(), kind);
        if self.bindings.contains_key(&key) {
            return Err(TokenError::ExtensionAlreadyBound {
                token,
                kind: kind.0,
            });
        }

        let build: BuildFn = Box::new(move |actor: &ActorHandle, token: &dyn Token| {
            let concrete =
                token
                    .downcast_ref::<T>()
                    .ok_or_else(|| TokenError::WrongTokenType {
                        expected: short_type_name::<T>(),
                        found: token.token_name(),
                    })?;
            Ok(Box::new(build(actor, concrete)) as Box<dyn TokenExtension>)
        });
        self.bindings.insert(
            key,
            Binding {
                watches: watches.to_vec(),
                build,
            },
        );
        Ok(self)
    }

    /// # Panics
    ///
    /// Panics if a watched method is not declared by `T` or if the pair is
    /// already bound. Consider using `try_bind` for non-panicking error
    /// handling.
    pub fn bind<T, E, F>(&mut self, kind: RoleKind, watches: &[&'static str], build: F) -> &mut Self
    where
        T: Token,
        E: TokenExtension + 'static,
        F: Fn(&ActorHandle, &T) -> E + Send + 'static,
    {
        self.try_bind::<T, E, F>(kind, watches, build)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn is_bound<T: Token>(&self, kind: RoleKind) -> bool {
        self.bindings.contains_key(&(TypeId::of::<T>(), kind))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    // Crate-public

    /// Builds zero or one extension per actor for `token`
    pub(crate) fn try_build(
        &self,
        actors: &[ActorHandle],
        token: &dyn Token,
    ) -> Result<Vec<BoundExtension>, TokenError> {
        let type_id = Any::type_id(token.as_any());
        let mut extensions = Vec::new();
        for actor in actors {
            if let Some(binding) = self.bindings.get(&(type_id, actor.kind)) {
                extensions.push(BoundExtension {
                    watches: binding.watches.clone(),
                    extension: (binding.build)(actor, token)?,
                });
            }
        }
        Ok(extensions)
    }
}
