mod error;
mod extension;
#[allow(clippy::module_inception)]
mod token;
mod token_core;

pub use error::TokenError;
pub use extension::{ActorHandle, ExtensionRegistry, RoleKind, TokenExtension};
pub use token::{Token, TokenAny};
pub use token_core::{Access, Registration, TokenCore};

pub(crate) use extension::BoundExtension;
pub(crate) use token::short_type_name;
