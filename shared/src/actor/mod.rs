#[allow(clippy::module_inception)]
mod actor;
mod error;
mod referee;

pub use actor::Actor;
pub use error::ActorError;
pub use referee::{Referee, Reporter, REFEREE_KIND};
