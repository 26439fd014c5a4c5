mod error;
#[allow(clippy::module_inception)]
mod world;
mod world_gate;

pub use error::WorldError;
pub use world::World;
pub use world_gate::{UnlockGuard, WorldGate};
