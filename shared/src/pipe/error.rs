use thiserror::Error;

use crate::Identity;

/// Errors that can occur while moving packets through a pipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeError {
    /// The other end of the pipe is gone
    #[error("Pipe of {identity} is disconnected, the other end was dropped")]
    Disconnected {
        identity: Identity,
    },

    /// A packet arrived for a target nobody registered
    #[error("Pipe of {identity} received a packet for unregistered target {target}")]
    UnregisteredTarget {
        identity: Identity,
        target: Identity,
    },
}
