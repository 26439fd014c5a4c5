use thiserror::Error;

use concord_shared::{ActorError, ForumError, IdFactoryError, Identity, WorldError};

/// Errors a [`crate::Server`] can run into
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Every identity the server can hand out is taken
    #[error("Server is full, it only accepts {max_clients} clients")]
    Full {
        max_clients: Identity,
    },

    /// Clients can only join before the game starts
    #[error("The game has already started, no more clients can join")]
    AlreadyStarted,

    /// Handing out an identity failed
    #[error("Id factory error: {0}")]
    IdFactory(#[from] IdFactoryError),

    /// The referee could not send
    #[error("Actor error: {0}")]
    Actor(#[from] ActorError),

    /// The forum refused the operation
    #[error("Forum error: {0}")]
    Forum(#[from] ForumError),

    /// Token extensions could not be built for the referee
    #[error("World error: {0}")]
    World(#[from] WorldError),
}
