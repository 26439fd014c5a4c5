use thiserror::Error;

use concord_shared::{ActorError, ForumError, WorldError};

/// Errors a [`crate::Client`] can run into
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Messages can only be sent once the server has granted an identity
    #[error("Client has not joined a game yet")]
    NotJoined,

    /// The client's actor could not send
    #[error("Actor error: {0}")]
    Actor(#[from] ActorError),

    /// The forum refused the operation
    #[error("Forum error: {0}")]
    Forum(#[from] ForumError),

    /// Token extensions could not be built for the client's actor
    #[error("World error: {0}")]
    World(#[from] WorldError),
}
