use crate::Identity;

/// Pipe target the forum of every participant registers for.
pub const FORUM_TARGET: Identity = 1;
/// Pipe target used by the join handshake conversation.
pub const HANDSHAKE_TARGET: Identity = 2;
