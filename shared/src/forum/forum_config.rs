use crate::{constants::FORUM_TARGET, Identity};

/// Contains Config properties which will be used by a Forum
#[derive(Clone, Debug)]
pub struct ForumConfig {
    /// Pipe target the forum sends and listens on. Every participant must
    /// agree on it.
    pub target: Identity,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            target: FORUM_TARGET,
        }
    }
}
