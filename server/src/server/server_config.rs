use std::{default::Default, time::Duration};

use concord_shared::{constants::HANDSHAKE_TARGET, ForumConfig, Identity};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure the forum every client is connected to
    pub forum: ForumConfig,
    /// Pipe target the join handshake runs on. Must match the clients'.
    pub handshake_target: Identity,
    /// How many clients may join. Client identities run from 1 up to this.
    pub max_clients: Identity,
    /// Game time that passes on every call to `Server::update`
    pub tick_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            forum: ForumConfig::default(),
            handshake_target: HANDSHAKE_TARGET,
            max_clients: 8,
            tick_interval: Duration::from_millis(50),
        }
    }
}
