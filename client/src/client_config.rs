use std::{default::Default, time::Duration};

use concord_shared::{constants::HANDSHAKE_TARGET, ForumConfig, Identity};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Used to configure the forum connected to the server
    pub forum: ForumConfig,
    /// Pipe target the join handshake runs on. Must match the server's.
    pub handshake_target: Identity,
    /// Game time that passes on every call to `Client::update`
    pub tick_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            forum: ForumConfig::default(),
            handshake_target: HANDSHAKE_TARGET,
            tick_interval: Duration::from_millis(50),
        }
    }
}
