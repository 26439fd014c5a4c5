use serde::{Deserialize, Serialize};

use crate::{conversation::Letter, Flavor, IdFactory};

/// Sent by a client that wants to take part in the game
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest;

impl Letter for JoinRequest {
    const FLAVOR: Flavor = 0;
}

/// The server's answer, carrying the client's identity and id block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGrant {
    pub id_factory: IdFactory,
}

impl Letter for JoinGrant {
    const FLAVOR: Flavor = 1;
}
