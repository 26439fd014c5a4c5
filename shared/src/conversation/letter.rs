use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::{pipe::Packet, Flavor};

use super::ConversationError;

/// A small serde type exchanged outside of any forum, e.g. during a
/// handshake. Every letter type needs its own flavor within a conversation.
pub trait Letter: Serialize + DeserializeOwned + Send + 'static {
    const FLAVOR: Flavor;
}

/// Letters received but not yet claimed, and letters waiting to be sent
#[derive(Default)]
pub struct Mailbox {
    inbox: Vec<Packet>,
    outbox: Vec<(Flavor, Vec<u8>)>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_send<L: Letter>(&mut self, letter: &L) -> Result<(), ConversationError> {
        let bytes = bincode::serialize(letter).map_err(|err| ConversationError::Codec {
            flavor: L::FLAVOR,
            reason: err.to_string(),
        })?;
        self.outbox.push((L::FLAVOR, bytes));
        Ok(())
    }

    /// Queues `letter`, logging instead of failing if it can't be encoded
    pub fn send<L: Letter>(&mut self, letter: &L) {
        if let Err(err) = self.try_send(letter) {
            warn!("{}", err);
        }
    }

    /// Claims the oldest received letter of type `L`. Letters that fail to
    /// decode are logged and dropped.
    pub fn take<L: Letter>(&mut self) -> Option<L> {
        while let Some(position) = self
            .inbox
            .iter()
            .position(|packet| packet.flavor == L::FLAVOR)
        {
            let packet = self.inbox.remove(position);
            match bincode::deserialize(&packet.payload) {
                Ok(letter) => return Some(letter),
                Err(err) => warn!(
                    "{}",
                    ConversationError::Codec {
                        flavor: L::FLAVOR,
                        reason: err.to_string(),
                    }
                ),
            }
        }
        None
    }

    pub fn num_unclaimed(&self) -> usize {
        self.inbox.len()
    }

    // Crate-public

    pub(crate) fn receive(&mut self, packets: Vec<Packet>) {
        self.inbox.extend(packets);
    }

    pub(crate) fn drain_outbox(&mut self) -> std::vec::Drain<'_, (Flavor, Vec<u8>)> {
        self.outbox.drain(..)
    }
}
