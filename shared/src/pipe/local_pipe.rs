/// In-memory pipe implementation
/// Routes packets between two ends in the same process without network I/O
use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;

use crate::{Flavor, Identity, Ticker};

use super::{Packet, Pipe, PipeError, Tag};

/// One end of a connected pair of in-memory pipes
pub struct LocalPipe {
    identity: Identity,
    ticker: Ticker,
    sender: Sender<Packet>,
    receiver: Receiver<Packet>,
    outgoing: Vec<Packet>,
    inboxes: HashMap<Identity, Vec<Packet>>,
}

impl LocalPipe {
    /// Creates two connected ends, identified as `first` and `second`
    pub fn pair(first: Identity, second: Identity) -> (LocalPipe, LocalPipe) {
        let (first_to_second, second_from_first) = unbounded();
        let (second_to_first, first_from_second) = unbounded();

        (
            LocalPipe::new(first, first_to_second, first_from_second),
            LocalPipe::new(second, second_to_first, second_from_first),
        )
    }

    fn new(identity: Identity, sender: Sender<Packet>, receiver: Receiver<Packet>) -> Self {
        Self {
            identity,
            ticker: 0,
            sender,
            receiver,
            outgoing: Vec::new(),
            inboxes: HashMap::new(),
        }
    }

    /// Sorts everything waiting on the channel into the per-target inboxes
    fn pump(&mut self) {
        for packet in self.receiver.try_iter() {
            match self.inboxes.get_mut(&packet.tag.target) {
                Some(inbox) => inbox.push(packet),
                None => warn!(
                    "{}",
                    PipeError::UnregisteredTarget {
                        identity: self.identity,
                        target: packet.tag.target,
                    }
                ),
            }
        }
    }
}

impl Pipe for LocalPipe {
    fn get_identity(&self) -> Identity {
        self.identity
    }

    fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    fn register(&mut self, target: Identity) {
        self.inboxes.entry(target).or_default();
    }

    fn receive(&mut self, target: Identity) -> Vec<Packet> {
        self.pump();
        self.inboxes
            .get_mut(&target)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    fn send(&mut self, target: Identity, flavor: Flavor, payload: &[u8]) -> Tag {
        self.ticker += 1;
        let tag = Tag {
            target,
            origin: self.identity,
            ticker: self.ticker,
        };
        self.resend(tag, flavor, payload);
        tag
    }

    fn resend(&mut self, tag: Tag, flavor: Flavor, payload: &[u8]) {
        self.outgoing.push(Packet {
            tag,
            flavor,
            payload: payload.into(),
        });
    }

    fn deliver(&mut self) -> Vec<(Tag, Flavor)> {
        let mut delivered = Vec::with_capacity(self.outgoing.len());
        for packet in self.outgoing.drain(..) {
            let receipt = (packet.tag, packet.flavor);
            if self.sender.send(packet).is_err() {
                warn!(
                    "{}",
                    PipeError::Disconnected {
                        identity: self.identity
                    }
                );
                break;
            }
            delivered.push(receipt);
        }
        self.outgoing.clear();
        delivered
    }
}
