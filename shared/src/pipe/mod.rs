mod error;
mod local_pipe;

pub use error::PipeError;
pub use local_pipe::LocalPipe;

use crate::{Flavor, Identity, Ticker};

/// Where a packet is going, who first sent it, and its place in that
/// sender's sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    pub target: Identity,
    pub origin: Identity,
    pub ticker: Ticker,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub tag: Tag,
    pub flavor: Flavor,
    pub payload: Box<[u8]>,
}

/// One end of a bidirectional, polled connection.
///
/// Packets are multiplexed by target, so one pipe can carry a handshake and
/// a forum at the same time. Nothing here ever blocks.
pub trait Pipe: Send {
    /// Identity of this end. Stamped as the origin of every fresh send.
    fn get_identity(&self) -> Identity;

    fn set_identity(&mut self, identity: Identity);

    /// Starts keeping packets addressed to `target`
    fn register(&mut self, target: Identity);

    /// Takes every packet received for `target` so far
    fn receive(&mut self, target: Identity) -> Vec<Packet>;

    /// Queues a packet under a fresh tag, one ticker after the last
    fn send(&mut self, target: Identity, flavor: Flavor, payload: &[u8]) -> Tag;

    /// Queues a packet under an existing tag, for relaying
    fn resend(&mut self, tag: Tag, flavor: Flavor, payload: &[u8]);

    /// Flushes queued packets, returning what went out
    fn deliver(&mut self) -> Vec<(Tag, Flavor)>;
}
