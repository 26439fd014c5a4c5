use log::warn;

use crate::{Message, World};

use super::PipeIndex;

/// Where a publication goes besides the local world
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Neither relayed nor applied
    Drop,
    /// Applied here and sent nowhere
    Keep,
    /// To every pipe except the one it came from
    Relay,
    /// Back to the pipe it came from, only
    Return,
    /// Both of the above
    RelayAndReturn,
}

impl Route {
    pub fn relays(&self) -> bool {
        matches!(self, Route::Relay | Route::RelayAndReturn)
    }

    pub fn returns(&self) -> bool {
        matches!(self, Route::Return | Route::RelayAndReturn)
    }
}

/// Which subscriber list a message is reported to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reaction {
    Message,
    SoftSyncError,
    HardSyncError,
}

/// What a forum does with each publication, depending on which side of the
/// network it runs on.
///
/// `source` is the pipe a publication arrived on, or `None` for messages
/// published locally. The route is decided (and any sync error flagged)
/// before the message is relayed, and the message is relayed before it is
/// applied.
pub trait ForumRole {
    fn route(&mut self, world: &World, message: &mut dyn Message, source: Option<PipeIndex>)
        -> Route;

    fn apply(
        &mut self,
        world: &mut World,
        message: &mut dyn Message,
        source: Option<PipeIndex>,
    ) -> Vec<Reaction>;
}

/// Single-process game: every message was checked by its actor, so it is
/// simply executed
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRole;

impl ForumRole for LocalRole {
    fn route(&mut self, _: &World, _: &mut dyn Message, _: Option<PipeIndex>) -> Route {
        Route::Relay
    }

    fn apply(
        &mut self,
        world: &mut World,
        message: &mut dyn Message,
        _: Option<PipeIndex>,
    ) -> Vec<Reaction> {
        match message.try_execute(world) {
            Ok(()) => vec![Reaction::Message],
            Err(err) => {
                warn!("Failed to execute {}: {}", message.message_name(), err);
                Vec::new()
            }
        }
    }
}
