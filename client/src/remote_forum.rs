use log::warn;

use concord_shared::{
    ForumRole, Identity, Message, PipeIndex, Reaction, Route, SyncError, World,
};

/// The client side of a game, connected to the server over a single pipe.
///
/// Messages from the local actor are shipped to the server and executed
/// right away, before the server has had its say. Messages coming back from
/// the server are either someone else's (executed now) or one of ours that
/// the server disagreed with (resynced or undone).
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoteForum {
    identity: Option<Identity>,
}

impl RemoteForum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity granted by the server
    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    fn is_mine(&self, message: &dyn Message) -> bool {
        self.identity
            .is_some_and(|identity| message.was_sent_by(identity))
    }
}

impl ForumRole for RemoteForum {
    fn route(&mut self, _: &World, _: &mut dyn Message, source: Option<PipeIndex>) -> Route {
        match source {
            None => Route::Relay,
            Some(_) => Route::Keep,
        }
    }

    fn apply(
        &mut self,
        world: &mut World,
        message: &mut dyn Message,
        source: Option<PipeIndex>,
    ) -> Vec<Reaction> {
        if source.is_none() {
            return match message.try_execute(world) {
                Ok(()) => vec![Reaction::Message],
                Err(err) => {
                    warn!("Failed to execute {}: {}", message.message_name(), err);
                    Vec::new()
                }
            };
        }

        let mine = self.is_mine(message);
        match message.sync_error() {
            SyncError::Hard if mine => match message.try_handle_hard_sync_error(world) {
                Ok(()) => vec![Reaction::HardSyncError],
                Err(err) => {
                    warn!("Failed to undo {}: {}", message.message_name(), err);
                    Vec::new()
                }
            },
            SyncError::Hard => {
                warn!(
                    "Ignoring {}, a hard sync error meant for {:?}",
                    message.message_name(),
                    message.sender_id()
                );
                Vec::new()
            }
            sync_error => {
                let mut reactions = Vec::new();
                // ours already ran when it was sent
                if !mine {
                    if let Err(err) = message.try_execute(world) {
                        warn!("Failed to execute {}: {}", message.message_name(), err);
                        return reactions;
                    }
                    reactions.push(Reaction::Message);
                }
                if sync_error == SyncError::Soft {
                    message.handle_soft_sync_error(world);
                    reactions.push(Reaction::SoftSyncError);
                }
                reactions
            }
        }
    }
}
