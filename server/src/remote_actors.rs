use std::collections::HashMap;

use log::{debug, warn};

use concord_shared::{
    ForumRole, IdFactory, Identity, Message, PipeIndex, Reaction, Route, SyncError, World,
};

/// Stands in, on the server, for the actors of every connected client.
///
/// Messages from a client are only trusted as far as the server's own world
/// agrees with them. One that fails its check is either flagged as a soft
/// sync error (applied, relayed to everyone, and echoed back to its sender)
/// or a hard sync error (never applied, and returned to its sender alone so
/// it can be undone there).
#[derive(Default)]
pub struct RemoteActors {
    clients: HashMap<PipeIndex, IdFactory>,
}

impl RemoteActors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts accepting messages arriving on `index` from the holder of
    /// `id_factory`
    pub fn add_client(&mut self, index: PipeIndex, id_factory: IdFactory) {
        self.clients.insert(index, id_factory);
    }

    pub fn remove_client(&mut self, index: PipeIndex) -> Option<IdFactory> {
        self.clients.remove(&index)
    }

    pub fn client(&self, index: PipeIndex) -> Option<&IdFactory> {
        self.clients.get(&index)
    }

    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn identities(&self) -> impl Iterator<Item = Identity> + '_ {
        self.clients.values().map(IdFactory::get)
    }
}

impl ForumRole for RemoteActors {
    fn route(
        &mut self,
        world: &World,
        message: &mut dyn Message,
        source: Option<PipeIndex>,
    ) -> Route {
        // the referee checked it already
        let Some(index) = source else {
            return Route::Relay;
        };

        let Some(id_factory) = self.clients.get(&index) else {
            warn!(
                "Dropping {} from pipe {}, no client is connected there",
                message.message_name(),
                index
            );
            return Route::Drop;
        };

        if !message.was_sent_by(id_factory.get()) {
            warn!(
                "Dropping {} on pipe {}, claims sender {:?} but the client is {}",
                message.message_name(),
                index,
                message.sender_id(),
                id_factory.get()
            );
            return Route::Drop;
        }

        if message.check(world, id_factory) {
            return Route::Relay;
        }

        if message.on_check_for_soft_sync_error(world) {
            debug!(
                "{} from {} is a soft sync error",
                message.message_name(),
                id_factory.get()
            );
            message.set_sync_error(SyncError::Soft);
            Route::RelayAndReturn
        } else {
            debug!(
                "{} from {} is a hard sync error",
                message.message_name(),
                id_factory.get()
            );
            message.set_sync_error(SyncError::Hard);
            Route::Return
        }
    }

    fn apply(
        &mut self,
        world: &mut World,
        message: &mut dyn Message,
        _: Option<PipeIndex>,
    ) -> Vec<Reaction> {
        if message.sync_error() == SyncError::Hard {
            return vec![Reaction::HardSyncError];
        }

        match message.try_execute(world) {
            Ok(()) => vec![Reaction::Message],
            Err(err) => {
                warn!("Failed to execute {}: {}", message.message_name(), err);
                Vec::new()
            }
        }
    }
}
