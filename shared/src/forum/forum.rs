use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::{
    pipe::{Pipe, Tag},
    Identity, Message, Protocol, Ticker, World,
};

use super::{
    publisher::Publication, ForumConfig, ForumError, ForumPublisher, ForumRole, LocalRole,
    Member, PipeIndex, Publisher, Reaction, Route, Subscriber,
};

type Callback = Box<dyn FnMut(&World, &dyn Message)>;

/// Publish/subscribe hub between the actors of one process and, through its
/// pipes, every other process in the game.
///
/// Subscriptions are made while the forum is unlocked. Once locked, every
/// [`Forum::update`] receives remote publications, routes and applies all
/// pending publications through the [`ForumRole`], runs subscribers, and
/// flushes the pipes.
pub struct Forum<R: ForumRole = LocalRole> {
    config: ForumConfig,
    protocol: Protocol,
    role: R,
    pipes: Vec<Box<dyn Pipe>>,
    history: HashMap<Identity, Ticker>,
    subscriptions: HashMap<(TypeId, Reaction), Vec<Callback>>,
    sender: Sender<Publication>,
    receiver: Receiver<Publication>,
    locked: bool,
}

impl Forum<LocalRole> {
    pub fn local(config: ForumConfig, protocol: Protocol) -> Self {
        Self::new(config, protocol, LocalRole)
    }
}

impl<R: ForumRole> Forum<R> {
    pub fn new(config: ForumConfig, protocol: Protocol, role: R) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            config,
            protocol,
            role,
            pipes: Vec::new(),
            history: HashMap::new(),
            subscriptions: HashMap::new(),
            sender,
            receiver,
            locked: false,
        }
    }

    // Pipes

    /// Starts listening on `pipe`, returning the index publications from it
    /// are tagged with
    pub fn connect(&mut self, mut pipe: Box<dyn Pipe>) -> PipeIndex {
        pipe.register(self.config.target);
        self.pipes.push(pipe);
        self.pipes.len() - 1
    }

    pub fn num_pipes(&self) -> usize {
        self.pipes.len()
    }

    /// Hands back every pipe (still open) and resets the forum to a fresh,
    /// unlocked state
    pub fn teardown(&mut self) -> Vec<Box<dyn Pipe>> {
        self.history.clear();
        self.subscriptions.clear();
        self.receiver.try_iter().for_each(drop);
        self.locked = false;
        std::mem::take(&mut self.pipes)
    }

    // Lock

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn try_lock(&mut self) -> Result<(), ForumError> {
        if self.locked {
            return Err(ForumError::Locked { operation: "lock" });
        }
        self.locked = true;
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the forum is already locked.
    pub fn lock(&mut self) {
        self.try_lock()
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Unlocks the forum, forgetting every subscription and every
    /// publication that was still pending
    pub fn try_unlock(&mut self) -> Result<(), ForumError> {
        if !self.locked {
            return Err(ForumError::Unlocked {
                operation: "unlock",
            });
        }
        self.locked = false;
        self.subscriptions.clear();
        self.receiver.try_iter().for_each(drop);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the forum is not locked.
    pub fn unlock(&mut self) {
        self.try_unlock()
            .unwrap_or_else(|e| panic!("{}", e))
    }

    // Subscriptions

    pub fn try_subscribe_to<M, F>(&mut self, reaction: Reaction, mut callback: F) -> Result<(), ForumError>
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        if self.locked {
            return Err(ForumError::Locked {
                operation: "subscribe",
            });
        }
        let callback: Callback = Box::new(move |world: &World, message: &dyn Message| {
            if let Some(message) = message.downcast_ref::<M>() {
                callback(world, message);
            }
        });
        self.subscriptions
            .entry((TypeId::of::<M>(), reaction))
            .or_default()
            .push(callback);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the forum is locked.
    pub fn subscribe_to<M, F>(&mut self, reaction: Reaction, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.try_subscribe_to::<M, F>(reaction, callback)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Forgets every `reaction` callback made for `M`, returning how many
    /// there were
    pub fn try_unsubscribe_from<M: Message>(&mut self, reaction: Reaction) -> Result<usize, ForumError> {
        if self.locked {
            return Err(ForumError::Locked {
                operation: "unsubscribe",
            });
        }
        Ok(self
            .subscriptions
            .remove(&(TypeId::of::<M>(), reaction))
            .map_or(0, |callbacks| callbacks.len()))
    }

    /// # Panics
    ///
    /// Panics if the forum is locked.
    pub fn unsubscribe_from<M: Message>(&mut self, reaction: Reaction) -> usize {
        self.try_unsubscribe_from::<M>(reaction)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn num_subscriptions(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    // Publishing

    pub fn publish(&self, message: Box<dyn Message>) {
        self.publisher().publish(message);
    }

    pub fn publisher(&self) -> ForumPublisher {
        ForumPublisher::new(self.sender.clone())
    }

    pub fn num_pending(&self) -> usize {
        self.receiver.len()
    }

    // Update

    pub fn try_update(&mut self, world: &mut World) -> Result<(), ForumError> {
        if !self.locked {
            return Err(ForumError::Unlocked {
                operation: "update",
            });
        }

        self.receive_publications(world);
        while let Ok(publication) = self.receiver.try_recv() {
            self.dispatch(world, publication);
        }
        self.deliver();
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the forum is not locked.
    pub fn update(&mut self, world: &mut World) {
        self.try_update(world)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Highest ticker accepted (or sent) so far for `origin`
    pub fn last_ticker(&self, origin: Identity) -> Option<Ticker> {
        self.history.get(&origin).copied()
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn role_mut(&mut self) -> &mut R {
        &mut self.role
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn config(&self) -> &ForumConfig {
        &self.config
    }

    // Private

    fn receive_publications(&mut self, world: &World) {
        let target = self.config.target;
        let mut session = self.protocol.unpack_session(world);

        for (index, pipe) in self.pipes.iter_mut().enumerate() {
            for packet in pipe.receive(target) {
                let Tag { origin, ticker, .. } = packet.tag;
                let last = self.history.get(&origin).copied().unwrap_or_default();
                if ticker <= last {
                    debug!(
                        "Dropping packet {} from {}, already saw {}",
                        ticker, origin, last
                    );
                    continue;
                }
                self.history.insert(origin, ticker);

                match session.unpack_message(packet.flavor, &packet.payload) {
                    Ok(message) => {
                        // the forum owns the receiver, so this can't fail
                        let _ = self.sender.send(Publication {
                            message,
                            source: Some((index, packet.tag)),
                        });
                    }
                    Err(err) => warn!(
                        "Failed to unpack packet {} from {}: {}",
                        ticker, origin, err
                    ),
                }
            }
        }
    }

    fn dispatch(&mut self, world: &mut World, publication: Publication) {
        let Publication {
            mut message,
            source,
        } = publication;
        let source_index = source.map(|(index, _)| index);

        let route = self.role.route(world, message.as_mut(), source_index);
        if route == Route::Drop {
            return;
        }
        self.relay(message.as_ref(), route, source);

        for reaction in self.role.apply(world, message.as_mut(), source_index) {
            let key = (Any::type_id(message.as_any()), reaction);
            if let Some(callbacks) = self.subscriptions.get_mut(&key) {
                for callback in callbacks.iter_mut() {
                    callback(world, message.as_ref());
                }
            }
        }
    }

    fn relay(&mut self, message: &dyn Message, route: Route, source: Option<(PipeIndex, Tag)>) {
        if self.pipes.is_empty() || !(route.relays() || route.returns()) {
            return;
        }

        let (flavor, payload) = match self.protocol.pack_message(message) {
            Ok(packed) => packed,
            Err(err) => {
                warn!("Failed to pack {}: {}", message.message_name(), err);
                return;
            }
        };

        let target = self.config.target;
        for (index, pipe) in self.pipes.iter_mut().enumerate() {
            match source {
                None => {
                    if route.relays() {
                        pipe.send(target, flavor, &payload);
                    }
                }
                Some((source_index, _)) if source_index == index => {
                    if route.returns() {
                        pipe.send(target, flavor, &payload);
                    }
                }
                Some((_, tag)) => {
                    if route.relays() {
                        pipe.resend(Tag { target, ..tag }, flavor, &payload);
                    }
                }
            }
        }
    }

    fn deliver(&mut self) {
        for pipe in self.pipes.iter_mut() {
            for (tag, _) in pipe.deliver() {
                let last = self.history.entry(tag.origin).or_default();
                *last = (*last).max(tag.ticker);
            }
        }
    }
}

impl<R: ForumRole> Publisher for Forum<R> {
    fn publish(&self, message: Box<dyn Message>) {
        Forum::publish(self, message);
    }
}

impl<R: ForumRole> Subscriber for Forum<R> {
    fn subscribe<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.subscribe_to::<M, F>(Reaction::Message, callback);
    }

    fn subscribe_to_soft_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.subscribe_to::<M, F>(Reaction::SoftSyncError, callback);
    }

    fn subscribe_to_hard_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.subscribe_to::<M, F>(Reaction::HardSyncError, callback);
    }

    fn unsubscribe<M: Message>(&mut self) {
        self.unsubscribe_from::<M>(Reaction::Message);
    }

    fn unsubscribe_from_soft_sync_error<M: Message>(&mut self) {
        self.unsubscribe_from::<M>(Reaction::SoftSyncError);
    }

    fn unsubscribe_from_hard_sync_error<M: Message>(&mut self) {
        self.unsubscribe_from::<M>(Reaction::HardSyncError);
    }
}

impl<R: ForumRole> Member for Forum<R> {
    fn lock(&mut self) {
        Forum::lock(self);
    }

    fn unlock(&mut self) {
        Forum::unlock(self);
    }

    fn is_locked(&self) -> bool {
        Forum::is_locked(self)
    }

    fn update(&mut self, world: &mut World) {
        Forum::update(self, world);
    }

    fn teardown(&mut self) -> Vec<Box<dyn Pipe>> {
        Forum::teardown(self)
    }
}
