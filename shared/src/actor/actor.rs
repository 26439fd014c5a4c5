use log::debug;

use crate::{
    forum::Publisher, ActorHandle, IdFactory, Identity, Message, RoleKind, World,
};

use super::ActorError;

/// A participant that creates messages: a player, an AI, a GUI, or the
/// referee.
///
/// An actor is connected once, after the game has handed it an identity
/// (and with it an [`IdFactory`]) and a publisher into the forum.
pub struct Actor {
    kind: RoleKind,
    id_factory: Option<IdFactory>,
    publisher: Option<Box<dyn Publisher + Send>>,
}

impl Actor {
    pub fn new(kind: RoleKind) -> Self {
        Self {
            kind,
            id_factory: None,
            publisher: None,
        }
    }

    pub fn try_connect(
        &mut self,
        id_factory: IdFactory,
        publisher: impl Publisher + Send + 'static,
    ) -> Result<(), ActorError> {
        if let Some(current) = &self.id_factory {
            return Err(ActorError::AlreadyConnected {
                identity: current.get(),
            });
        }
        self.id_factory = Some(id_factory);
        self.publisher = Some(Box::new(publisher));
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the actor is already connected.
    pub fn connect(&mut self, id_factory: IdFactory, publisher: impl Publisher + Send + 'static) {
        self.try_connect(id_factory, publisher)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn is_connected(&self) -> bool {
        self.id_factory.is_some()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.id_factory.as_ref().map(IdFactory::get)
    }

    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    /// What token extensions get to see of this actor, once connected
    pub fn handle(&self) -> Option<ActorHandle> {
        self.identity()
            .map(|identity| ActorHandle::new(identity, self.kind))
    }

    pub fn is_referee(&self) -> bool {
        self.identity() == Some(crate::REFEREE_ID)
    }

    pub fn id_factory(&self) -> Option<&IdFactory> {
        self.id_factory.as_ref()
    }

    /// Stamps `message` with this actor's identity, gives every token it
    /// adds an id, and checks it against `world`.
    ///
    /// A message that passes is published and `Ok(true)` is returned. A
    /// message that fails is dropped and `Ok(false)` is returned; the ids it
    /// consumed are not handed out again.
    pub fn try_send_message(
        &mut self,
        world: &World,
        mut message: Box<dyn Message>,
    ) -> Result<bool, ActorError> {
        let (Some(id_factory), Some(publisher)) = (&mut self.id_factory, &self.publisher) else {
            return Err(ActorError::NotConnected);
        };

        message.try_set_sender_id(id_factory.get())?;
        message.try_assign_token_ids(id_factory)?;

        if !message.check(world, id_factory) {
            debug!(
                "{} from {} failed its check",
                message.message_name(),
                id_factory.get()
            );
            return Ok(false);
        }

        publisher.publish(message);
        Ok(true)
    }

    /// # Panics
    ///
    /// Panics if the actor is not connected, or the message was already
    /// sent.
    pub fn send_message(&mut self, world: &World, message: Box<dyn Message>) -> bool {
        self.try_send_message(world, message)
            .unwrap_or_else(|e| panic!("{}", e))
    }
}
