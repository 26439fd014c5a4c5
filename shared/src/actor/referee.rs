use log::info;

use crate::{forum::Publisher, IdFactory, Message, RoleKind, World, REFEREE_ID};

use super::{Actor, ActorError};

pub const REFEREE_KIND: RoleKind = RoleKind("referee");

/// Collects the messages tokens want the referee to send while it looks
/// over the world
#[derive(Default)]
pub struct Reporter {
    messages: Vec<Box<dyn Message>>,
}

impl Reporter {
    pub fn send_message(&mut self, message: Box<dyn Message>) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The authoritative actor. It lives on the server (or in the single
/// process of a local game) and always has identity 0.
pub struct Referee {
    actor: Actor,
}

impl Referee {
    pub fn new() -> Self {
        Self {
            actor: Actor::new(REFEREE_KIND),
        }
    }

    pub fn try_connect(
        &mut self,
        id_factory: IdFactory,
        publisher: impl Publisher + Send + 'static,
    ) -> Result<(), ActorError> {
        if id_factory.get() != REFEREE_ID {
            return Err(ActorError::NotReferee {
                identity: id_factory.get(),
            });
        }
        self.actor.try_connect(id_factory, publisher)
    }

    /// # Panics
    ///
    /// Panics if `id_factory` is not the referee's, or the referee is
    /// already connected.
    pub fn connect(&mut self, id_factory: IdFactory, publisher: impl Publisher + Send + 'static) {
        self.try_connect(id_factory, publisher)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn try_send_message(
        &mut self,
        world: &World,
        message: Box<dyn Message>,
    ) -> Result<bool, ActorError> {
        self.actor.try_send_message(world, message)
    }

    /// # Panics
    ///
    /// Panics if the referee is not connected.
    pub fn send_message(&mut self, world: &World, message: Box<dyn Message>) -> bool {
        self.actor.send_message(world, message)
    }

    /// Gives every token in `world` the chance to report, then sends what
    /// they reported. Returns how many of those messages passed their check.
    pub fn try_report(&mut self, world: &World) -> Result<usize, ActorError> {
        let mut reporter = Reporter::default();
        for token in world.iter() {
            token.on_report_to_referee(&mut reporter);
        }

        if !reporter.is_empty() {
            info!("Referee sending {} reported messages", reporter.len());
        }

        let mut sent = 0;
        for message in reporter.messages {
            if self.actor.try_send_message(world, message)? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// # Panics
    ///
    /// Panics if the referee is not connected.
    pub fn report(&mut self, world: &World) -> usize {
        self.try_report(world)
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Default for Referee {
    fn default() -> Self {
        Self::new()
    }
}
