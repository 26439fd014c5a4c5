use crossbeam_channel::{unbounded, Receiver};
use log::info;

use concord_shared::{
    conversation::{Conversation, Exchange, Request},
    handshake::{JoinGrant, JoinRequest},
    pipe::Pipe,
    Actor, ActorHandle, Forum, Identity, Message, Protocol, RoleKind, World,
};

use crate::{ClientConfig, ClientError, RemoteForum};

/// Runs one replica of a game, with a single actor, over one pipe to the
/// server.
///
/// The handshake starts as soon as the client is created. Subscriptions must
/// be made (through [`Client::forum_mut`]) before it completes, because the
/// forum is locked the moment the server's grant arrives.
pub struct Client {
    config: ClientConfig,
    world: World,
    forum: Forum<RemoteForum>,
    actor: Actor,
    handshake: Option<Conversation>,
    grants: Receiver<JoinGrant>,
}

impl Client {
    /// Create a new Client, asking the server on the other end of `pipe` to
    /// let an actor of the given kind join
    pub fn new(
        config: ClientConfig,
        protocol: Protocol,
        world: World,
        kind: RoleKind,
        mut pipe: Box<dyn Pipe>,
    ) -> Self {
        // keep whatever the server relays before the grant is read
        pipe.register(config.forum.target);

        let (sender, grants) = unbounded();
        let request: Box<dyn Exchange> = Box::new(Request::new(JoinRequest, move |grant: JoinGrant| {
            // the client owns the receiver for as long as the request runs
            let _ = sender.send(grant);
            Vec::new()
        }));
        let handshake = Conversation::new(
            pipe,
            config.handshake_target,
            vec![request],
        );

        Self {
            forum: Forum::new(config.forum.clone(), protocol, RemoteForum::new()),
            config,
            world,
            actor: Actor::new(kind),
            handshake: Some(handshake),
            grants,
        }
    }

    /// Must be called regularly. Advances the handshake and, once joined,
    /// the forum and the world.
    pub fn update(&mut self) -> Result<(), ClientError> {
        if let Some(mut handshake) = self.handshake.take() {
            handshake.update();
            match self.grants.try_recv() {
                Ok(grant) => self.join(handshake.into_pipe(), grant)?,
                Err(_) => self.handshake = Some(handshake),
            }
        }

        if self.forum.is_locked() {
            self.forum.try_update(&mut self.world)?;
            if !self.world.has_game_ended() {
                self.world
                    .update_tokens(self.config.tick_interval.as_secs_f32());
            }
        }
        Ok(())
    }

    pub fn is_joined(&self) -> bool {
        self.actor.is_connected()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.actor.identity()
    }

    /// Sends `message` from this client's actor. Returns whether it passed
    /// its check against the local world.
    pub fn send_message(&mut self, message: Box<dyn Message>) -> Result<bool, ClientError> {
        if !self.is_joined() {
            return Err(ClientError::NotJoined);
        }
        Ok(self.actor.try_send_message(&self.world, message)?)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn forum(&self) -> &Forum<RemoteForum> {
        &self.forum
    }

    pub fn forum_mut(&mut self) -> &mut Forum<RemoteForum> {
        &mut self.forum
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Private

    fn join(&mut self, mut pipe: Box<dyn Pipe>, grant: JoinGrant) -> Result<(), ClientError> {
        let JoinGrant { id_factory } = grant;
        let identity = id_factory.get();

        pipe.set_identity(identity);
        self.forum.role_mut().set_identity(identity);
        self.forum.connect(pipe);

        self.world
            .try_set_actors(vec![ActorHandle::new(identity, self.actor.kind())])?;
        self.actor
            .try_connect(id_factory, self.forum.publisher())?;
        self.forum.try_lock()?;

        info!("Joined the game as {}", identity);
        Ok(())
    }
}
