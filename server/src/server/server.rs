use log::{info, warn};

use concord_shared::{
    conversation::{Conversation, Exchange, Reply},
    handshake::{JoinGrant, JoinRequest},
    pipe::Pipe,
    Forum, IdFactory, IdSpace, Identity, Message, Protocol, Referee, World,
    REFEREE_ID, ROOT_TOKEN_ID,
};

use crate::{RemoteActors, ServerConfig, ServerError};

struct Handshake {
    id_factory: IdFactory,
    conversation: Conversation,
}

/// Runs the authoritative copy of a game.
///
/// Clients are accepted (each over its own pipe) before the game starts.
/// Every accepted client is handed an identity and an [`IdFactory`] through
/// a join handshake, after which its pipe is connected to the server's
/// forum. Once [`Server::start`]ed, each [`Server::update`] relays client
/// messages, lets tokens report to the referee, and advances the world by
/// one tick.
pub struct Server {
    config: ServerConfig,
    world: World,
    forum: Forum<RemoteActors>,
    referee: Referee,
    id_space: IdSpace,
    handshakes: Vec<Handshake>,
    next_identity: Identity,
}

impl Server {
    /// Create a new Server, refereeing `world`
    pub fn new(config: ServerConfig, protocol: Protocol, world: World) -> Self {
        let forum = Forum::new(config.forum.clone(), protocol, RemoteActors::new());
        let id_space = IdSpace::new(ROOT_TOKEN_ID + 1, config.max_clients + 1);

        let mut referee = Referee::new();
        referee.connect(id_space.factory(REFEREE_ID), forum.publisher());

        Self {
            config,
            world,
            forum,
            referee,
            id_space,
            handshakes: Vec::new(),
            next_identity: REFEREE_ID + 1,
        }
    }

    // Connections

    /// Starts the join handshake on `pipe`, returning the identity the
    /// client will be given
    pub fn accept(&mut self, mut pipe: Box<dyn Pipe>) -> Result<Identity, ServerError> {
        if self.forum.is_locked() {
            return Err(ServerError::AlreadyStarted);
        }
        if self.next_identity > self.config.max_clients {
            return Err(ServerError::Full {
                max_clients: self.config.max_clients,
            });
        }

        let identity = self.next_identity;
        let id_factory = self.id_space.try_factory(identity)?;
        self.next_identity += 1;

        pipe.set_identity(REFEREE_ID);
        let grant = id_factory.clone();
        let reply: Box<dyn Exchange> = Box::new(Reply::new(move |_: JoinRequest| {
            (
                JoinGrant {
                    id_factory: grant.clone(),
                },
                Vec::new(),
            )
        }));
        let conversation = Conversation::new(
            pipe,
            self.config.handshake_target,
            vec![reply],
        );

        info!("Accepted a connection, it will join as {}", identity);
        self.handshakes.push(Handshake {
            id_factory,
            conversation,
        });
        Ok(identity)
    }

    /// Clients whose handshake has finished
    pub fn num_clients(&self) -> usize {
        self.forum.role().num_clients()
    }

    /// Clients still in the middle of their handshake
    pub fn num_joining(&self) -> usize {
        self.handshakes.len()
    }

    // Game

    /// Locks the forum and tells the world which actors are watching it
    pub fn start(&mut self) -> Result<(), ServerError> {
        let actors = self.referee.actor().handle().into_iter().collect();
        self.world.try_set_actors(actors)?;
        self.forum.try_lock()?;
        info!(
            "Game started with {} clients, {} still joining",
            self.num_clients(),
            self.num_joining()
        );
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.forum.is_locked()
    }

    /// Must be called regularly. Advances handshakes and, once the game is
    /// started, the forum, the referee, and the world. Once the game has
    /// ended only the forum keeps running.
    pub fn update(&mut self) {
        self.update_handshakes();

        if !self.forum.is_locked() {
            return;
        }

        self.forum.update(&mut self.world);
        // late messages still drain, but nothing new is asked for
        if self.world.has_game_ended() {
            return;
        }
        if let Err(err) = self.referee.try_report(&self.world) {
            warn!("Referee failed to report: {}", err);
        }
        self.world
            .update_tokens(self.config.tick_interval.as_secs_f32());
    }

    /// Sends `message` as the referee. Returns whether it passed its check.
    pub fn send_message(&mut self, message: Box<dyn Message>) -> Result<bool, ServerError> {
        Ok(self.referee.try_send_message(&self.world, message)?)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn referee(&self) -> &Referee {
        &self.referee
    }

    pub fn forum(&self) -> &Forum<RemoteActors> {
        &self.forum
    }

    /// Subscriptions can only be made through this before the game starts
    pub fn forum_mut(&mut self) -> &mut Forum<RemoteActors> {
        &mut self.forum
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    // Private

    fn update_handshakes(&mut self) {
        let mut joining = Vec::with_capacity(self.handshakes.len());
        for mut handshake in self.handshakes.drain(..) {
            if !handshake.conversation.update() {
                joining.push(handshake);
                continue;
            }

            let identity = handshake.id_factory.get();
            let index = self.forum.connect(handshake.conversation.into_pipe());
            self.forum
                .role_mut()
                .add_client(index, handshake.id_factory);
            info!("Client {} joined on pipe {}", identity, index);
        }
        self.handshakes = joining;
    }
}
