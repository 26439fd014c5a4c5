use concord_client::{Client, ClientConfig};
use concord_server::{Server, ServerConfig};
use concord_shared::{pipe::LocalPipe, Identity, Protocol, RoleKind, World, REFEREE_ID};

/// Identity a client's end of the pipe carries until the server grants one
pub const PENDING_IDENTITY: Identity = Identity::MAX;

/// A server and its clients, all in one process, connected by local pipes
pub struct Harness {
    pub server: Server,
    pub clients: Vec<Client>,
}

impl Harness {
    /// Accepts `num_clients` clients. Nothing is exchanged until the first
    /// tick, so client subscriptions can still be made.
    pub fn new(
        num_clients: usize,
        protocol: impl Fn() -> Protocol,
        world: impl Fn() -> World,
        kind: RoleKind,
    ) -> Self {
        let server_config = ServerConfig {
            max_clients: num_clients as Identity,
            ..ServerConfig::default()
        };
        let mut server = Server::new(server_config, protocol(), world());

        let mut clients = Vec::with_capacity(num_clients);
        for _ in 0..num_clients {
            let (server_end, client_end) = LocalPipe::pair(REFEREE_ID, PENDING_IDENTITY);
            server.accept(Box::new(server_end)).unwrap();
            clients.push(Client::new(
                ClientConfig::default(),
                protocol(),
                world(),
                kind,
                Box::new(client_end),
            ));
        }

        Self { server, clients }
    }

    /// Runs handshakes until every client has joined, then starts the game
    ///
    /// # Panics
    ///
    /// Panics if the handshakes don't finish within a few ticks.
    pub fn join_and_start(&mut self) {
        for _ in 0..8 {
            if self.is_joined() {
                self.server.start().unwrap();
                return;
            }
            self.tick();
        }
        panic!("clients did not finish joining");
    }

    pub fn is_joined(&self) -> bool {
        self.server.num_clients() == self.clients.len()
            && self.clients.iter().all(Client::is_joined)
    }

    /// Updates the server, then every client in order
    pub fn tick(&mut self) {
        self.server.update();
        for client in self.clients.iter_mut() {
            client.update().unwrap();
        }
    }

    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn client(&mut self, index: usize) -> &mut Client {
        &mut self.clients[index]
    }

    /// Every world, server first
    pub fn worlds(&self) -> impl Iterator<Item = &World> {
        std::iter::once(self.server.world()).chain(self.clients.iter().map(Client::world))
    }
}
