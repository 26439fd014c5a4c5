/// The "guess my number" sample game: the referee picks a secret number and
/// players narrow the range down until someone guesses it
use serde::{Deserialize, Serialize};

use concord_shared::{
    Access, Identity, Message, MessageCore, Protocol, ProtocolPlugin, Reporter, Token, TokenCore,
    World,
};

/// Root token holding the secret and the range that hasn't been ruled out
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuessState {
    core: TokenCore,
    number: Option<i32>,
    lower_bound: i32,
    upper_bound: i32,
    winner: Option<Identity>,
    ticks: u32,
}

impl GuessState {
    pub fn number(&self) -> Option<i32> {
        self.number
    }

    pub fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    pub fn winner(&self) -> Option<Identity> {
        self.winner
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Game ticks seen so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Whether `guess` is still strictly inside the open range
    pub fn is_plausible(&self, guess: i32) -> bool {
        self.lower_bound < guess && guess < self.upper_bound
    }

    pub fn set_secret(&mut self, number: i32, lower_bound: i32, upper_bound: i32) {
        self.require(Access::ReadWrite, "set_secret");
        self.number = Some(number);
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self.notify("set_secret");
    }

    pub fn record_guess(&mut self, player: Identity, guess: i32) {
        self.require(Access::ReadWrite, "record_guess");
        let Some(number) = self.number else {
            return;
        };
        if self.winner.is_some() {
            return;
        }

        if guess == number {
            self.winner = Some(player);
        } else if guess < number {
            self.lower_bound = self.lower_bound.max(guess);
        } else {
            self.upper_bound = self.upper_bound.min(guess);
        }
        self.notify("record_guess");
    }
}

impl Token for GuessState {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TokenCore {
        &mut self.core
    }

    fn watchable_methods() -> &'static [&'static str] {
        &["set_secret", "record_guess"]
    }

    fn on_update_game(&mut self, _dt: f32) {
        self.require(Access::ReadWrite, "on_update_game");
        self.ticks += 1;
    }

    fn on_report_to_referee(&self, reporter: &mut Reporter) {
        if self.number.is_none() {
            reporter.send_message(Box::new(PickNumber::new(0, 10)));
        }
    }
}

/// Sent by the referee to choose the secret number
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PickNumber {
    #[serde(skip)]
    core: MessageCore,
    pub number: i32,
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl PickNumber {
    /// Picks a random number strictly between the bounds
    pub fn new(lower_bound: i32, upper_bound: i32) -> Self {
        let number = fastrand::i32(lower_bound + 1..upper_bound);
        Self::exactly(number, lower_bound, upper_bound)
    }

    pub fn exactly(number: i32, lower_bound: i32, upper_bound: i32) -> Self {
        Self {
            core: MessageCore::default(),
            number,
            lower_bound,
            upper_bound,
        }
    }
}

impl Message for PickNumber {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, _sender: Identity) -> bool {
        self.was_sent_by_referee()
            && self.lower_bound < self.number
            && self.number < self.upper_bound
            && world.root::<GuessState>().number().is_none()
    }

    fn on_execute(&mut self, world: &mut World) {
        world
            .root_mut::<GuessState>()
            .set_secret(self.number, self.lower_bound, self.upper_bound);
    }
}

/// One player's guess
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GuessNumber {
    #[serde(skip)]
    core: MessageCore,
    pub player: Identity,
    pub guess: i32,
}

impl GuessNumber {
    pub fn new(player: Identity, guess: i32) -> Self {
        Self {
            core: MessageCore::default(),
            player,
            guess,
        }
    }
}

impl Message for GuessNumber {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, sender: Identity) -> bool {
        let state = world.root::<GuessState>();
        sender == self.player
            && state.number().is_some()
            && !state.is_game_over()
            && state.is_plausible(self.guess)
    }

    /// A stale guess leaves the range as it is, so it is always safe to
    /// apply
    fn on_check_for_soft_sync_error(&self, _world: &World) -> bool {
        true
    }

    fn on_execute(&mut self, world: &mut World) {
        let state = world.root_mut::<GuessState>();
        state.record_guess(self.player, self.guess);
        if state.is_game_over() {
            world.end_game();
        }
    }
}

pub struct GuessMyNumber;

impl ProtocolPlugin for GuessMyNumber {
    fn build(&self, protocol: &mut Protocol) {
        protocol
            .add_token::<GuessState>()
            .add_message::<PickNumber>()
            .add_message::<GuessNumber>();
    }
}

pub fn protocol() -> Protocol {
    let mut protocol = Protocol::builder();
    protocol.add_plugin(GuessMyNumber);
    protocol.build()
}

pub fn world() -> World {
    World::new(GuessState::default())
}
