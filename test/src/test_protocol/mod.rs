/// Small board game used to exercise the engine: markers are placed on and
/// cleared from an open board until the referee closes it
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use concord_shared::{
    Access, ActorHandle, Identity, Message, MessageCore, MessageError, Protocol, RoleKind, Token,
    TokenCore, TokenExtension, TokenId, World,
};

pub const GUI: RoleKind = RoleKind("gui");

/// Root token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    core: TokenCore,
    open: bool,
    placed: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            core: TokenCore::default(),
            open: true,
            placed: 0,
        }
    }
}

impl Board {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Markers ever placed, including cleared ones
    pub fn placed(&self) -> u32 {
        self.placed
    }

    pub fn close(&mut self) {
        self.require(Access::ReadWrite, "close");
        self.open = false;
    }

    fn count_placement(&mut self) {
        self.require(Access::ReadWrite, "count_placement");
        self.placed += 1;
    }

    fn uncount_placement(&mut self) {
        self.require(Access::ReadWrite, "uncount_placement");
        self.placed = self.placed.saturating_sub(1);
    }
}

impl Token for Board {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TokenCore {
        &mut self.core
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Marker {
    core: TokenCore,
    owner: Identity,
    label: String,
}

impl Marker {
    pub fn new(owner: Identity, label: &str) -> Self {
        Self {
            core: TokenCore::default(),
            owner,
            label: label.to_string(),
        }
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn relabel(&mut self, label: &str) {
        self.require(Access::ReadWrite, "relabel");
        self.label = label.to_string();
        self.notify("relabel");
    }

    /// Only allowed before the marker is placed
    pub fn set_owner(&mut self, owner: Identity) {
        self.require(Access::BeforeWorld, "set_owner");
        self.owner = owner;
    }
}

impl Token for Marker {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TokenCore {
        &mut self.core
    }

    fn watchable_methods() -> &'static [&'static str] {
        &["relabel"]
    }
}

/// Extension a GUI actor keeps for each marker, recording what it was told
pub struct MarkerSprite {
    pub actor: Identity,
    pub seen: Arc<Mutex<Vec<(Identity, String)>>>,
}

impl TokenExtension for MarkerSprite {
    fn on_token_method(&mut self, token: &dyn Token, method: &'static str) {
        if let Some(marker) = token.downcast_ref::<Marker>() {
            self.seen
                .lock()
                .unwrap()
                .push((self.actor, format!("{} {}", method, marker.label())));
        }
    }
}

/// Binds [`MarkerSprite`] for GUI actors, returning the log they write to
pub fn bind_marker_sprites(world: &mut World) -> Arc<Mutex<Vec<(Identity, String)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let shared = seen.clone();
    world.extensions_mut().bind::<Marker, _, _>(
        GUI,
        &["relabel"],
        move |actor: &ActorHandle, _: &Marker| MarkerSprite {
            actor: actor.identity,
            seen: shared.clone(),
        },
    );
    seen
}

/// Places a new marker on the board
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlaceMarker {
    #[serde(skip)]
    core: MessageCore,
    pub label: String,
}

impl PlaceMarker {
    pub fn new(owner: Identity, label: &str) -> Self {
        let mut message = Self {
            core: MessageCore::default(),
            label: label.to_string(),
        };
        message.add_token(Marker::new(owner, label));
        message
    }

    pub fn marker_id(&self) -> Option<TokenId> {
        self.core().tokens_to_add().next().and_then(|token| token.id())
    }
}

impl Message for PlaceMarker {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, _sender: Identity) -> bool {
        world.root::<Board>().is_open()
    }

    fn on_execute(&mut self, world: &mut World) {
        world.root_mut::<Board>().count_placement();
    }

    /// The marker itself is taken back out by the engine
    fn on_hard_sync_error(&mut self, world: &mut World) -> Result<(), MessageError> {
        world.root_mut::<Board>().uncount_placement();
        Ok(())
    }
}

/// Takes a marker off the board
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClearMarker {
    #[serde(skip)]
    core: MessageCore,
    pub marker: TokenId,
}

impl ClearMarker {
    pub fn new(marker: &dyn Token) -> Self {
        let mut message = Self {
            core: MessageCore::default(),
            marker: marker.id().unwrap_or_default(),
        };
        message.remove_token(marker);
        message
    }
}

impl Message for ClearMarker {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, _sender: Identity) -> bool {
        world.root::<Board>().is_open()
    }

    fn on_hard_sync_error(&mut self, _world: &mut World) -> Result<(), MessageError> {
        Ok(())
    }
}

/// Renames a marker in place
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelabelMarker {
    #[serde(skip)]
    core: MessageCore,
    pub marker: TokenId,
    pub label: String,
}

impl RelabelMarker {
    pub fn new(marker: TokenId, label: &str) -> Self {
        Self {
            core: MessageCore::default(),
            marker,
            label: label.to_string(),
        }
    }
}

impl Message for RelabelMarker {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, _sender: Identity) -> bool {
        world.token_as::<Marker>(self.marker).is_some()
    }

    fn on_execute(&mut self, world: &mut World) {
        if let Some(marker) = world.token_as_mut::<Marker>(self.marker) {
            marker.relabel(&self.label);
        }
    }
}

/// Sent by the referee to stop any more markers from being placed
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CloseBoard {
    #[serde(skip)]
    core: MessageCore,
}

impl Message for CloseBoard {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }

    fn on_check(&self, world: &World, _sender: Identity) -> bool {
        self.was_sent_by_referee() && world.root::<Board>().is_open()
    }

    fn on_execute(&mut self, world: &mut World) {
        world.root_mut::<Board>().close();
    }
}

/// Carries no tokens, only text
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Note {
    #[serde(skip)]
    core: MessageCore,
    pub text: String,
}

impl Note {
    pub fn new(text: &str) -> Self {
        Self {
            core: MessageCore::default(),
            text: text.to_string(),
        }
    }
}

impl Message for Note {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }
}

pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_token::<Board>()
        .add_token::<Marker>()
        .add_message::<PlaceMarker>()
        .add_message::<ClearMarker>()
        .add_message::<RelabelMarker>()
        .add_message::<CloseBoard>()
        .add_message::<Note>()
        .build()
}

pub fn world() -> World {
    World::new(Board::default())
}
