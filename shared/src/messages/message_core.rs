use crate::{Identity, Token, TokenId};

use super::SyncError;

/// A token a message will take out of the world, with a copy of what it
/// looked like when the removal was scheduled
#[derive(Debug)]
pub struct TokenRemoval {
    id: TokenId,
    snapshot: Option<Box<dyn Token>>,
}

impl TokenRemoval {
    pub fn new(id: TokenId, snapshot: Option<Box<dyn Token>>) -> Self {
        Self { id, snapshot }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn snapshot(&self) -> Option<&dyn Token> {
        self.snapshot.as_deref()
    }
}

/// Bookkeeping every message embeds. Concrete messages keep it out of their
/// serde representation with `#[serde(skip)]`, the protocol packs it
/// separately.
#[derive(Debug, Default)]
pub struct MessageCore {
    tokens_to_add: Vec<Box<dyn Token>>,
    tokens_to_remove: Vec<TokenRemoval>,
    sender_id: Option<Identity>,
    sync_error: SyncError,
}

impl MessageCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens_to_add(&self) -> impl Iterator<Item = &dyn Token> {
        self.tokens_to_add.iter().map(|token| token.as_ref())
    }

    pub fn tokens_to_remove(&self) -> &[TokenRemoval] {
        &self.tokens_to_remove
    }

    pub fn sender_id(&self) -> Option<Identity> {
        self.sender_id
    }

    pub fn sync_error(&self) -> SyncError {
        self.sync_error
    }

    // Crate-public

    pub(crate) fn push_token_to_add(&mut self, token: Box<dyn Token>) {
        self.tokens_to_add.push(token);
    }

    pub(crate) fn push_token_to_remove(&mut self, removal: TokenRemoval) {
        self.tokens_to_remove.push(removal);
    }

    pub(crate) fn tokens_to_add_mut(&mut self) -> &mut Vec<Box<dyn Token>> {
        &mut self.tokens_to_add
    }

    pub(crate) fn set_sender_id(&mut self, sender_id: Identity) {
        self.sender_id = Some(sender_id);
    }

    pub(crate) fn set_sync_error(&mut self, sync_error: SyncError) {
        self.sync_error = sync_error;
    }
}
