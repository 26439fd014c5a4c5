use crossbeam_channel::Sender;
use log::warn;

use crate::{
    pipe::{Pipe, Tag},
    Message, World,
};

use super::PipeIndex;

/// A message waiting for the next forum update
pub(crate) struct Publication {
    pub message: Box<dyn Message>,
    pub source: Option<(PipeIndex, Tag)>,
}

/// Anything messages can be published to
pub trait Publisher {
    fn publish(&self, message: Box<dyn Message>);
}

/// Anything that hands out message callbacks
pub trait Subscriber {
    fn subscribe<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static;

    fn subscribe_to_soft_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static;

    fn subscribe_to_hard_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static;

    /// Drops every callback made with [`Subscriber::subscribe`] for `M`
    fn unsubscribe<M: Message>(&mut self);

    fn unsubscribe_from_soft_sync_error<M: Message>(&mut self);

    fn unsubscribe_from_hard_sync_error<M: Message>(&mut self);
}

/// Publish-only handle to a forum. Cheap to clone and safe to move to
/// other threads.
#[derive(Clone)]
pub struct ForumPublisher {
    sender: Sender<Publication>,
}

impl ForumPublisher {
    pub(crate) fn new(sender: Sender<Publication>) -> Self {
        Self { sender }
    }
}

impl Publisher for ForumPublisher {
    fn publish(&self, message: Box<dyn Message>) {
        let name = message.message_name();
        if self
            .sender
            .send(Publication {
                message,
                source: None,
            })
            .is_err()
        {
            warn!("Dropping {}, its forum no longer exists", name);
        }
    }
}

/// Anything that takes part in the game loop the way a forum does
pub trait Member {
    fn lock(&mut self);

    fn unlock(&mut self);

    fn is_locked(&self) -> bool;

    fn update(&mut self, world: &mut World);

    fn teardown(&mut self) -> Vec<Box<dyn Pipe>>;
}
