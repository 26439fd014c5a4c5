use std::time::{Duration, Instant};

use crate::{pipe::Pipe, Message, World};

use super::{Forum, ForumRole, LocalRole, Member, Reaction, Subscriber};

struct Delayed {
    remaining: f32,
    message: Box<dyn Message>,
}

/// A forum that can hold publications back for a while
pub struct TimedForum<R: ForumRole = LocalRole> {
    forum: Forum<R>,
    delayed: Vec<Delayed>,
    last_update: Option<Instant>,
}

impl<R: ForumRole> TimedForum<R> {
    pub fn new(forum: Forum<R>) -> Self {
        Self {
            forum,
            delayed: Vec::new(),
            last_update: None,
        }
    }

    /// Publishes `message` once `delay_secs` have passed. A delay of zero or
    /// less publishes on the next update.
    pub fn publish(&mut self, message: Box<dyn Message>, delay_secs: f32) {
        self.delayed.push(Delayed {
            remaining: delay_secs,
            message,
        });
    }

    pub fn num_delayed(&self) -> usize {
        self.delayed.len()
    }

    /// Updates using the wall-clock time since the previous update
    pub fn update(&mut self, world: &mut World) {
        let now = Instant::now();
        let elapsed = self
            .last_update
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_update = Some(now);
        self.update_after(world, elapsed);
    }

    /// Counts `elapsed` off every delayed publication, promotes the ones
    /// that are due, then updates the inner forum
    pub fn update_after(&mut self, world: &mut World, elapsed: Duration) {
        let elapsed = elapsed.as_secs_f32();
        let mut waiting = Vec::with_capacity(self.delayed.len());
        for mut delayed in self.delayed.drain(..) {
            delayed.remaining -= elapsed;
            if delayed.remaining <= 0.0 {
                self.forum.publish(delayed.message);
            } else {
                waiting.push(delayed);
            }
        }
        self.delayed = waiting;
        self.forum.update(world);
    }

    pub fn forum(&self) -> &Forum<R> {
        &self.forum
    }

    pub fn forum_mut(&mut self) -> &mut Forum<R> {
        &mut self.forum
    }

    pub fn into_inner(self) -> Forum<R> {
        self.forum
    }
}

impl<R: ForumRole> Subscriber for TimedForum<R> {
    fn subscribe<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.forum.subscribe_to::<M, F>(Reaction::Message, callback);
    }

    fn subscribe_to_soft_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.forum
            .subscribe_to::<M, F>(Reaction::SoftSyncError, callback);
    }

    fn subscribe_to_hard_sync_error<M, F>(&mut self, callback: F)
    where
        M: Message,
        F: FnMut(&World, &M) + 'static,
    {
        self.forum
            .subscribe_to::<M, F>(Reaction::HardSyncError, callback);
    }

    fn unsubscribe<M: Message>(&mut self) {
        self.forum.unsubscribe_from::<M>(Reaction::Message);
    }

    fn unsubscribe_from_soft_sync_error<M: Message>(&mut self) {
        self.forum.unsubscribe_from::<M>(Reaction::SoftSyncError);
    }

    fn unsubscribe_from_hard_sync_error<M: Message>(&mut self) {
        self.forum.unsubscribe_from::<M>(Reaction::HardSyncError);
    }
}

impl<R: ForumRole> Member for TimedForum<R> {
    fn lock(&mut self) {
        self.forum.lock();
    }

    /// Also forgets every delayed publication
    fn unlock(&mut self) {
        self.forum.unlock();
        self.delayed.clear();
        self.last_update = None;
    }

    fn is_locked(&self) -> bool {
        self.forum.is_locked()
    }

    fn update(&mut self, world: &mut World) {
        TimedForum::update(self, world);
    }

    fn teardown(&mut self) -> Vec<Box<dyn Pipe>> {
        self.delayed.clear();
        self.last_update = None;
        self.forum.teardown()
    }
}
