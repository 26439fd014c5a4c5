use std::{
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use super::World;

/// Lock flag shared between a world and every token registered in it
#[derive(Clone, Debug)]
pub struct WorldGate {
    locked: Arc<AtomicBool>,
}

impl WorldGate {
    pub(crate) fn new_locked() -> Self {
        Self {
            locked: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub(crate) fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }
}

/// Keeps the world unlocked while alive. Dropping it locks the world again,
/// unless the world was already unlocked when the guard was made.
pub struct UnlockGuard<'w> {
    world: &'w mut World,
    relock: bool,
}

impl<'w> UnlockGuard<'w> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        let relock = world.is_locked();
        world.gate().set_locked(false);
        Self { world, relock }
    }
}

impl Deref for UnlockGuard<'_> {
    type Target = World;

    fn deref(&self) -> &World {
        self.world
    }
}

impl DerefMut for UnlockGuard<'_> {
    fn deref_mut(&mut self) -> &mut World {
        self.world
    }
}

impl Drop for UnlockGuard<'_> {
    fn drop(&mut self) {
        if self.relock {
            self.world.gate().set_locked(true);
        }
    }
}
