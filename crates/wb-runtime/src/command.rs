use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::component::Archetype;
use crate::world::WorldId;

/// One deferred structural change.
#[derive(Debug, Clone)]
pub(crate) enum Command {
    CreateEntity(Archetype),
}

/// Keeps the owning world's live-buffer count honest: incremented when a
/// buffer is acquired, decremented when it is dropped, on every exit
/// path.
struct LiveGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An ordered queue of pending structural changes, played back against
/// the world it was acquired from as one atomic batch.
///
/// Acquire with [`crate::World::begin_batch`], fill, then hand to
/// [`crate::World::play_back`]. Dropping the buffer releases it; a
/// buffer that is still alive at consistency-check time is reported as
/// a leak.
pub struct CommandBuffer {
    world: WorldId,
    commands: Vec<Command>,
    _live: LiveGuard,
}

impl CommandBuffer {
    pub(crate) fn new(world: WorldId, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            world,
            commands: Vec::new(),
            _live: LiveGuard { live },
        }
    }

    /// Queue the creation of one entity with the archetype's component
    /// set. Nothing happens until playback.
    pub fn create_entity(&mut self, archetype: &Archetype) {
        self.commands.push(Command::CreateEntity(archetype.clone()));
    }

    /// Number of queued changes.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn world(&self) -> WorldId {
        self.world
    }

    pub(crate) fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("world", &self.world)
            .field("queued", &self.commands.len())
            .finish()
    }
}
