//! Mock components and systems for exercising the harness.
//!
//! The components form a size ladder from a 4-byte scalar up to a
//! 128-byte payload, plus zero-sized tags, so batch creation and
//! measurement tests can vary per-entity cost without inventing
//! domain types.

use std::any::Any;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wb_runtime::{Component, RuntimeError, RuntimeResult, System, SystemContext};

/// A single 32-bit integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntComponent {
    /// The payload value.
    pub value: i32,
}
impl Component for IntComponent {}

/// A single 32-bit float.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatComponent {
    /// The payload value.
    pub value: f32,
}
impl Component for FloatComponent {}

/// Four floats (16 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4Component {
    /// The payload values.
    pub values: [f32; 4],
}
impl Component for Vec4Component {}

/// A 4×4 float matrix (64 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mat4Component {
    /// The payload values, row-major.
    pub values: [[f32; 4]; 4],
}
impl Component for Mat4Component {}

/// A 128-byte opaque payload, the largest rung of the size ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideComponent {
    /// The payload bytes.
    pub data: [u8; 128],
}
impl Default for WideComponent {
    fn default() -> Self {
        Self { data: [0; 128] }
    }
}
impl Component for WideComponent {}

/// Zero-sized tag component A.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagAComponent;
impl Component for TagAComponent {}

/// Zero-sized tag component B.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagBComponent;
impl Component for TagBComponent {}

/// Zero-sized tag component C.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCComponent;
impl Component for TagCComponent {}

thread_local! {
    // Survives the system instance so destruction is observable after
    // teardown. Thread-local because the test runner gives each test
    // its own thread; reset on create like the counters themselves.
    static DESTROYED_TALLY: Cell<u32> = const { Cell::new(0) };
}

/// Counts every lifecycle hook invocation.
///
/// Inspect the live counters through downcast access
/// (`world.system::<CountingSystem>()`); the destroyed tally outlives
/// the instance and is read with [`CountingSystem::destroyed_tally`].
#[derive(Debug, Default)]
pub struct CountingSystem {
    /// `on_create` invocations (always 0 or 1 for one instance).
    pub created: u32,
    /// `on_start_running` invocations.
    pub started: u32,
    /// `on_update` invocations.
    pub updated: u32,
    /// `on_stop_running` invocations.
    pub stopped: u32,
}

impl CountingSystem {
    /// Destructions recorded on this thread since the last
    /// `CountingSystem` was created.
    pub fn destroyed_tally() -> u32 {
        DESTROYED_TALLY.with(Cell::get)
    }
}

impl System for CountingSystem {
    fn on_create(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        DESTROYED_TALLY.with(|t| t.set(0));
        self.created += 1;
        Ok(())
    }
    fn on_start_running(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.started += 1;
        Ok(())
    }
    fn on_update(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.updated += 1;
        Ok(())
    }
    fn on_stop_running(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.stopped += 1;
        Ok(())
    }
    fn on_destroy(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        DESTROYED_TALLY.with(|t| t.set(t.get() + 1));
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Spawns tracked background tasks on every update.
///
/// Each task bumps a shared counter, so a drain barrier can be verified
/// by comparing [`TaskSpawnSystem::completed`] against
/// `updates × tasks_per_update`.
#[derive(Debug)]
pub struct TaskSpawnSystem {
    /// Tasks to spawn per update step.
    pub tasks_per_update: usize,
    completed: Arc<AtomicUsize>,
}

impl Default for TaskSpawnSystem {
    fn default() -> Self {
        Self {
            tasks_per_update: 2,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TaskSpawnSystem {
    /// Number of spawned tasks that have finished running.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl System for TaskSpawnSystem {
    fn on_update(&mut self, ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        for _ in 0..self.tasks_per_update {
            let completed = Arc::clone(&self.completed);
            ctx.world.spawn_task(move || {
                completed.fetch_add(1, Ordering::SeqCst);
            });
        }
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fails its `on_destroy` hook, for teardown-aggregation tests.
#[derive(Debug, Default)]
pub struct FaultyTeardownSystem;

impl System for FaultyTeardownSystem {
    fn on_update(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }
    fn on_destroy(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Err(RuntimeError::System("deliberate teardown failure".into()))
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use wb_runtime::{ComponentDescriptor, RuntimeGlobals, SystemDescriptor, World};

    use super::*;

    #[test]
    fn component_sizes_form_the_expected_ladder() {
        assert_eq!(ComponentDescriptor::of::<IntComponent>().size(), 4);
        assert_eq!(ComponentDescriptor::of::<Vec4Component>().size(), 16);
        assert_eq!(ComponentDescriptor::of::<Mat4Component>().size(), 64);
        assert_eq!(ComponentDescriptor::of::<WideComponent>().size(), 128);
        assert_eq!(ComponentDescriptor::of::<TagAComponent>().size(), 0);
    }

    #[test]
    fn counting_system_tracks_hooks() {
        let mut world = World::new("mock", &RuntimeGlobals::new());
        let id = world
            .get_or_create_system(SystemDescriptor::of::<CountingSystem>())
            .unwrap();
        world.run_system(id).unwrap();
        world.run_system(id).unwrap();
        let counting = world.system::<CountingSystem>().unwrap();
        assert_eq!(counting.created, 1);
        assert_eq!(counting.started, 1);
        assert_eq!(counting.updated, 2);
        assert_eq!(counting.stopped, 0);

        world.destroy_system(id).unwrap();
        assert_eq!(CountingSystem::destroyed_tally(), 1);
    }

    #[test]
    fn task_spawn_system_work_is_visible_after_drain() {
        let mut world = World::new("mock", &RuntimeGlobals::new());
        let id = world
            .get_or_create_system(SystemDescriptor::of::<TaskSpawnSystem>())
            .unwrap();
        world.run_system(id).unwrap();
        world.complete_all_tasks();
        assert_eq!(world.system::<TaskSpawnSystem>().unwrap().completed(), 2);
    }
}
