//! One isolated world per test scope, with global state saved around it.

use wb_runtime::{RuntimeGlobals, SystemDescriptor, World, WorldId, default_system_set};

use crate::error::{HarnessError, HarnessResult, TeardownError};
use crate::guard::{AccessCheckToggle, ExecutionContextGuard};
use crate::{registry, validate};

/// How a fresh world is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldMode {
    /// Start with the runtime's stock system set attached.
    Default,
    /// Start with no systems at all.
    Empty,
}

/// Lifecycle phase of the manager's current world scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No world has been created yet in this cycle.
    Uninitialized,
    /// A world is live and owned by the manager.
    Active,
    /// The last world was torn down; a new cycle may begin.
    TornDown,
}

/// Everything captured before a world is created and consumed exactly
/// once during teardown, however teardown was reached.
#[derive(Debug)]
struct GlobalStateSnapshot {
    previous_default_world: Option<WorldId>,
    phase_guard: ExecutionContextGuard,
    access_toggle: AccessCheckToggle,
}

impl GlobalStateSnapshot {
    fn capture(globals: &RuntimeGlobals) -> Self {
        Self {
            previous_default_world: globals.default_world(),
            phase_guard: ExecutionContextGuard::save(globals),
            access_toggle: AccessCheckToggle::enable(globals),
        }
    }

    fn restore(self, globals: &RuntimeGlobals) {
        globals.set_default_world(self.previous_default_world);
        self.phase_guard.restore(globals);
        self.access_toggle.restore(globals);
    }
}

/// Creates and tears down exactly one isolated world per test scope.
///
/// Creation saves the ambient default-world reference, the installed
/// frame loop, and the access-checking flag, then neutralizes all
/// three; teardown restores them exactly once, whatever else happens on
/// the way. Dropping the manager with a world still active runs the
/// same teardown, so cleanup happens on every exit path.
pub struct WorldLifecycleManager {
    globals: RuntimeGlobals,
    state: LifecycleState,
    world: Option<World>,
    snapshot: Option<GlobalStateSnapshot>,
}

impl WorldLifecycleManager {
    /// A manager bound to the given global state, with no world yet.
    pub fn new(globals: RuntimeGlobals) -> Self {
        Self {
            globals,
            state: LifecycleState::Uninitialized,
            world: None,
            snapshot: None,
        }
    }

    /// The manager's current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// True while a world is live.
    pub fn is_active(&self) -> bool {
        self.world.is_some()
    }

    /// Borrow the active world.
    pub fn world(&self) -> HarnessResult<&World> {
        self.world.as_ref().ok_or(HarnessError::NoActiveWorld)
    }

    /// Mutably borrow the active world.
    pub fn world_mut(&mut self) -> HarnessResult<&mut World> {
        self.world.as_mut().ok_or(HarnessError::NoActiveWorld)
    }

    /// The globals handle this manager saves and restores around its
    /// world.
    pub fn globals(&self) -> &RuntimeGlobals {
        &self.globals
    }

    /// Create the test scope's world and register `systems` in caller
    /// order.
    ///
    /// Fails with [`HarnessError::WorldAlreadyActive`] if a world is
    /// still live. On a failed setup the captured global state is
    /// restored before the error is returned, so a botched creation
    /// leaks nothing into the next test.
    pub fn create_world(
        &mut self,
        mode: WorldMode,
        systems: &[SystemDescriptor],
    ) -> HarnessResult<&mut World> {
        if self.world.is_some() {
            return Err(HarnessError::WorldAlreadyActive);
        }

        let snapshot = GlobalStateSnapshot::capture(&self.globals);
        self.globals.reset_scheduling_bookkeeping();

        let mut world = World::new(
            match mode {
                WorldMode::Default => "test world (default)",
                WorldMode::Empty => "test world (empty)",
            },
            &self.globals,
        );
        self.globals.set_default_world(Some(world.id()));

        let setup = Self::setup_systems(&mut world, mode, systems);
        if let Err(err) = setup {
            drop(world);
            snapshot.restore(&self.globals);
            self.globals.reset_scheduling_bookkeeping();
            return Err(err);
        }

        tracing::debug!(world = %world.id(), ?mode, "created isolated test world");
        self.snapshot = Some(snapshot);
        self.state = LifecycleState::Active;
        Ok(self.world.insert(world))
    }

    fn setup_systems(
        world: &mut World,
        mode: WorldMode,
        systems: &[SystemDescriptor],
    ) -> HarnessResult<()> {
        if mode == WorldMode::Default {
            registry::register_systems(world, &default_system_set())?;
        }
        registry::register_systems(world, systems)?;
        Ok(())
    }

    /// Tear down the active world and restore the captured global
    /// state.
    ///
    /// A no-op when no world is active. Otherwise: destroy all systems,
    /// validate consistency, dispose the world (which drains its
    /// concurrent work), then restore the default-world reference, the
    /// frame loop, and the access-checking flag, and reset scheduling
    /// bookkeeping. Every step runs even when an earlier one fails;
    /// collected failures come back as one [`TeardownError`].
    pub fn destroy_world(&mut self) -> Result<(), TeardownError> {
        let Some(mut world) = self.world.take() else {
            return Ok(());
        };
        let world_id = world.id();
        let mut failures = Vec::new();

        if let Err(err) = registry::destroy_all_systems(&mut world) {
            failures.push(err);
        }
        if let Err(err) = validate::check_internal_consistency(&world) {
            failures.push(err);
        }
        drop(world);

        if let Some(snapshot) = self.snapshot.take() {
            snapshot.restore(&self.globals);
        }
        self.globals.reset_scheduling_bookkeeping();
        self.state = LifecycleState::TornDown;
        tracing::debug!(world = %world_id, failures = failures.len(), "tore down test world");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError::new(failures))
        }
    }
}

impl Drop for WorldLifecycleManager {
    fn drop(&mut self) {
        // destroy_world is a no-op when nothing is active.
        if let Err(err) = self.destroy_world() {
            // Nowhere left to propagate; record the loss instead of
            // discarding it.
            tracing::error!(%err, "world teardown during drop reported failures");
        }
    }
}

impl std::fmt::Debug for WorldLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldLifecycleManager")
            .field("state", &self.state)
            .field("world", &self.world.as_ref().map(World::id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use wb_runtime::{PhaseLoop, UpdateGroup};

    use crate::mock::CountingSystem;

    use super::*;

    #[test]
    fn create_then_destroy_cycles_the_state_machine() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        assert_eq!(manager.state(), LifecycleState::Uninitialized);

        manager.create_world(WorldMode::Empty, &[]).unwrap();
        assert_eq!(manager.state(), LifecycleState::Active);

        manager.destroy_world().unwrap();
        assert_eq!(manager.state(), LifecycleState::TornDown);
        assert!(!manager.is_active());
    }

    #[test]
    fn double_create_is_an_error() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        manager.create_world(WorldMode::Empty, &[]).unwrap();
        let err = manager.create_world(WorldMode::Empty, &[]);
        assert!(matches!(err, Err(HarnessError::WorldAlreadyActive)));
        manager.destroy_world().unwrap();
    }

    #[test]
    fn destroy_without_a_world_is_a_no_op() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        manager.destroy_world().unwrap();
        manager.destroy_world().unwrap();
    }

    #[test]
    fn default_mode_attaches_the_stock_set() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        let world = manager.create_world(WorldMode::Default, &[]).unwrap();
        assert_eq!(world.system_count(), 3);
        manager.destroy_world().unwrap();
    }

    #[test]
    fn empty_mode_attaches_nothing() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
        assert_eq!(world.system_count(), 0);
        manager.destroy_world().unwrap();
    }

    #[test]
    fn creation_neutralizes_the_frame_loop_and_forces_checks_on() {
        let globals = RuntimeGlobals::new();
        let mut manager = WorldLifecycleManager::new(globals.clone());
        manager.create_world(WorldMode::Empty, &[]).unwrap();
        assert!(globals.phase_loop().is_empty());
        assert!(globals.access_checks_enabled());
        manager.destroy_world().unwrap();
        assert_eq!(globals.phase_loop(), PhaseLoop::standard());
        assert!(!globals.access_checks_enabled());
    }

    #[test]
    fn created_world_becomes_the_ambient_default() {
        let globals = RuntimeGlobals::new();
        let mut manager = WorldLifecycleManager::new(globals.clone());
        let id = manager.create_world(WorldMode::Empty, &[]).unwrap().id();
        assert_eq!(globals.default_world(), Some(id));
        manager.destroy_world().unwrap();
        assert_eq!(globals.default_world(), None);
    }

    #[test]
    fn caller_systems_are_registered_in_order() {
        let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
        let world = manager
            .create_world(WorldMode::Empty, &[SystemDescriptor::of::<CountingSystem>()])
            .unwrap();
        assert_eq!(world.system_count(), 1);
        assert!(world.system::<CountingSystem>().is_some());
        manager.destroy_world().unwrap();
    }

    #[test]
    fn failed_setup_restores_globals() {
        #[derive(Debug, Default)]
        struct BrokenCreate;
        impl wb_runtime::System for BrokenCreate {
            fn on_create(
                &mut self,
                _ctx: &mut wb_runtime::SystemContext<'_>,
            ) -> wb_runtime::RuntimeResult<()> {
                Err(wb_runtime::RuntimeError::System("broken on_create".into()))
            }
            fn on_update(
                &mut self,
                _ctx: &mut wb_runtime::SystemContext<'_>,
            ) -> wb_runtime::RuntimeResult<()> {
                Ok(())
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }

        let globals = RuntimeGlobals::new();
        let before_loop = globals.phase_loop();
        let mut manager = WorldLifecycleManager::new(globals.clone());
        let err = manager.create_world(
            WorldMode::Empty,
            &[SystemDescriptor::of::<BrokenCreate>().in_group(UpdateGroup::Simulation)],
        );
        assert!(err.is_err());
        assert!(!manager.is_active());
        assert_eq!(globals.phase_loop(), before_loop);
        assert!(!globals.access_checks_enabled());
        assert_eq!(globals.default_world(), None);
    }
}
