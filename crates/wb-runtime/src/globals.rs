use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::phase::PhaseLoop;
use crate::system::SystemId;
use crate::task::TaskId;
use crate::world::WorldId;

/// Explicit handle to the runtime's process-wide mutable state.
///
/// Everything a production process would keep in ambient statics (the
/// default-world reference, the installed frame loop, the strict
/// access-checking flag, and the scheduling id counters) lives behind
/// this handle instead, and is threaded explicitly into every world and
/// harness call. Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct RuntimeGlobals {
    inner: Arc<GlobalsInner>,
}

struct GlobalsInner {
    default_world: Mutex<Option<WorldId>>,
    phase_loop: Mutex<PhaseLoop>,
    access_checks: AtomicBool,
    next_world: AtomicU64,
    next_system: AtomicU64,
    next_task: AtomicU64,
}

impl RuntimeGlobals {
    /// Fresh global state: no default world, the standard frame loop,
    /// strict access checking off.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GlobalsInner {
                default_world: Mutex::new(None),
                phase_loop: Mutex::new(PhaseLoop::standard()),
                access_checks: AtomicBool::new(false),
                next_world: AtomicU64::new(1),
                next_system: AtomicU64::new(1),
                next_task: AtomicU64::new(1),
            }),
        }
    }

    /// The ambient default-world reference, if one is installed.
    pub fn default_world(&self) -> Option<WorldId> {
        *self
            .inner
            .default_world
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Install (or clear) the ambient default-world reference.
    pub fn set_default_world(&self, world: Option<WorldId>) {
        *self
            .inner
            .default_world
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = world;
    }

    /// A copy of the currently installed frame loop.
    pub fn phase_loop(&self) -> PhaseLoop {
        self.inner
            .phase_loop
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Replace the installed frame loop wholesale.
    pub fn set_phase_loop(&self, phase_loop: PhaseLoop) {
        *self
            .inner
            .phase_loop
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = phase_loop;
    }

    /// Whether strict concurrent-access checking is enabled.
    pub fn access_checks_enabled(&self) -> bool {
        self.inner.access_checks.load(Ordering::SeqCst)
    }

    /// Set the strict access-checking flag; returns the previous value.
    pub fn set_access_checks(&self, enabled: bool) -> bool {
        self.inner.access_checks.swap(enabled, Ordering::SeqCst)
    }

    /// Reset the scheduling id counters.
    ///
    /// Testing-mode surface: a harness calls this around every world
    /// lifecycle so system and task numbering restarts per test. World
    /// ids are not reset: they must stay unique for the lifetime of
    /// the process so a stale default-world reference can never alias
    /// a later world.
    pub fn reset_scheduling_bookkeeping(&self) {
        self.inner.next_system.store(1, Ordering::SeqCst);
        self.inner.next_task.store(1, Ordering::SeqCst);
    }

    pub(crate) fn allocate_world_id(&self) -> WorldId {
        WorldId(self.inner.next_world.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn allocate_system_id(&self) -> SystemId {
        SystemId(self.inner.next_system.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn allocate_task_id(&self) -> TaskId {
        TaskId(self.inner.next_task.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for RuntimeGlobals {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuntimeGlobals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeGlobals")
            .field("default_world", &self.default_world())
            .field("phases", &self.phase_loop().len())
            .field("access_checks", &self.access_checks_enabled())
            .finish()
    }
}
