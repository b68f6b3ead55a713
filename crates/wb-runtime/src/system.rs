use std::any::{Any, TypeId};
use std::fmt;

use crate::error::RuntimeResult;
use crate::world::World;

/// A unit of update logic bound to a world.
///
/// Systems move through a fixed lifecycle: created once, started before
/// their first update, updated once per step according to update-group
/// order, then stopped and destroyed during teardown. Every hook may
/// fail; a hook failure propagates to whoever drove the step.
pub trait System: Any + Send {
    /// Called once when the system instance is created for a world.
    fn on_create(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called before the first update after creation.
    fn on_start_running(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called once per update step.
    fn on_update(&mut self, ctx: &mut SystemContext<'_>) -> RuntimeResult<()>;

    /// Called when a started system is about to be destroyed.
    fn on_stop_running(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called last, immediately before the instance is dropped.
    fn on_destroy(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Support downcasting to concrete types for test inspection.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to concrete types for test inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Mutable context passed to every system lifecycle hook.
pub struct SystemContext<'a> {
    /// The world the system is bound to.
    pub world: &'a mut World,
}

/// Identifies one system instance bound to a world.
///
/// Allocated from the process-wide scheduling bookkeeping so ids stay
/// unique until the bookkeeping is reset between tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub(crate) u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The ordered update groups a world steps through.
///
/// `update` runs the groups in [`UpdateGroup::ORDER`]; within a group,
/// systems run in attachment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateGroup {
    /// Frame setup work; runs first.
    Init,
    /// The main simulation work; the default group for registration.
    Simulation,
    /// Output and bookkeeping work; runs last.
    Present,
}

impl UpdateGroup {
    /// All groups in execution order.
    pub const ORDER: [UpdateGroup; 3] =
        [UpdateGroup::Init, UpdateGroup::Simulation, UpdateGroup::Present];

    pub(crate) fn index(self) -> usize {
        match self {
            UpdateGroup::Init => 0,
            UpdateGroup::Simulation => 1,
            UpdateGroup::Present => 2,
        }
    }
}

impl fmt::Display for UpdateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Simulation => write!(f, "simulation"),
            Self::Present => write!(f, "present"),
        }
    }
}

/// Identifier plus constructor for one system type.
///
/// Worlds obtain-or-create system instances from descriptors; two
/// descriptors are equal exactly when they name the same Rust type.
/// Each descriptor carries the update group the system is designated
/// for: the simulation group unless overridden with
/// [`SystemDescriptor::in_group`].
#[derive(Clone, Copy)]
pub struct SystemDescriptor {
    key: TypeId,
    name: &'static str,
    group: UpdateGroup,
    build: fn() -> Box<dyn System>,
}

impl SystemDescriptor {
    /// Descriptor for the system type `S`, designated for the
    /// simulation group.
    pub fn of<S: System + Default>() -> Self {
        Self {
            key: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
            group: UpdateGroup::Simulation,
            build: || Box::<S>::default(),
        }
    }

    /// Override the designated update group.
    pub fn in_group(mut self, group: UpdateGroup) -> Self {
        self.group = group;
        self
    }

    /// Fully-qualified name of the system type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The update group this system is designated for.
    pub fn group(&self) -> UpdateGroup {
        self.group
    }

    pub(crate) fn key(&self) -> TypeId {
        self.key
    }

    pub(crate) fn build(&self) -> Box<dyn System> {
        (self.build)()
    }
}

impl fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish()
    }
}

impl PartialEq for SystemDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SystemDescriptor {}
