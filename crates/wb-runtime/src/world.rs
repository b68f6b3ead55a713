use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::command::{Command, CommandBuffer};
use crate::component::{Archetype, Component, ComponentDescriptor, ComponentKey, ComponentStore};
use crate::debug::WorldDebug;
use crate::entity::{EntityId, EntityRecord};
use crate::error::{RuntimeError, RuntimeResult};
use crate::globals::RuntimeGlobals;
use crate::system::{System, SystemContext, SystemDescriptor, SystemId, UpdateGroup};
use crate::task::{TaskHandle, TaskTracker};

/// Process-unique identifier for a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(pub(crate) u64);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// One system instance owned by the world.
///
/// The boxed system is taken out of its slot for the duration of a
/// dispatch so the hook can borrow the world mutably.
struct SystemSlot {
    id: SystemId,
    descriptor: SystemDescriptor,
    system: Option<Box<dyn System>>,
    started: bool,
}

/// An isolated container owning entities, their component data, and the
/// systems registered to update them.
///
/// Structural changes (entity creation, command-buffer playback) are
/// rejected while tracked concurrent work is outstanding if strict
/// access checking is enabled in the shared [`RuntimeGlobals`].
pub struct World {
    id: WorldId,
    name: String,
    globals: RuntimeGlobals,
    next_entity: u64,
    entities: BTreeMap<EntityId, EntityRecord>,
    stores: HashMap<ComponentKey, ComponentStore>,
    slots: Vec<SystemSlot>,
    groups: [Vec<SystemId>; 3],
    tasks: TaskTracker,
    live_batches: Arc<AtomicUsize>,
}

impl World {
    /// Create an empty world bound to the given global state.
    pub fn new(name: impl Into<String>, globals: &RuntimeGlobals) -> Self {
        Self {
            id: globals.allocate_world_id(),
            name: name.into(),
            globals: globals.clone(),
            next_entity: 1,
            entities: BTreeMap::new(),
            stores: HashMap::new(),
            slots: Vec::new(),
            groups: [Vec::new(), Vec::new(), Vec::new()],
            tasks: TaskTracker::new(),
            live_batches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The world's process-unique identifier.
    pub fn id(&self) -> WorldId {
        self.id
    }

    /// The world's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Debug surface for invariant checking.
    pub fn debug(&self) -> WorldDebug<'_> {
        WorldDebug::new(self)
    }

    // -----------------------------------------------------------------------
    // Entities and components
    // -----------------------------------------------------------------------

    /// Create one entity carrying default-valued rows for every
    /// component in the archetype.
    pub fn create_entity(&mut self, archetype: &Archetype) -> RuntimeResult<EntityId> {
        self.guard_structural_change()?;
        Ok(self.create_entity_unchecked(archetype))
    }

    fn create_entity_unchecked(&mut self, archetype: &Archetype) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        for desc in archetype.descriptors() {
            self.stores
                .entry(desc.key())
                .or_insert_with(|| ComponentStore::new(*desc))
                .rows
                .insert(id, desc.new_row());
        }
        self.entities.insert(
            id,
            EntityRecord {
                components: archetype.descriptors().to_vec(),
            },
        );
        id
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// True if the entity exists in this world.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Read one component value.
    pub fn component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.stores
            .get(&ComponentDescriptor::of::<C>().key())?
            .rows
            .get(&entity)?
            .downcast_ref::<C>()
    }

    /// Mutably borrow one component value.
    pub fn component_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.stores
            .get_mut(&ComponentDescriptor::of::<C>().key())?
            .rows
            .get_mut(&entity)?
            .downcast_mut::<C>()
    }

    /// Overwrite one component value. The entity must already carry the
    /// component.
    pub fn set_component<C: Component>(&mut self, entity: EntityId, value: C) -> RuntimeResult<()> {
        if !self.entities.contains_key(&entity) {
            return Err(RuntimeError::EntityNotFound(entity));
        }
        match self.component_mut::<C>(entity) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::MissingComponent {
                entity,
                component: std::any::type_name::<C>(),
            }),
        }
    }

    /// True if the entity exists and carries the component.
    pub fn has_component<C: Component>(&self, entity: EntityId) -> bool {
        self.component::<C>(entity).is_some()
    }

    /// All entities carrying the described component, in ascending
    /// entity order.
    pub fn entities_with(&self, descriptor: &ComponentDescriptor) -> Vec<EntityId> {
        self.stores
            .get(&descriptor.key())
            .map(|store| store.rows.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Typed convenience over [`World::entities_with`].
    pub fn entities_with_component<C: Component>(&self) -> Vec<EntityId> {
        self.entities_with(&ComponentDescriptor::of::<C>())
    }

    // -----------------------------------------------------------------------
    // Systems
    // -----------------------------------------------------------------------

    /// Obtain the existing instance of the described system, or create
    /// one (running its `on_create` hook). Creation does not attach the
    /// system to any update group.
    pub fn get_or_create_system(&mut self, descriptor: SystemDescriptor) -> RuntimeResult<SystemId> {
        if let Some(slot) = self.slots.iter().find(|s| s.descriptor == descriptor) {
            return Ok(slot.id);
        }
        let id = self.globals.allocate_system_id();
        let mut system = descriptor.build();
        let created = system.on_create(&mut SystemContext { world: self });
        match created {
            Ok(()) => {
                self.slots.push(SystemSlot {
                    id,
                    descriptor,
                    system: Some(system),
                    started: false,
                });
                Ok(id)
            }
            Err(err) => Err(err),
        }
    }

    /// Append a system to an update group's execution order.
    ///
    /// Appending to the group it is already in is a no-op; attaching to
    /// a second group is an error.
    pub fn attach_to_group(&mut self, id: SystemId, group: UpdateGroup) -> RuntimeResult<()> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.id == id)
            .ok_or(RuntimeError::SystemNotFound(id))?;
        if self.groups[group.index()].contains(&id) {
            return Ok(());
        }
        if self.groups.iter().any(|g| g.contains(&id)) {
            return Err(RuntimeError::SystemAlreadyAttached(slot.descriptor.name()));
        }
        self.groups[group.index()].push(id);
        Ok(())
    }

    /// Number of systems owned by the world.
    pub fn system_count(&self) -> usize {
        self.slots.len()
    }

    /// The earliest-created system still owned by the world.
    pub fn first_system(&self) -> Option<SystemId> {
        self.slots.first().map(|s| s.id)
    }

    /// Ids of all owned systems in creation order.
    pub fn system_ids(&self) -> Vec<SystemId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    /// Downcast access to an owned system instance.
    pub fn system<S: System>(&self) -> Option<&S> {
        self.slots
            .iter()
            .filter_map(|s| s.system.as_deref())
            .find_map(|s| s.as_any().downcast_ref::<S>())
    }

    /// Mutable downcast access to an owned system instance.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.system.as_deref_mut())
            .find_map(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// Destroy one system: stop it if it was started, run its
    /// `on_destroy` hook, and drop it. The system is removed from the
    /// world even if a hook fails; the first hook failure is returned.
    pub fn destroy_system(&mut self, id: SystemId) -> RuntimeResult<()> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(RuntimeError::SystemNotFound(id))?;
        let mut slot = self.slots.remove(idx);
        for group in &mut self.groups {
            group.retain(|g| *g != id);
        }
        let Some(mut system) = slot.system.take() else {
            return Err(RuntimeError::SystemBusy(slot.descriptor.name()));
        };
        let mut result = Ok(());
        if slot.started {
            result = system.on_stop_running(&mut SystemContext { world: self });
        }
        let destroyed = system.on_destroy(&mut SystemContext { world: self });
        if result.is_ok() {
            result = destroyed;
        }
        result
    }

    /// Run one system's update (starting it first if needed),
    /// independent of update-group ordering.
    pub fn run_system(&mut self, id: SystemId) -> RuntimeResult<()> {
        if !self.slots.iter().any(|s| s.id == id) {
            return Err(RuntimeError::SystemNotFound(id));
        }
        self.dispatch(id)
    }

    /// Run one update step: every attached system, group by group in
    /// [`UpdateGroup::ORDER`], within a group in attachment order.
    ///
    /// Does not wait for concurrent work the step scheduled; pair with
    /// [`World::complete_all_tasks`] to observe a settled world.
    pub fn update(&mut self) -> RuntimeResult<()> {
        for group in UpdateGroup::ORDER {
            let ids = self.groups[group.index()].clone();
            for id in ids {
                // Systems destroyed earlier in this same step are skipped.
                if self.slots.iter().any(|s| s.id == id) {
                    self.dispatch(id)?;
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, id: SystemId) -> RuntimeResult<()> {
        let Some(idx) = self.slots.iter().position(|s| s.id == id) else {
            return Err(RuntimeError::SystemNotFound(id));
        };
        // Already taken: a reentrant update reached the system that is
        // currently running. Skip it.
        let Some(mut system) = self.slots[idx].system.take() else {
            return Ok(());
        };
        let needs_start = !self.slots[idx].started;
        let mut started_now = false;
        let result = (|| -> RuntimeResult<()> {
            if needs_start {
                system.on_start_running(&mut SystemContext { world: self })?;
                started_now = true;
            }
            system.on_update(&mut SystemContext { world: self })
        })();
        // The hook may have destroyed or created systems; find the slot
        // again before restoring the instance.
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            if started_now {
                slot.started = true;
            }
            slot.system = Some(system);
        }
        result
    }

    // -----------------------------------------------------------------------
    // Concurrent work
    // -----------------------------------------------------------------------

    /// Hand a job to the worker pool and track it until the next
    /// completion barrier.
    pub fn spawn_task(&mut self, job: impl FnOnce() + Send + 'static) -> TaskHandle {
        let id = self.globals.allocate_task_id();
        self.tasks.spawn(id, job)
    }

    /// Block until every tracked task has completed (the drain barrier).
    pub fn complete_all_tasks(&mut self) {
        self.tasks.complete_all();
    }

    /// Number of tracked tasks that have not finished running.
    pub fn outstanding_tasks(&self) -> usize {
        self.tasks.outstanding()
    }

    /// Drop bookkeeping for tasks that already finished; returns how
    /// many entries were reaped.
    pub fn reap_completed_tasks(&mut self) -> usize {
        self.tasks.reap_completed()
    }

    // -----------------------------------------------------------------------
    // Deferred structural changes
    // -----------------------------------------------------------------------

    /// Acquire a command buffer for deferred structural changes.
    pub fn begin_batch(&mut self) -> CommandBuffer {
        CommandBuffer::new(self.id, Arc::clone(&self.live_batches))
    }

    /// Play back every queued change as one atomic batch and clear the
    /// buffer. Returns the number of changes applied.
    pub fn play_back(&mut self, buffer: &mut CommandBuffer) -> RuntimeResult<usize> {
        if buffer.world() != self.id {
            return Err(RuntimeError::ForeignCommandBuffer {
                buffer_world: buffer.world(),
                world: self.id,
            });
        }
        self.guard_structural_change()?;
        let commands = buffer.drain();
        let applied = commands.len();
        for command in commands {
            match command {
                Command::CreateEntity(archetype) => {
                    self.create_entity_unchecked(&archetype);
                }
            }
        }
        Ok(applied)
    }

    pub(crate) fn live_batches(&self) -> usize {
        self.live_batches.load(Ordering::SeqCst)
    }

    pub(crate) fn entity_records(
        &self,
    ) -> impl Iterator<Item = (&EntityId, &EntityRecord)> {
        self.entities.iter()
    }

    pub(crate) fn component_stores(&self) -> impl Iterator<Item = &ComponentStore> {
        self.stores.values()
    }

    fn guard_structural_change(&self) -> RuntimeResult<()> {
        if self.globals.access_checks_enabled() {
            let outstanding = self.tasks.outstanding();
            if outstanding > 0 {
                return Err(RuntimeError::TasksOutstanding(outstanding));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("systems", &self.slots.len())
            .finish()
    }
}
