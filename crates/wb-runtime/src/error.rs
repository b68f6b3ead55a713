use crate::entity::EntityId;
use crate::system::SystemId;
use crate::world::WorldId;

/// Alias for `Result<T, RuntimeError>`.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised by the runtime while driving a world.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The requested entity ID does not exist in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity exists but does not carry the requested component.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was addressed.
        entity: EntityId,
        /// Name of the component type that was requested.
        component: &'static str,
    },

    /// A component type appears more than once in a creation set.
    #[error("duplicate component type in set: {0}")]
    DuplicateComponent(&'static str),

    /// The requested system ID is not owned by the world.
    #[error("system not found: {0}")]
    SystemNotFound(SystemId),

    /// The system is already attached to a different update group.
    #[error("system {0} is already attached to an update group")]
    SystemAlreadyAttached(&'static str),

    /// The system is currently being dispatched and cannot be destroyed.
    #[error("system {0} is currently updating")]
    SystemBusy(&'static str),

    /// A structural change was attempted while tracked concurrent work
    /// is still outstanding and strict access checking is enabled.
    #[error("structural change with {0} tracked task(s) outstanding")]
    TasksOutstanding(usize),

    /// A command buffer was played back against a world it was not
    /// acquired from.
    #[error("command buffer belongs to world {buffer_world}, not {world}")]
    ForeignCommandBuffer {
        /// The world the buffer was acquired from.
        buffer_world: WorldId,
        /// The world playback was attempted against.
        world: WorldId,
    },

    /// A failure reported by a system's own lifecycle hook.
    #[error("system error: {0}")]
    System(String),
}

/// Invariant violations detected by [`crate::debug::WorldDebug`].
#[derive(Debug, thiserror::Error)]
pub enum ConsistencyError {
    /// Tracked concurrent work was never completed.
    #[error("{0} tracked task(s) never completed")]
    OutstandingTasks(usize),

    /// A component row refers to an entity the world no longer knows.
    #[error("orphaned {component} row for missing entity {entity}")]
    OrphanedRow {
        /// Name of the component type owning the row.
        component: &'static str,
        /// The entity the row refers to.
        entity: EntityId,
    },

    /// An entity's recorded component set has no backing row.
    #[error("entity {entity} is missing its {component} row")]
    MissingRow {
        /// The entity missing a row.
        entity: EntityId,
        /// Name of the component type whose row is missing.
        component: &'static str,
    },

    /// Command buffers were acquired but never released.
    #[error("{0} command buffer(s) acquired but never released")]
    LiveCommandBuffers(usize),
}
