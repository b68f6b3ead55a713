//! Minimal entity-component simulation runtime for Werkbank.
//!
//! Provides isolated [`World`]s that own entities, type-keyed component
//! data, and lifecycle-managed systems organized into ordered update
//! groups, plus the process-wide state ([`RuntimeGlobals`]) a test
//! harness must save and restore around every world: the ambient
//! default-world reference, the installed frame loop, and the strict
//! access-checking flag. Storage is deliberately simple (type-keyed row
//! maps, no archetype chunks); this runtime exists to be driven and
//! observed, not to win benchmarks.

/// Deferred structural changes played back as one atomic batch.
pub mod command;
/// Component trait, descriptors, archetypes, and row storage.
pub mod component;
/// Debug surface for invariant checking.
pub mod debug;
/// Entity identifiers and per-entity bookkeeping.
pub mod entity;
/// Error types for the runtime crate.
pub mod error;
/// Explicit handle to process-wide runtime state.
pub mod globals;
/// Scheduling-phase configuration (the frame loop).
pub mod phase;
/// The runtime's stock system set.
pub mod stock;
/// The system trait, descriptors, and update groups.
pub mod system;
/// Worker pool, task tracking, and the drain barrier.
pub mod task;
/// The world: entities, components, systems, tasks.
pub mod world;

/// Re-export of [`command::CommandBuffer`].
pub use command::CommandBuffer;
/// Re-exports of the component model types.
pub use component::{Archetype, Component, ComponentDescriptor};
/// Re-export of [`debug::WorldDebug`].
pub use debug::WorldDebug;
/// Re-export of [`entity::EntityId`].
pub use entity::EntityId;
/// Re-exports of the error types.
pub use error::{ConsistencyError, RuntimeError, RuntimeResult};
/// Re-export of [`globals::RuntimeGlobals`].
pub use globals::RuntimeGlobals;
/// Re-exports of [`phase::FramePhase`] and [`phase::PhaseLoop`].
pub use phase::{FramePhase, PhaseLoop};
/// Re-export of [`stock::default_system_set`].
pub use stock::default_system_set;
/// Re-exports of the system model types.
pub use system::{System, SystemContext, SystemDescriptor, SystemId, UpdateGroup};
/// Re-exports of [`task::TaskHandle`] and [`task::TaskId`].
pub use task::{TaskHandle, TaskId};
/// Re-exports of [`world::World`] and [`world::WorldId`].
pub use world::{World, WorldId};
