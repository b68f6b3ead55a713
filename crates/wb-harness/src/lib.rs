//! Isolated-world test and measurement harness for Werkbank.
//!
//! Gives every test its own disposable simulation world and guarantees
//! that no process-wide scheduling or debug state leaks between tests.
//! A [`WorldLifecycleManager`] owns exactly one world per test scope:
//! creation snapshots and neutralizes the ambient default-world
//! reference, the frame loop, and the strict access-checking flag;
//! teardown validates the world's internal consistency and restores all
//! three on every exit path, success or failure.
//!
//! ```
//! use wb_harness::{WorldLifecycleManager, WorldMode, batch, measure};
//! use wb_harness::mock::{IntComponent, TagAComponent};
//! use wb_runtime::{ComponentDescriptor, RuntimeGlobals};
//!
//! let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
//! let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
//! batch::create_entities(
//!     world,
//!     100,
//!     &[
//!         ComponentDescriptor::of::<IntComponent>(),
//!         ComponentDescriptor::of::<TagAComponent>(),
//!     ],
//! )
//! .unwrap();
//! let timings =
//!     measure::measure_world_update(world, &measure::MeasureConfig::default()).unwrap();
//! assert!(timings.sample_count() >= 4);
//! manager.destroy_world().unwrap();
//! ```

/// Bulk entity creation through an atomically-played command buffer.
pub mod batch;
/// Error types for the harness crate.
pub mod error;
/// Save/restore guards for the process-wide scheduling and debug knobs.
pub mod guard;
/// World lifecycle management: one isolated world per test scope.
pub mod lifecycle;
/// Timing of world update steps.
pub mod measure;
/// Mock components and systems for exercising the harness.
pub mod mock;
/// System registration and teardown in caller order.
pub mod registry;
/// Consistency validation of a world about to be disposed.
pub mod validate;

/// Re-exports of the error types.
pub use error::{HarnessError, HarnessResult, TeardownError};
/// Re-exports of [`guard::AccessCheckToggle`] and [`guard::ExecutionContextGuard`].
pub use guard::{AccessCheckToggle, ExecutionContextGuard};
/// Re-exports of the lifecycle types.
pub use lifecycle::{LifecycleState, WorldLifecycleManager, WorldMode};
/// Re-exports of the measurement types.
pub use measure::{MeasureConfig, SampleCount, StepTimings};
