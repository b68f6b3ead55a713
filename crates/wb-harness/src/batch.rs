//! Bulk entity creation through an atomically-played command buffer.

use wb_runtime::{Archetype, ComponentDescriptor, World};

use crate::error::HarnessResult;

/// Create `count` entities, each carrying exactly the given component
/// set, as one atomic structural change.
///
/// The component set must be duplicate-free; a duplicate is an error
/// before anything is queued. Outstanding concurrent work is drained
/// first so the batch applies against a settled world, and the command
/// buffer is released on every exit path. After a successful return,
/// exactly `count` new entities exist and no partial creation was ever
/// observable.
pub fn create_entities(
    world: &mut World,
    count: usize,
    descriptors: &[ComponentDescriptor],
) -> HarnessResult<()> {
    let archetype = Archetype::new(descriptors)?;
    world.complete_all_tasks();

    let mut batch = world.begin_batch();
    for _ in 0..count {
        batch.create_entity(&archetype);
    }
    world.play_back(&mut batch)?;
    Ok(())
}
