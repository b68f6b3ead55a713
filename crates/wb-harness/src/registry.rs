//! Attaches and detaches update-capable systems in caller order.
//!
//! Systems never auto-register themselves merely by existing: the stock
//! set is attached only when a default-mode world is created, and
//! everything else is registered explicitly here. This keeps test
//! worlds minimal and makes registration order part of the test.

use wb_runtime::{SystemDescriptor, SystemId, World};

use crate::error::HarnessResult;

/// Obtain-or-create each described system and append it to its
/// designated update group, preserving caller order. Returns the system
/// ids in the same order.
pub fn register_systems(
    world: &mut World,
    descriptors: &[SystemDescriptor],
) -> HarnessResult<Vec<SystemId>> {
    let mut ids = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let id = world.get_or_create_system(*descriptor)?;
        world.attach_to_group(id, descriptor.group())?;
        ids.push(id);
    }
    Ok(ids)
}

/// Destroy every system currently owned by the world by repeatedly
/// destroying the first remaining one until none are left.
///
/// This catches systems a test created ad hoc, outside explicit
/// registration. Destruction keeps going past hook failures so one
/// broken system cannot shield the rest from teardown; the first
/// failure is returned, later ones are logged.
pub fn destroy_all_systems(world: &mut World) -> HarnessResult<()> {
    let mut first_failure = None;
    while let Some(id) = world.first_system() {
        if let Err(err) = world.destroy_system(id) {
            if first_failure.is_none() {
                first_failure = Some(err);
            } else {
                tracing::warn!(system = %id, %err, "additional system teardown failure");
            }
        }
    }
    match first_failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
