//! Consistency validation of a world about to be disposed.

use wb_runtime::World;

use crate::error::HarnessResult;

/// Verify no concurrent work issued by the world remains outstanding,
/// no orphaned storage bookkeeping exists, and acquire/release counts
/// are balanced.
///
/// Runs once per teardown, before disposal. A failure here means the
/// code under test leaked resources or broke a scheduling contract; it
/// propagates as an error and is never downgraded to a log line.
pub fn check_internal_consistency(world: &World) -> HarnessResult<()> {
    world.debug().check_internal_consistency()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wb_runtime::{ConsistencyError, RuntimeGlobals};

    use crate::error::HarnessError;

    use super::*;

    #[test]
    fn settled_world_passes() {
        let world = World::new("validate", &RuntimeGlobals::new());
        check_internal_consistency(&world).unwrap();
    }

    #[test]
    fn unresolved_task_handle_is_rejected() {
        let mut world = World::new("validate", &RuntimeGlobals::new());
        world.spawn_task(|| std::thread::sleep(Duration::from_millis(200)));
        let err = check_internal_consistency(&world);
        assert!(matches!(
            err,
            Err(HarnessError::Consistency(
                ConsistencyError::OutstandingTasks(1)
            ))
        ));
        world.complete_all_tasks();
    }
}
