use crate::error::ConsistencyError;
use crate::world::World;

/// Borrowing view over a world that exposes invariant checking.
///
/// The checks are read-only and safe to run at any point; the harness
/// runs them once per teardown, after systems are destroyed and before
/// the world is disposed.
pub struct WorldDebug<'w> {
    world: &'w World,
}

impl<'w> WorldDebug<'w> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self { world }
    }

    /// Verify the world's internal bookkeeping is balanced.
    ///
    /// Checks, in order: no tracked concurrent work is still
    /// outstanding; no command buffer was acquired without being
    /// released; every component row belongs to a live entity; every
    /// live entity's recorded component set has its backing rows. The
    /// first violation found is returned.
    pub fn check_internal_consistency(&self) -> Result<(), ConsistencyError> {
        let outstanding = self.world.outstanding_tasks();
        if outstanding > 0 {
            return Err(ConsistencyError::OutstandingTasks(outstanding));
        }

        let live = self.world.live_batches();
        if live > 0 {
            return Err(ConsistencyError::LiveCommandBuffers(live));
        }

        for store in self.world.component_stores() {
            for entity in store.rows.keys() {
                if !self.world.contains(*entity) {
                    return Err(ConsistencyError::OrphanedRow {
                        component: store.descriptor.name(),
                        entity: *entity,
                    });
                }
            }
        }

        for (entity, record) in self.world.entity_records() {
            for desc in &record.components {
                if self
                    .world
                    .entities_with(desc)
                    .binary_search(entity)
                    .is_err()
                {
                    return Err(ConsistencyError::MissingRow {
                        entity: *entity,
                        component: desc.name(),
                    });
                }
            }
        }

        Ok(())
    }
}
