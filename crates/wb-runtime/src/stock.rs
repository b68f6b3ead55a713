use std::any::Any;

use crate::error::RuntimeResult;
use crate::system::{System, SystemContext, SystemDescriptor, UpdateGroup};

/// Counts completed update passes. Runs first each step.
#[derive(Debug, Default)]
pub struct FrameCountSystem {
    frames: u64,
}

impl FrameCountSystem {
    /// Number of update passes seen so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl System for FrameCountSystem {
    fn on_update(&mut self, _ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.frames += 1;
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Records the entity-count high-water mark across update steps.
#[derive(Debug, Default)]
pub struct EntityTallySystem {
    peak: usize,
}

impl EntityTallySystem {
    /// Highest entity count observed during any update.
    pub fn peak(&self) -> usize {
        self.peak
    }
}

impl System for EntityTallySystem {
    fn on_update(&mut self, ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.peak = self.peak.max(ctx.world.entity_count());
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Prunes bookkeeping for finished tasks at the end of each step.
#[derive(Debug, Default)]
pub struct TaskReapSystem {
    reaped: usize,
}

impl TaskReapSystem {
    /// Total task entries reaped so far.
    pub fn reaped(&self) -> usize {
        self.reaped
    }
}

impl System for TaskReapSystem {
    fn on_update(&mut self, ctx: &mut SystemContext<'_>) -> RuntimeResult<()> {
        self.reaped += ctx.world.reap_completed_tasks();
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The runtime's stock system set: one bookkeeping system per update
/// group, in group order.
pub fn default_system_set() -> Vec<SystemDescriptor> {
    vec![
        SystemDescriptor::of::<FrameCountSystem>().in_group(UpdateGroup::Init),
        SystemDescriptor::of::<EntityTallySystem>(),
        SystemDescriptor::of::<TaskReapSystem>().in_group(UpdateGroup::Present),
    ]
}

#[cfg(test)]
mod tests {
    use crate::globals::RuntimeGlobals;
    use crate::world::World;

    use super::*;

    #[test]
    fn default_set_covers_every_group_in_order() {
        let groups: Vec<UpdateGroup> =
            default_system_set().iter().map(SystemDescriptor::group).collect();
        assert_eq!(groups, UpdateGroup::ORDER.to_vec());
    }

    #[test]
    fn stock_systems_observe_the_step() {
        let mut world = World::new("stock", &RuntimeGlobals::new());
        for desc in default_system_set() {
            let id = world.get_or_create_system(desc).unwrap();
            world.attach_to_group(id, desc.group()).unwrap();
        }
        world.spawn_task(|| {});
        world.complete_all_tasks();
        world.update().unwrap();
        world.update().unwrap();
        assert_eq!(world.system::<FrameCountSystem>().unwrap().frames(), 2);
    }
}
