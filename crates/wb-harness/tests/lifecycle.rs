//! Fixture-level flows: world creation, updates, teardown, and the
//! guarantee that nothing leaks into the next test scope.

use wb_harness::mock::CountingSystem;
use wb_harness::{HarnessError, WorldLifecycleManager, WorldMode};
use wb_runtime::{FramePhase, PhaseLoop, RuntimeGlobals, SystemDescriptor, UpdateGroup, World};

#[test]
fn default_world_update_does_not_fail() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager.create_world(WorldMode::Default, &[]).unwrap();
    world.update().unwrap();
    manager.destroy_world().unwrap();
}

#[test]
fn empty_world_update_does_not_fail() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
    world.update().unwrap();
    manager.destroy_world().unwrap();
}

#[test]
fn registered_system_updates_once_per_step() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager
        .create_world(WorldMode::Empty, &[SystemDescriptor::of::<CountingSystem>()])
        .unwrap();
    world.update().unwrap();
    assert_eq!(world.system::<CountingSystem>().unwrap().updated, 1);
    manager.destroy_world().unwrap();
}

#[test]
fn manually_attached_system_updates_once_per_step() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
    let id = world
        .get_or_create_system(SystemDescriptor::of::<CountingSystem>())
        .unwrap();
    world.attach_to_group(id, UpdateGroup::Simulation).unwrap();
    world.update().unwrap();
    assert_eq!(world.system::<CountingSystem>().unwrap().updated, 1);
    manager.destroy_world().unwrap();
}

#[test]
fn manual_single_system_dispatch_updates_once() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
    let id = world
        .get_or_create_system(SystemDescriptor::of::<CountingSystem>())
        .unwrap();
    world.run_system(id).unwrap();
    assert_eq!(world.system::<CountingSystem>().unwrap().updated, 1);
    manager.destroy_world().unwrap();
}

#[test]
fn second_create_without_teardown_is_rejected() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    manager.create_world(WorldMode::Default, &[]).unwrap();
    assert!(matches!(
        manager.create_world(WorldMode::Empty, &[]),
        Err(HarnessError::WorldAlreadyActive)
    ));
    manager.destroy_world().unwrap();
}

#[test]
fn repeated_cycles_restore_globals_exactly() {
    let globals = RuntimeGlobals::new();

    // Give all three pieces of ambient state distinctive values.
    let bystander = World::new("bystander", &globals);
    globals.set_default_world(Some(bystander.id()));
    let mut custom_loop = PhaseLoop::empty();
    custom_loop.push(FramePhase {
        name: "fixed-step",
        group: UpdateGroup::Simulation,
    });
    globals.set_phase_loop(custom_loop.clone());
    globals.set_access_checks(true);

    for _ in 0..5 {
        let mut manager = WorldLifecycleManager::new(globals.clone());
        let world = manager
            .create_world(WorldMode::Default, &[SystemDescriptor::of::<CountingSystem>()])
            .unwrap();
        world.update().unwrap();
        manager.destroy_world().unwrap();
    }

    assert_eq!(globals.default_world(), Some(bystander.id()));
    assert_eq!(globals.phase_loop(), custom_loop);
    assert!(globals.access_checks_enabled());
}

#[test]
fn dropping_an_active_manager_still_restores_globals() {
    let globals = RuntimeGlobals::new();
    {
        let mut manager = WorldLifecycleManager::new(globals.clone());
        manager.create_world(WorldMode::Default, &[]).unwrap();
        // Scope exits without an explicit destroy_world.
    }
    assert_eq!(globals.default_world(), None);
    assert_eq!(globals.phase_loop(), PhaseLoop::standard());
    assert!(!globals.access_checks_enabled());
}

#[test]
fn teardown_destroys_systems_created_mid_test() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    let world = manager.create_world(WorldMode::Empty, &[]).unwrap();
    world
        .get_or_create_system(SystemDescriptor::of::<CountingSystem>())
        .unwrap();
    manager.destroy_world().unwrap();
    assert_eq!(CountingSystem::destroyed_tally(), 1);
}

#[test]
fn a_fresh_cycle_can_follow_teardown() {
    let mut manager = WorldLifecycleManager::new(RuntimeGlobals::new());
    manager.create_world(WorldMode::Empty, &[]).unwrap();
    manager.destroy_world().unwrap();
    let world = manager.create_world(WorldMode::Default, &[]).unwrap();
    world.update().unwrap();
    manager.destroy_world().unwrap();
}
