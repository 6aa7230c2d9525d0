//! # Registry Property Tests
//!
//! Drives the public scene surface through the behaviors the renderer
//! relies on:
//!
//! 1. **Identity**: one voxel per quantized key, add/remove round trips
//! 2. **Density**: group counts always equal the voxels pointing at them
//! 3. **Capacity**: a full color rejects, other colors still accept
//! 4. **Motion**: gravity fall/bounce/rest and return relaxation
//!
//! Run with: cargo test -p holoforge_core --test registry_properties

use holoforge_core::{
    AddOutcome, ColorIndex, InstanceTransform, MotionMode, PhysicsIntegrator, SceneConfig, Vec3,
    VoxelError, VoxelKey, VoxelRegistry, VoxelScene,
};

fn scene_with_capacity(capacity: usize) -> VoxelScene {
    let config = SceneConfig {
        group_capacity: capacity,
        rainbow_seed: Some(7),
        ..SceneConfig::default()
    };
    VoxelScene::new(&config).unwrap()
}

/// Deterministic xorshift stream.
fn xorshift(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn add_is_idempotent_per_key() {
    let mut scene = scene_with_capacity(64);

    let first = scene.add_voxel(1.2, 0.0, 2.4, 5).unwrap();
    // Same tenths after quantization
    let second = scene.add_voxel(1.2004, 0.0, 2.3996, 9).unwrap();

    assert!(first.is_inserted());
    assert_eq!(second, AddOutcome::AlreadyPresent(first.key()));
    assert_eq!(scene.count(), 1);
    // The existing voxel keeps its color
    let record = scene.registry().get(first.key()).unwrap();
    assert_eq!(record.color_index().get(), 5);
    assert_eq!(scene.registry().group_count(), 1);
}

#[test]
fn add_then_remove_restores_state() {
    let mut scene = scene_with_capacity(64);
    scene.add_voxel(0.0, 0.0, 0.0, 1).unwrap();
    let count_before = scene.registry().groups().next().unwrap().count();

    let key = scene.add_voxel(3.6, 1.2, 0.0, 1).unwrap().key();
    assert!(scene.remove_voxel(key));

    assert_eq!(scene.count(), 1);
    assert!(!scene.registry().contains(key));
    assert_eq!(scene.registry().groups().next().unwrap().count(), count_before);
    assert!(scene.registry().is_consistent());
}

#[test]
fn remove_missing_key_is_noop() {
    let mut scene = scene_with_capacity(8);
    scene.add_voxel(0.0, 0.0, 0.0, 0).unwrap();

    assert!(!scene.remove_voxel(VoxelKey::from_coords(9.0, 9.0, 9.0)));
    assert_eq!(scene.count(), 1);
}

// ============================================================================
// DENSITY
// ============================================================================

#[test]
fn swap_remove_relocates_last_slot() {
    let mut scene = scene_with_capacity(8);
    let a = scene.add_voxel(0.0, 0.0, 0.0, 2).unwrap().key();
    let _b = scene.add_voxel(1.2, 0.0, 0.0, 2).unwrap().key();
    let c = scene.add_voxel(2.4, 0.0, 0.0, 2).unwrap().key();

    assert!(scene.remove_voxel(a));

    let registry = scene.registry();
    let moved = registry.get(c).unwrap();
    assert_eq!(moved.slot(), 0);

    let group = registry.group(moved.group()).unwrap();
    assert_eq!(group.count(), 2);
    assert_eq!(group.owner(0), Some(c));
    assert_eq!(
        group.transform(0),
        Some(&InstanceTransform::from_translation(Vec3::new(2.4, 0.0, 0.0)))
    );
    assert!(registry.is_consistent());
}

#[test]
fn counts_match_after_random_churn() {
    let mut scene = scene_with_capacity(256);
    let mut state = 0x5EED_CAFE_u64;
    let mut live: Vec<VoxelKey> = Vec::new();

    for _ in 0..2_000 {
        let roll = xorshift(&mut state);
        if roll % 3 == 0 && !live.is_empty() {
            let victim = live.swap_remove((roll as usize / 3) % live.len());
            assert!(scene.remove_voxel(victim));
        } else {
            let x = (roll % 16) as f32 * 1.2;
            let z = ((roll >> 8) % 16) as f32 * 1.2;
            let color = ((roll >> 16) % 4) as u8;
            let outcome = scene.add_voxel(x, 0.0, z, color).unwrap();
            if outcome.is_inserted() {
                live.push(outcome.key());
            }
        }
    }

    let registry = scene.registry();
    assert_eq!(registry.count(), live.len());
    let total: usize = registry.groups().map(|g| g.count()).sum();
    assert_eq!(total, live.len());
    assert!(registry.is_consistent());
}

// ============================================================================
// CAPACITY
// ============================================================================

#[test]
fn capacity_boundary_is_per_color() {
    let mut scene = scene_with_capacity(4);
    for i in 0..4 {
        scene.add_voxel(i as f32 * 1.2, 0.0, 0.0, 0).unwrap();
    }

    let rejected = scene.add_voxel(10.0, 0.0, 0.0, 0);
    assert!(matches!(rejected, Err(VoxelError::CapacityExceeded { capacity: 4, .. })));
    assert_eq!(scene.count(), 4);
    assert!(!scene.registry().contains(VoxelKey::from_coords(10.0, 0.0, 0.0)));

    // A different color has its own group
    assert!(scene.add_voxel(10.0, 0.0, 0.0, 1).unwrap().is_inserted());

    // Freeing a slot makes room again
    assert!(scene.remove_voxel(VoxelKey::from_coords(0.0, 0.0, 0.0)));
    assert!(scene.add_voxel(20.0, 0.0, 0.0, 0).unwrap().is_inserted());
    assert!(scene.registry().is_consistent());
}

#[test]
fn clear_all_across_three_colors() {
    let mut scene = scene_with_capacity(16);
    for (i, color) in [0u8, 7, 14].into_iter().enumerate() {
        scene.add_voxel(i as f32, 0.0, 0.0, color).unwrap();
        scene.add_voxel(i as f32, 1.2, 0.0, color).unwrap();
    }
    assert_eq!(scene.registry().group_count(), 3);
    assert_eq!(scene.registry().sink().live_handles().len(), 3);

    assert_eq!(scene.clear_all(), 6);

    assert_eq!(scene.count(), 0);
    assert_eq!(scene.registry().group_count(), 0);
    assert!(scene.registry().sink().live_handles().is_empty());

    // Usable again afterwards
    scene.add_voxel(0.0, 0.0, 0.0, 7).unwrap();
    assert_eq!(scene.registry().group_count(), 1);
    assert!(scene.registry().is_consistent());
}

// ============================================================================
// MOTION
// ============================================================================

#[test]
fn gravity_fall_bounce_and_rest() {
    let mut scene = scene_with_capacity(8);
    let key = scene.add_voxel(0.0, 5.0, 0.0, 0).unwrap().key();
    scene.set_gravity(true, 0.0).unwrap();

    let mut falling_frames = 0;
    loop {
        let stats = scene.tick();
        if stats.bounced == 1 {
            break;
        }
        assert_eq!(stats.falling, 1);
        falling_frames += 1;
        assert!(falling_frames < 200, "voxel never reached the floor");
    }

    // v accumulates 0.025 per frame; sum over n frames must pass 5.0
    assert!(falling_frames >= 19);
    let record = scene.registry().get(key).unwrap();
    assert_eq!(record.position().y, 0.0);
    assert!(record.velocity().y > 0.0);
    assert!(record.is_settled());

    // Small rebound, then it rests for good
    let mut rested = false;
    for _ in 0..100 {
        if scene.tick().resting == 1 {
            rested = true;
            break;
        }
    }
    assert!(rested);
    let record = scene.registry().get(key).unwrap();
    assert_eq!(record.velocity(), Vec3::ZERO);
    assert!(record.position().y <= 0.0);
    assert!(scene.registry().is_consistent());
}

#[test]
fn return_mode_relaxes_monotonically() {
    let mut registry = VoxelRegistry::from_config(&SceneConfig::default()).unwrap();
    let key = registry.add(0.0, 0.0, 0.0, ColorIndex::DEFAULT).unwrap().key();
    registry.update_position(key, Vec3::new(4.0, -3.0, 0.0)).unwrap();

    let physics = PhysicsIntegrator::default();
    let origin = registry.get(key).unwrap().origin();
    let mut previous = registry.get(key).unwrap().position().distance(origin);

    for _ in 0..50 {
        physics.step(&mut registry, MotionMode::Return);
        let distance = registry.get(key).unwrap().position().distance(origin);
        assert!(distance < previous);
        assert!((distance - previous * 0.9).abs() < 1e-4);
        previous = distance;
    }
    assert!(previous < 0.05);
    assert!(registry.is_consistent());
}

#[test]
fn uploads_carry_group_appearance() {
    let mut scene = scene_with_capacity(8);
    let key = scene.add_voxel(0.0, 0.0, 0.0, 3).unwrap().key();
    scene.add_voxel(1.2, 0.0, 0.0, 3).unwrap();
    scene.flush();

    let registry = scene.registry();
    let group = registry.group(registry.get(key).unwrap().group()).unwrap();
    let uploaded = registry.sink().uploaded(group.handle()).unwrap();

    assert_eq!(uploaded.color, group.color());
    assert_eq!(uploaded.instances, 2);
    assert_eq!(uploaded.material.base_fill.hex(), 0x001122);
    assert!((uploaded.material.opacity - 0.8).abs() < 1e-6);
    // Cube edge is 95% of the 1.2 grid cell
    assert!((uploaded.material.extent - 1.14).abs() < 1e-5);
    assert!((uploaded.material.base_intensity - 0.4).abs() < 1e-6);
}

#[test]
fn flush_uploads_only_changed_groups() {
    let mut scene = scene_with_capacity(8);
    scene.add_voxel(0.0, 0.0, 0.0, 0).unwrap();
    scene.add_voxel(0.0, 3.0, 0.0, 1).unwrap();
    assert_eq!(scene.flush(), 2);
    assert_eq!(scene.flush(), 0);

    // Only the elevated voxel moves under gravity
    scene.set_gravity(true, 0.0).unwrap();
    scene.tick();
    assert_eq!(scene.flush(), 1);
}
