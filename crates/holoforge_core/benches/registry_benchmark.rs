//! # Registry Benchmark
//!
//! Measures the per-frame costs a full scene pays:
//! 1. Add/remove churn against a half-full group
//! 2. One physics step over every voxel (gravity and return)
//! 3. Flushing dirty groups to a headless sink

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use holoforge_core::{
    ColorIndex, MotionMode, PhysicsIntegrator, SceneConfig, VoxelKey, VoxelRegistry,
};

const GRID_SIDE: usize = 40;

/// Fills a `side x side` floor at height `y`, cycling through colors.
fn populated(side: usize, y: f32) -> VoxelRegistry {
    let mut registry = VoxelRegistry::from_config(&SceneConfig::default()).unwrap();
    for i in 0..side * side {
        let x = (i % side) as f32 * 1.2;
        let z = (i / side) as f32 * 1.2;
        let color = ColorIndex::new((i % 21) as u8).unwrap_or(ColorIndex::DEFAULT);
        let _ = registry.add(x, y, z, color);
    }
    registry
}

// =============================================================================
// CHURN
// =============================================================================

fn bench_add_remove(c: &mut Criterion) {
    let mut registry = populated(GRID_SIDE, 0.0);
    let key = VoxelKey::from_coords(-5.0, 0.0, -5.0);

    c.bench_function("add_remove_single_1600", |b| {
        b.iter(|| {
            let _ = registry.add(-5.0, 0.0, -5.0, ColorIndex::DEFAULT);
            black_box(registry.remove(black_box(key)))
        });
    });
}

// =============================================================================
// PHYSICS
// =============================================================================

fn bench_physics_step(c: &mut Criterion) {
    let physics = PhysicsIntegrator::default();
    let mut group = c.benchmark_group("physics_step");

    for side in [10, 40, 100] {
        let mut registry = populated(side, 50.0);
        group.bench_with_input(BenchmarkId::new("gravity", side * side), &side, |b, _| {
            b.iter(|| black_box(physics.step(&mut registry, MotionMode::Gravity { floor_y: -1.0e6 })));
        });

        let mut registry = populated(side, 0.0);
        group.bench_with_input(BenchmarkId::new("return", side * side), &side, |b, _| {
            b.iter(|| black_box(physics.step(&mut registry, MotionMode::Return)));
        });
    }

    group.finish();
}

// =============================================================================
// UPLOAD
// =============================================================================

fn bench_flush(c: &mut Criterion) {
    let physics = PhysicsIntegrator::default();
    let mut registry = populated(GRID_SIDE, 50.0);

    c.bench_function("step_and_flush_1600", |b| {
        b.iter(|| {
            physics.step(&mut registry, MotionMode::Gravity { floor_y: -1.0e6 });
            black_box(registry.flush())
        });
    });
}

criterion_group!(benches, bench_add_remove, bench_physics_step, bench_flush);
criterion_main!(benches);
