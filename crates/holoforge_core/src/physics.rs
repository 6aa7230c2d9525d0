//! # Voxel Motion
//!
//! A deliberately simple, single-axis motion law. There is no collision
//! between voxels and no rotation; every voxel moves on its own.
//!
//! Two modes, chosen by the caller every frame:
//!
//! - **Gravity**: fall with constant per-frame acceleration, bounce once on
//!   the floor plane (reflected and scaled vertical speed, damped
//!   horizontal speed), then rest with zero velocity.
//! - **Return**: ease toward the origin by a fixed lerp factor per frame.
//!   The approach is asymptotic and never lands exactly on the origin.
//!
//! A voxel that moves past the floor in one step is only clamped on the
//! frame after the overshoot is seen, and a voxel that bounced keeps its
//! last position after resting even if that is slightly below the floor.
//! Velocity carries over when the mode flips mid-fall.

use holoforge_shared::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::registry::{VoxelRecord, VoxelRegistry};
use crate::render::RenderSink;

/// Motion mode for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Fall onto the plane `y = floor_y`.
    Gravity {
        /// Floor height.
        floor_y: f32,
    },
    /// Ease back to the origin.
    #[default]
    Return,
}

impl MotionMode {
    /// Builds the mode from the caller's toggle and floor height.
    #[must_use]
    pub const fn from_flags(gravity_enabled: bool, floor_y: f32) -> Self {
        if gravity_enabled {
            Self::Gravity { floor_y }
        } else {
            Self::Return
        }
    }

    /// True in gravity mode.
    #[must_use]
    pub const fn gravity_enabled(self) -> bool {
        matches!(self, Self::Gravity { .. })
    }
}

/// What a voxel did during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionPhase {
    /// Airborne under gravity.
    Falling,
    /// Hit the floor this frame.
    Bounced,
    /// Resting on the floor.
    Resting,
    /// Easing toward its origin.
    Returning,
}

/// Per-pass counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    /// Voxels airborne.
    pub falling: u32,
    /// Voxels that hit the floor this frame.
    pub bounced: u32,
    /// Voxels resting on the floor.
    pub resting: u32,
    /// Voxels easing toward their origin.
    pub returning: u32,
}

impl PhysicsStats {
    fn record(&mut self, phase: MotionPhase) {
        match phase {
            MotionPhase::Falling => self.falling += 1,
            MotionPhase::Bounced => self.bounced += 1,
            MotionPhase::Resting => self.resting += 1,
            MotionPhase::Returning => self.returning += 1,
        }
    }

    /// Total voxels visited.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.falling + self.bounced + self.resting + self.returning
    }
}

/// Runs the motion law over every voxel in a registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhysicsIntegrator {
    config: PhysicsConfig,
}

impl PhysicsIntegrator {
    /// Creates an integrator with the given constants.
    #[must_use]
    pub const fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// The motion constants.
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advances every voxel by one frame and rewrites its transform.
    ///
    /// O(voxel count). Must not be interleaved with adds or removes.
    pub fn step<S: RenderSink>(&self, registry: &mut VoxelRegistry<S>, mode: MotionMode) -> PhysicsStats {
        let mut stats = PhysicsStats::default();
        registry.integrate(|record| stats.record(self.advance(record, mode)));
        stats
    }

    /// Advances one record by one frame.
    pub(crate) fn advance(&self, record: &mut VoxelRecord, mode: MotionMode) -> MotionPhase {
        let c = &self.config;
        match mode {
            MotionMode::Gravity { floor_y } => {
                if record.position.y > floor_y || record.velocity.y > 0.0 {
                    record.velocity.y -= c.gravity_accel;
                    record.position += record.velocity;
                    MotionPhase::Falling
                } else if !record.settled {
                    record.position.y = floor_y;
                    record.velocity.y = -record.velocity.y * c.restitution;
                    record.velocity.x *= c.horizontal_damping;
                    record.settled = true;
                    MotionPhase::Bounced
                } else {
                    record.velocity = Vec3::ZERO;
                    MotionPhase::Resting
                }
            }
            MotionMode::Return => {
                record.position = record.position.lerp(record.origin(), c.return_factor);
                record.settled = false;
                MotionPhase::Returning
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::palette::ColorIndex;

    fn registry_with(y: f32) -> (VoxelRegistry, holoforge_shared::VoxelKey) {
        let mut reg = VoxelRegistry::from_config(&SceneConfig::default()).unwrap();
        let key = reg.add(0.0, y, 0.0, ColorIndex::DEFAULT).unwrap().key();
        (reg, key)
    }

    #[test]
    fn test_first_falling_frame() {
        let (mut reg, key) = registry_with(5.0);
        let physics = PhysicsIntegrator::default();

        let stats = physics.step(&mut reg, MotionMode::Gravity { floor_y: 0.0 });
        assert_eq!(stats.falling, 1);

        let record = reg.get(key).unwrap();
        assert!((record.velocity().y + 0.025).abs() < 1e-6);
        assert!((record.position().y - 4.975).abs() < 1e-5);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_bounce_then_rest() {
        let (mut reg, key) = registry_with(5.0);
        let physics = PhysicsIntegrator::default();
        let gravity = MotionMode::Gravity { floor_y: 0.0 };

        // Fall until the overshoot is visible
        let mut frames = 0;
        while reg.get(key).unwrap().position().y > 0.0 {
            physics.step(&mut reg, gravity);
            frames += 1;
            assert!(frames < 1000);
        }
        let impact_speed = reg.get(key).unwrap().velocity().y;
        assert!(impact_speed < 0.0);

        let stats = physics.step(&mut reg, gravity);
        assert_eq!(stats.bounced, 1);
        let record = reg.get(key).unwrap();
        assert!(record.position().y.abs() < f32::EPSILON);
        assert!((record.velocity().y - (-impact_speed * 0.15)).abs() < 1e-6);
        assert!(record.is_settled());

        // The small rebound falls back and then rests
        for _ in 0..100 {
            physics.step(&mut reg, gravity);
        }
        let record = reg.get(key).unwrap();
        assert_eq!(record.velocity(), Vec3::ZERO);
        assert!(record.position().y <= 0.0);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_return_mode_clears_settle_flag() {
        let (mut reg, key) = registry_with(0.0);
        let physics = PhysicsIntegrator::default();

        physics.step(&mut reg, MotionMode::Gravity { floor_y: 0.0 });
        assert!(reg.get(key).unwrap().is_settled());

        physics.step(&mut reg, MotionMode::Return);
        assert!(!reg.get(key).unwrap().is_settled());
    }

    #[test]
    fn test_return_mode_is_exact_lerp() {
        let (mut reg, key) = registry_with(2.0);
        reg.update_position(key, Vec3::new(10.0, 2.0, 0.0)).unwrap();

        let physics = PhysicsIntegrator::default();
        physics.step(&mut reg, MotionMode::Return);

        // 10 + (0 - 10) * 0.1
        assert!((reg.get(key).unwrap().position().x - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(MotionMode::from_flags(false, 3.0), MotionMode::Return);
        assert_eq!(MotionMode::from_flags(true, -2.0), MotionMode::Gravity { floor_y: -2.0 });
        assert!(MotionMode::from_flags(true, 0.0).gravity_enabled());
    }
}
