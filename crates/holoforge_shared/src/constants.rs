//! # Tuning Constants
//!
//! Defaults for the voxel builder. Every value here can be overridden
//! through `SceneConfig` in `holoforge_core`; these are the values the
//! builder ships with.

// =============================================================================
// GRID
// =============================================================================

/// Edge length of one grid cell in world units.
pub const GRID_SIZE: f32 = 1.2;

/// Quantization scale for voxel keys (one decimal place).
pub const KEY_SCALE: f32 = 10.0;

/// Fixed instance capacity of every color group.
pub const MAX_INSTANCES_PER_GROUP: usize = 10_000;

// =============================================================================
// PHYSICS (per frame, not per second)
// =============================================================================

/// Downward acceleration applied each frame while falling.
pub const GRAVITY_ACCEL: f32 = 0.025;

/// Fraction of vertical speed kept (and reversed) on floor impact.
pub const RESTITUTION: f32 = 0.15;

/// Horizontal velocity multiplier applied on floor impact.
pub const HORIZONTAL_DAMPING: f32 = 0.5;

/// Lerp factor toward the origin while gravity is off.
pub const RETURN_FACTOR: f32 = 0.1;
