//! # Holoforge Shared
//!
//! Common types used by the input collaborator, the voxel engine and the
//! frame loop.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a GPU, window or audio crate.
//! Rendering concerns live behind the `RenderSink` seam in `holoforge_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod key;
pub mod math;

pub use constants::{
    GRAVITY_ACCEL, GRID_SIZE, HORIZONTAL_DAMPING, KEY_SCALE, MAX_INSTANCES_PER_GROUP,
    RESTITUTION, RETURN_FACTOR,
};
pub use events::{CommandKind, VoxelCommand};
pub use key::{snap_to_grid, VoxelKey};
pub use math::Vec3;
