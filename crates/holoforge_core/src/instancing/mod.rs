//! Instanced rendering groups for same-color voxels.
//!
//! ## Key Concepts
//!
//! - **Instance Group**: one color, one dense transform buffer, one draw call
//! - **Slot**: a voxel's index inside its group's buffer
//! - **Swap-remove**: the last live slot fills every hole, so `0..count`
//!   is always the exact draw range

mod group;
mod pool;
mod transform;

pub use group::{DisplayColors, GroupMaterial, InstanceGroup};
pub use pool::{GroupId, InstanceGroupPool};
pub use transform::InstanceTransform;
