//! # Quantized Voxel Keys
//!
//! A voxel's identity is its position rounded to one decimal place. Two
//! positions that round to the same tenths on every axis name the same
//! voxel, so floating point jitter from the input collaborator never
//! produces duplicate cells.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::KEY_SCALE;
use crate::math::Vec3;

/// Quantized grid coordinate, stored as integer tenths per axis.
///
/// Renders as `"x.x,y.y,z.z"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoxelKey {
    x: i32,
    y: i32,
    z: i32,
}

impl VoxelKey {
    /// Quantizes a position into a key.
    ///
    /// Positions must be [representable](Self::is_representable); the scene
    /// boundary rejects anything else.
    #[must_use]
    pub fn quantize(position: Vec3) -> Self {
        Self {
            x: quantize_axis(position.x),
            y: quantize_axis(position.y),
            z: quantize_axis(position.z),
        }
    }

    /// Quantizes raw coordinates into a key.
    #[must_use]
    pub fn from_coords(x: f32, y: f32, z: f32) -> Self {
        Self::quantize(Vec3::new(x, y, z))
    }

    /// Builds a key directly from integer tenths.
    #[must_use]
    pub const fn from_tenths(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Largest coordinate magnitude whose tenths fit the key without
    /// saturating.
    pub const MAX_COORDINATE: f32 = 100_000_000.0;

    /// True if every axis of `position` quantizes to a distinct key.
    ///
    /// False for NaN, infinities and anything beyond
    /// [`Self::MAX_COORDINATE`].
    #[must_use]
    pub fn is_representable(position: Vec3) -> bool {
        position.to_array().iter().all(|v| v.abs() <= Self::MAX_COORDINATE)
    }

    /// Returns the snapped position this key names.
    #[must_use]
    pub fn position(self) -> Vec3 {
        Vec3::new(
            self.x as f32 / KEY_SCALE,
            self.y as f32 / KEY_SCALE,
            self.z as f32 / KEY_SCALE,
        )
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn quantize_axis(value: f32) -> i32 {
    (value * KEY_SCALE).round() as i32
}

impl fmt::Display for VoxelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = f64::from(KEY_SCALE);
        write!(
            f,
            "{:.1},{:.1},{:.1}",
            f64::from(self.x) / scale,
            f64::from(self.y) / scale,
            f64::from(self.z) / scale
        )
    }
}

/// Snaps a position to the nearest multiple of `grid_size` on every axis.
#[must_use]
pub fn snap_to_grid(position: Vec3, grid_size: f32) -> Vec3 {
    let snap = |v: f32| (v / grid_size).round() * grid_size;
    Vec3::new(snap(position.x), snap(position.y), snap(position.z))
}
