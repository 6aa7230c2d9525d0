//! Per-instance transform data for GPU upload.

use bytemuck::{Pod, Zeroable};
use holoforge_shared::Vec3;

/// Per-instance transform consumed by the instanced draw.
///
/// Column-major 4x4 matrix. Voxels never rotate or scale, so only the
/// translation column ever differs from identity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Matrix columns.
    pub columns: [[f32; 4]; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Identity transform.
    pub const IDENTITY: Self = Self {
        columns: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a pure translation.
    #[must_use]
    pub const fn from_translation(position: Vec3) -> Self {
        let mut transform = Self::IDENTITY;
        transform.columns[3] = [position.x, position.y, position.z, 1.0];
        transform
    }

    /// Returns the translation column.
    #[must_use]
    pub const fn translation(&self) -> Vec3 {
        let c = self.columns[3];
        Vec3::new(c[0], c[1], c[2])
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_size() {
        // 16 floats, same layout as a mat4x4<f32> instance attribute
        assert_eq!(InstanceTransform::SIZE, 64);
    }

    #[test]
    fn test_translation_round_trip() {
        let p = Vec3::new(1.2, -3.6, 0.0);
        let t = InstanceTransform::from_translation(p);
        assert_eq!(t.translation(), p);
        assert_eq!(t.columns[0], [1.0, 0.0, 0.0, 0.0]);
    }
}
