//! A single color's dense instance buffer.

use holoforge_shared::VoxelKey;

use super::transform::InstanceTransform;
use crate::error::{VoxelError, VoxelResult};
use crate::palette::Color;
use crate::render::RenderHandle;

/// Static material parameters shared by every group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupMaterial {
    /// Dark base fill under the emissive color.
    pub base_fill: Color,
    /// Fill opacity.
    pub opacity: f32,
    /// Cube edge length in world units.
    pub extent: f32,
    /// Emissive intensity outside rainbow mode.
    pub base_intensity: f32,
}

/// Display colors the renderer reads each frame.
///
/// Independent of instance data; rainbow mode rewrites these without
/// touching a single transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayColors {
    /// Emissive fill color (RGB).
    pub fill: [f32; 3],
    /// Emissive intensity.
    pub intensity: f32,
    /// Outline color (RGB).
    pub outline: [f32; 3],
}

impl DisplayColors {
    /// Display colors implied by a palette color.
    #[must_use]
    pub fn from_color(color: Color, intensity: f32) -> Self {
        let rgb = color.to_rgb();
        Self {
            fill: rgb,
            intensity,
            outline: rgb,
        }
    }
}

/// Dense, fixed-capacity transform buffer for one color.
///
/// Slots `0..count` are live. Removal swaps the last live slot into the
/// hole so the buffer stays compact and can be drawn with one instanced
/// call of `count` instances.
pub struct InstanceGroup {
    color: Color,
    capacity: usize,
    count: usize,
    transforms: Box<[InstanceTransform]>,
    /// Reverse index: which voxel owns each slot.
    owners: Box<[Option<VoxelKey>]>,
    material: GroupMaterial,
    display: DisplayColors,
    handle: RenderHandle,
    dirty: bool,
}

impl InstanceGroup {
    /// Creates an empty group with all storage allocated up front.
    #[must_use]
    pub fn new(color: Color, capacity: usize, material: GroupMaterial, handle: RenderHandle) -> Self {
        Self {
            color,
            capacity,
            count: 0,
            transforms: vec![InstanceTransform::IDENTITY; capacity].into_boxed_slice(),
            owners: vec![None; capacity].into_boxed_slice(),
            material,
            display: DisplayColors::from_color(color, material.base_intensity),
            handle,
            dirty: false,
        }
    }

    /// Concrete palette color this group was created for.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Fixed capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live instance count.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// True when no slot is free.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// True when no slot is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live transforms, `0..count`.
    #[must_use]
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms[..self.count]
    }

    /// Transform at a live slot.
    #[must_use]
    pub fn transform(&self, slot: usize) -> Option<&InstanceTransform> {
        self.transforms().get(slot)
    }

    /// Voxel owning a live slot.
    #[must_use]
    pub fn owner(&self, slot: usize) -> Option<VoxelKey> {
        if slot < self.count {
            self.owners[slot]
        } else {
            None
        }
    }

    /// Live transforms as bytes for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.transforms())
    }

    /// Static material parameters.
    #[must_use]
    pub const fn material(&self) -> &GroupMaterial {
        &self.material
    }

    /// Current display colors.
    #[must_use]
    pub const fn display(&self) -> &DisplayColors {
        &self.display
    }

    /// Overrides the display colors.
    pub fn set_display(&mut self, display: DisplayColors) {
        self.display = display;
    }

    /// Restores the display colors implied by the palette color.
    pub fn reset_display(&mut self) {
        self.display = DisplayColors::from_color(self.color, self.material.base_intensity);
    }

    /// Renderable handle issued by the render sink.
    #[must_use]
    pub const fn handle(&self) -> RenderHandle {
        self.handle
    }

    /// True when the transform buffer changed since the last upload.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the buffer for re-upload.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the upload flag.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Appends a transform at slot `count`.
    ///
    /// Returns the slot, or `None` if the group is full (nothing changes).
    pub(crate) fn append(&mut self, owner: VoxelKey, transform: InstanceTransform) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let slot = self.count;
        self.transforms[slot] = transform;
        self.owners[slot] = Some(owner);
        self.count += 1;
        self.dirty = true;
        Some(slot)
    }

    /// Removes the instance at `slot`, moving the last live instance into it.
    ///
    /// Returns the key of the voxel that now lives at `slot`, if one moved.
    pub(crate) fn swap_remove(&mut self, slot: usize) -> VoxelResult<Option<VoxelKey>> {
        if slot >= self.count {
            return Err(VoxelError::SlotOutOfRange {
                slot,
                count: self.count,
            });
        }

        let last = self.count - 1;
        let relocated = if slot == last {
            None
        } else {
            self.transforms[slot] = self.transforms[last];
            self.owners[slot] = self.owners[last];
            self.owners[slot]
        };

        self.owners[last] = None;
        self.count = last;
        self.dirty = true;
        Ok(relocated)
    }

    /// Overwrites a live slot. Marks dirty only if the transform changed.
    pub(crate) fn write(&mut self, slot: usize, transform: InstanceTransform) -> VoxelResult<bool> {
        if slot >= self.count {
            return Err(VoxelError::SlotOutOfRange {
                slot,
                count: self.count,
            });
        }

        if self.transforms[slot] == transform {
            return Ok(false);
        }
        self.transforms[slot] = transform;
        self.dirty = true;
        Ok(true)
    }
}
