//! # Instance Group Pool
//!
//! Owns one [`InstanceGroup`] per concrete color. Groups are created
//! lazily on the first voxel of their color and live until [`clear`].
//!
//! [`clear`]: InstanceGroupPool::clear

use std::collections::HashMap;

use holoforge_shared::VoxelKey;
use tracing::debug;

use super::group::{GroupMaterial, InstanceGroup};
use super::transform::InstanceTransform;
use crate::error::{VoxelError, VoxelResult};
use crate::palette::Color;
use crate::render::RenderSink;

/// Stable index of a group inside its pool.
///
/// Valid until the pool is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u32);

impl GroupId {
    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// All color groups, indexed by concrete color.
pub struct InstanceGroupPool {
    groups: Vec<InstanceGroup>,
    by_color: HashMap<Color, GroupId>,
    capacity: usize,
    material: GroupMaterial,
}

impl InstanceGroupPool {
    /// Creates an empty pool whose groups will each hold `capacity` instances.
    #[must_use]
    pub fn new(capacity: usize, material: GroupMaterial) -> Self {
        Self {
            groups: Vec::new(),
            by_color: HashMap::new(),
            capacity,
            material,
        }
    }

    /// Per-group capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no group exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the group for `color`, creating and registering it if absent.
    pub fn get_or_create<S: RenderSink + ?Sized>(&mut self, color: Color, sink: &mut S) -> GroupId {
        if let Some(&id) = self.by_color.get(&color) {
            return id;
        }

        let id = GroupId(u32::try_from(self.groups.len()).unwrap_or(u32::MAX));
        let handle = sink.register_group(color, self.capacity);
        self.groups
            .push(InstanceGroup::new(color, self.capacity, self.material, handle));
        self.by_color.insert(color, id);
        debug!(%color, capacity = self.capacity, "created instance group");
        id
    }

    /// Checks that a voxel of `color` would fit, without creating its group.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the color's group is full, or if the pool's
    /// capacity is zero and the group does not exist yet.
    pub fn ensure_room(&self, color: Color) -> VoxelResult<()> {
        let full = match self.find(color).and_then(|id| self.group(id)) {
            Some(group) => group.is_full(),
            None => self.capacity == 0,
        };
        if full {
            Err(VoxelError::CapacityExceeded {
                color,
                capacity: self.capacity,
            })
        } else {
            Ok(())
        }
    }

    /// Looks up the group for `color` without creating it.
    #[must_use]
    pub fn find(&self, color: Color) -> Option<GroupId> {
        self.by_color.get(&color).copied()
    }

    /// Group by id.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&InstanceGroup> {
        self.groups.get(id.index())
    }

    /// Mutable group by id.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut InstanceGroup> {
        self.groups.get_mut(id.index())
    }

    /// Appends a transform to a group, returning its slot.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the group is full. Nothing changes.
    /// `GroupNotFound` for a stale id.
    pub fn append(
        &mut self,
        id: GroupId,
        owner: VoxelKey,
        transform: InstanceTransform,
    ) -> VoxelResult<usize> {
        let group = self.groups.get_mut(id.index()).ok_or(VoxelError::GroupNotFound(id.index()))?;
        group.append(owner, transform).ok_or(VoxelError::CapacityExceeded {
            color: group.color(),
            capacity: group.capacity(),
        })
    }

    /// Swap-removes a slot. Returns the voxel relocated into `slot`, if any.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange` if `slot` is not live, `GroupNotFound` for a stale id.
    pub fn swap_remove(&mut self, id: GroupId, slot: usize) -> VoxelResult<Option<VoxelKey>> {
        match self.groups.get_mut(id.index()) {
            Some(group) => group.swap_remove(slot),
            None => Err(VoxelError::GroupNotFound(id.index())),
        }
    }

    /// Overwrites a slot's transform. Returns whether it changed.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange` if `slot` is not live, `GroupNotFound` for a stale id.
    pub fn write(&mut self, id: GroupId, slot: usize, transform: InstanceTransform) -> VoxelResult<bool> {
        match self.groups.get_mut(id.index()) {
            Some(group) => group.write(slot, transform),
            None => Err(VoxelError::GroupNotFound(id.index())),
        }
    }

    /// Iterates over every group.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &InstanceGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GroupId(i as u32), g))
    }

    /// Iterates mutably over every group.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut InstanceGroup> {
        self.groups.iter_mut()
    }

    /// Iterates over groups whose buffer changed since the last upload.
    pub fn dirty_groups(&self) -> impl Iterator<Item = &InstanceGroup> {
        self.groups.iter().filter(|g| g.is_dirty())
    }

    /// Clears every dirty flag.
    pub fn clear_dirty(&mut self) {
        for group in &mut self.groups {
            group.clear_dirty();
        }
    }

    /// Destroys every group, releasing its renderable.
    pub fn clear<S: RenderSink + ?Sized>(&mut self, sink: &mut S) {
        for group in self.groups.drain(..) {
            sink.release_group(group.handle());
        }
        self.by_color.clear();
        debug!("destroyed all instance groups");
    }
}
