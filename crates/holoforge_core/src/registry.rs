//! # Voxel Registry
//!
//! Maps quantized grid keys to voxel records and keeps every record's
//! slot in sync with its color group's dense buffer.
//!
//! ## Invariants
//!
//! - At most one record per key.
//! - For every record, `slot < group.count() <= group.capacity()`.
//! - `group.count()` equals the number of records pointing at the group.
//! - A group's slot `i` holds the transform of the record that owns slot `i`.

use std::collections::HashMap;

use holoforge_shared::{Vec3, VoxelKey};
use tracing::{debug, trace, warn};

use crate::config::SceneConfig;
use crate::error::{ConfigResult, VoxelError, VoxelResult};
use crate::instancing::{GroupId, GroupMaterial, InstanceGroup, InstanceGroupPool, InstanceTransform};
use crate::palette::{resolve, ColorIndex};
use crate::render::{HeadlessSink, RenderSink};

/// One occupied grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelRecord {
    key: VoxelKey,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    origin: Vec3,
    color_index: ColorIndex,
    pub(crate) settled: bool,
    group: GroupId,
    slot: usize,
}

impl VoxelRecord {
    /// Quantized identity.
    #[must_use]
    pub const fn key(&self) -> VoxelKey {
        self.key
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity (world units per frame).
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Rest position recorded at creation.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Palette index.
    #[must_use]
    pub const fn color_index(&self) -> ColorIndex {
        self.color_index
    }

    /// True once the voxel has come to rest on the floor.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    /// Owning group.
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Slot inside the owning group's buffer.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

/// Result of a successful [`VoxelRegistry::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new voxel was created.
    Inserted(VoxelKey),
    /// A voxel already occupied the key; nothing changed.
    AlreadyPresent(VoxelKey),
}

impl AddOutcome {
    /// The key that was targeted.
    #[must_use]
    pub const fn key(self) -> VoxelKey {
        match self {
            Self::Inserted(key) | Self::AlreadyPresent(key) => key,
        }
    }

    /// True if a voxel was created.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Sparse voxel storage backed by dense per-color instance buffers.
pub struct VoxelRegistry<S: RenderSink = HeadlessSink> {
    records: HashMap<VoxelKey, VoxelRecord>,
    pool: InstanceGroupPool,
    sink: S,
}

impl VoxelRegistry<HeadlessSink> {
    /// Creates a registry with a headless render sink.
    #[must_use]
    pub fn new(capacity: usize, material: GroupMaterial) -> Self {
        Self::with_sink(capacity, material, HeadlessSink::new())
    }

    /// Creates a headless registry from a validated scene config.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the config fails [`SceneConfig::validate`].
    pub fn from_config(config: &SceneConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::new(config.group_capacity, config.group_material()))
    }
}

impl<S: RenderSink> VoxelRegistry<S> {
    /// Creates a registry that reports groups to `sink`.
    #[must_use]
    pub fn with_sink(capacity: usize, material: GroupMaterial, sink: S) -> Self {
        Self {
            records: HashMap::new(),
            pool: InstanceGroupPool::new(capacity, material),
            sink,
        }
    }

    /// Adds a voxel at `(x, y, z)`.
    ///
    /// A second add at the same quantized key is a no-op reported as
    /// [`AddOutcome::AlreadyPresent`].
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the color's group is full. Nothing changes.
    pub fn add(&mut self, x: f32, y: f32, z: f32, color_index: ColorIndex) -> VoxelResult<AddOutcome> {
        self.add_at(Vec3::new(x, y, z), color_index)
    }

    /// Adds a voxel at `position`. See [`Self::add`].
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the color's group is full. Nothing changes.
    pub fn add_at(&mut self, position: Vec3, color_index: ColorIndex) -> VoxelResult<AddOutcome> {
        let key = VoxelKey::quantize(position);
        if self.records.contains_key(&key) {
            return Ok(AddOutcome::AlreadyPresent(key));
        }

        let color = resolve(color_index);
        // A full color must not leave a fresh group behind
        if let Err(error) = self.pool.ensure_room(color) {
            warn!(%key, %error, "voxel rejected");
            return Err(error);
        }
        let group = self.pool.get_or_create(color, &mut self.sink);
        let slot = self
            .pool
            .append(group, key, InstanceTransform::from_translation(position))?;

        self.records.insert(
            key,
            VoxelRecord {
                key,
                position,
                velocity: Vec3::ZERO,
                origin: position,
                color_index,
                settled: false,
                group,
                slot,
            },
        );
        trace!(%key, slot, "voxel added");
        Ok(AddOutcome::Inserted(key))
    }

    /// Removes the voxel at `key`. Returns `false` if there was none.
    pub fn remove(&mut self, key: VoxelKey) -> bool {
        let Some((group, slot)) = self.records.get(&key).map(|r| (r.group, r.slot)) else {
            return false;
        };

        // Leave the record in place if its slot cannot be released
        let moved = match self.pool.swap_remove(group, slot) {
            Ok(moved) => moved,
            Err(error) => {
                warn!(%key, %error, "group out of sync with registry");
                return false;
            }
        };

        self.records.remove(&key);
        if let Some(moved_record) = moved.and_then(|m| self.records.get_mut(&m)) {
            moved_record.slot = slot;
        }
        trace!(%key, "voxel removed");
        true
    }

    /// Moves a voxel. Velocity, origin and key are untouched.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if no voxel exists at `key`.
    pub fn update_position(&mut self, key: VoxelKey, position: Vec3) -> VoxelResult<()> {
        let record = self
            .records
            .get_mut(&key)
            .ok_or(VoxelError::KeyNotFound(key))?;
        record.position = position;
        self.pool
            .write(record.group, record.slot, InstanceTransform::from_translation(position))?;
        Ok(())
    }

    /// Record at `key`.
    #[must_use]
    pub fn get(&self, key: VoxelKey) -> Option<&VoxelRecord> {
        self.records.get(&key)
    }

    /// True if a voxel exists at `key`.
    #[must_use]
    pub fn contains(&self, key: VoxelKey) -> bool {
        self.records.contains_key(&key)
    }

    /// Total live voxels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// True when no voxel exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over every record (arbitrary order).
    pub fn records(&self) -> impl Iterator<Item = &VoxelRecord> {
        self.records.values()
    }

    /// The group pool.
    #[must_use]
    pub const fn pool(&self) -> &InstanceGroupPool {
        &self.pool
    }

    /// Mutable group pool, for display overrides.
    pub fn pool_mut(&mut self) -> &mut InstanceGroupPool {
        &mut self.pool
    }

    /// Group by id.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&InstanceGroup> {
        self.pool.group(id)
    }

    /// Iterates over every group.
    pub fn groups(&self) -> impl Iterator<Item = &InstanceGroup> {
        self.pool.iter().map(|(_, group)| group)
    }

    /// Number of color groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.pool.len()
    }

    /// The render sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable render sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Removes every voxel and destroys every group.
    pub fn clear(&mut self) {
        let removed = self.records.len();
        self.records.clear();
        self.pool.clear(&mut self.sink);
        debug!(removed, "registry cleared");
    }

    /// Uploads every dirty group to the sink and clears the flags.
    ///
    /// Returns the number of groups uploaded.
    pub fn flush(&mut self) -> usize {
        let mut uploaded = 0;
        for group in self.pool.dirty_groups() {
            self.sink.upload_group(group);
            uploaded += 1;
        }
        self.pool.clear_dirty();
        uploaded
    }

    /// Checks every registry invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut referencing = vec![0usize; self.pool.len()];

        for record in self.records.values() {
            let Some(group) = self.pool.group(record.group) else {
                return false;
            };
            if record.slot >= group.count()
                || group.owner(record.slot) != Some(record.key)
                || group.transform(record.slot)
                    != Some(&InstanceTransform::from_translation(record.position))
            {
                return false;
            }
            referencing[record.group.index()] += 1;
        }

        self.pool
            .iter()
            .all(|(id, group)| group.count() == referencing[id.index()] && group.count() <= group.capacity())
    }

    /// Runs `step` on every record, then rewrites its slot transform.
    pub(crate) fn integrate<F>(&mut self, mut step: F)
    where
        F: FnMut(&mut VoxelRecord),
    {
        for record in self.records.values_mut() {
            step(record);
            let transform = InstanceTransform::from_translation(record.position);
            if let Err(error) = self.pool.write(record.group, record.slot, transform) {
                warn!(key = %record.key, %error, "group out of sync with registry");
            }
        }
    }
}
