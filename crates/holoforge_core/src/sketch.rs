//! # Sketch Staging
//!
//! Positions traced by the user are staged here before they become real
//! voxels. Staging snaps to the grid and skips anything already staged or
//! already built; committing turns every staged position into a voxel.

use std::collections::HashSet;

use holoforge_shared::{snap_to_grid, Vec3, VoxelKey};
use tracing::{debug, warn};

use crate::palette::ColorIndex;
use crate::registry::VoxelRegistry;
use crate::render::RenderSink;

/// Outcome of [`SketchBuffer::commit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Voxels created.
    pub added: usize,
    /// Staged positions already occupied at commit time.
    pub skipped: usize,
    /// Staged positions refused because their group was full.
    pub rejected: usize,
}

/// Pending positions, in staging order.
#[derive(Debug)]
pub struct SketchBuffer {
    grid_size: f32,
    pending: Vec<Vec3>,
    keys: HashSet<VoxelKey>,
}

impl SketchBuffer {
    /// Creates an empty sketch that snaps to `grid_size`.
    #[must_use]
    pub fn new(grid_size: f32) -> Self {
        Self {
            grid_size,
            pending: Vec::new(),
            keys: HashSet::new(),
        }
    }

    /// Number of staged positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True if `key` is staged.
    #[must_use]
    pub fn contains(&self, key: VoxelKey) -> bool {
        self.keys.contains(&key)
    }

    /// Staged positions, in staging order.
    #[must_use]
    pub fn pending(&self) -> &[Vec3] {
        &self.pending
    }

    /// Stages a position. Returns the key if something new was staged.
    pub fn stage<S: RenderSink>(&mut self, position: Vec3, registry: &VoxelRegistry<S>) -> Option<VoxelKey> {
        let snapped = snap_to_grid(position, self.grid_size);
        let key = VoxelKey::quantize(snapped);
        if self.keys.contains(&key) || registry.contains(key) {
            return None;
        }

        self.keys.insert(key);
        self.pending.push(snapped);
        Some(key)
    }

    /// Adds every staged position to the registry and empties the sketch.
    pub fn commit<S: RenderSink>(&mut self, registry: &mut VoxelRegistry<S>, color: ColorIndex) -> CommitReport {
        let mut report = CommitReport::default();

        for position in self.pending.drain(..) {
            match registry.add_at(position, color) {
                Ok(outcome) if outcome.is_inserted() => report.added += 1,
                Ok(_) => report.skipped += 1,
                Err(_) => report.rejected += 1,
            }
        }
        self.keys.clear();

        if report.rejected > 0 {
            warn!(rejected = report.rejected, "sketch commit hit group capacity");
        }
        debug!(added = report.added, skipped = report.skipped, "sketch committed");
        report
    }

    /// Drops every staged position.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.keys.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn setup(capacity: usize) -> (SketchBuffer, VoxelRegistry) {
        let config = SceneConfig {
            group_capacity: capacity,
            ..SceneConfig::default()
        };
        (SketchBuffer::new(config.grid_size), VoxelRegistry::from_config(&config).unwrap())
    }

    #[test]
    fn test_stage_snaps_and_dedupes() {
        let (mut sketch, reg) = setup(8);
        let key = sketch.stage(Vec3::new(1.1, 0.1, 0.0), &reg).unwrap();
        assert_eq!(key, VoxelKey::from_coords(1.2, 0.0, 0.0));
        assert!(sketch.stage(Vec3::new(1.3, -0.2, 0.1), &reg).is_none());
        assert_eq!(sketch.len(), 1);
    }

    #[test]
    fn test_stage_skips_existing_voxels() {
        let (mut sketch, mut reg) = setup(8);
        reg.add(1.2, 0.0, 0.0, ColorIndex::DEFAULT).unwrap();
        assert!(sketch.stage(Vec3::new(1.2, 0.0, 0.0), &reg).is_none());
        assert!(sketch.is_empty());
    }

    #[test]
    fn test_commit_adds_everything() {
        let (mut sketch, mut reg) = setup(8);
        for i in 0..3 {
            sketch.stage(Vec3::new(i as f32 * 1.2, 0.0, 0.0), &reg);
        }

        let report = sketch.commit(&mut reg, ColorIndex::DEFAULT);
        assert_eq!(report, CommitReport { added: 3, skipped: 0, rejected: 0 });
        assert!(sketch.is_empty());
        assert_eq!(reg.count(), 3);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_commit_reports_capacity() {
        let (mut sketch, mut reg) = setup(2);
        for i in 0..3 {
            sketch.stage(Vec3::new(0.0, i as f32 * 1.2, 0.0), &reg);
        }

        let report = sketch.commit(&mut reg, ColorIndex::DEFAULT);
        assert_eq!(report.added, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(reg.count(), 2);
    }

    #[test]
    fn test_discard() {
        let (mut sketch, reg) = setup(8);
        sketch.stage(Vec3::ZERO, &reg);
        assert_eq!(sketch.discard(), 1);
        assert!(sketch.stage(Vec3::ZERO, &reg).is_some());
    }
}
