//! # Voxel Scene
//!
//! The context object the rest of the application holds. It owns the
//! registry, the motion integrator, the rainbow override and the sketch,
//! and exposes the input surface the gesture layer drives:
//!
//! ```text
//! add_voxel / remove_voxel / clear_all / set_gravity / set_rainbow
//!            │
//!            ▼
//!      VoxelRegistry ──► InstanceGroupPool ──► RenderSink
//!            ▲
//!            │ tick()
//!     PhysicsIntegrator
//! ```
//!
//! This is also where caller preconditions are checked: raw palette
//! indices, non-finite coordinates and coordinates too large to quantize
//! are refused here with a [`VoxelError`], so nothing below ever sees
//! them. Configs are validated on construction.

use holoforge_shared::{Vec3, VoxelCommand, VoxelKey};
use tracing::{debug, warn};

use crate::config::SceneConfig;
use crate::error::{ConfigResult, VoxelError, VoxelResult};
use crate::physics::{MotionMode, PhysicsIntegrator, PhysicsStats};
use crate::palette::ColorIndex;
use crate::rainbow::RainbowModulator;
use crate::registry::{AddOutcome, VoxelRegistry};
use crate::render::{HeadlessSink, RenderSink};
use crate::sketch::{CommitReport, SketchBuffer};

/// What a dispatched command did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    /// Result of an add.
    Added(AddOutcome),
    /// Whether a voxel was removed.
    Removed(bool),
    /// Key staged, if anything new was staged.
    Staged(Option<VoxelKey>),
    /// Result of a sketch commit.
    Committed(CommitReport),
    /// Staged positions dropped.
    Discarded(usize),
    /// Voxels removed by a clear.
    Cleared(usize),
    /// New motion mode.
    GravitySet(MotionMode),
    /// Groups recolored.
    RainbowSet(usize),
}

/// Owned voxel scene.
pub struct VoxelScene<S: RenderSink = HeadlessSink> {
    registry: VoxelRegistry<S>,
    physics: PhysicsIntegrator,
    rainbow: RainbowModulator,
    sketch: SketchBuffer,
    mode: MotionMode,
    frame: u64,
}

impl VoxelScene<HeadlessSink> {
    /// Creates a headless scene.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if `config` fails validation.
    pub fn new(config: &SceneConfig) -> ConfigResult<Self> {
        Self::with_sink(config, HeadlessSink::new())
    }
}

impl<S: RenderSink> VoxelScene<S> {
    /// Creates a scene reporting groups to `sink`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if `config` fails validation.
    pub fn with_sink(config: &SceneConfig, sink: S) -> ConfigResult<Self> {
        config.validate()?;
        let rainbow = match config.rainbow_seed {
            Some(seed) => RainbowModulator::seeded(&config.display, seed),
            None => RainbowModulator::new(&config.display),
        };

        Ok(Self {
            registry: VoxelRegistry::with_sink(config.group_capacity, config.group_material(), sink),
            physics: PhysicsIntegrator::new(config.physics),
            rainbow,
            sketch: SketchBuffer::new(config.grid_size),
            mode: MotionMode::default(),
            frame: 0,
        })
    }

    // =========================================================================
    // Input surface
    // =========================================================================

    /// Adds a voxel.
    ///
    /// # Errors
    ///
    /// `NonFiniteCoordinate`, `CoordinateOutOfRange`, `InvalidColorIndex`,
    /// or `CapacityExceeded`.
    pub fn add_voxel(&mut self, x: f32, y: f32, z: f32, color_index: u8) -> VoxelResult<AddOutcome> {
        let position = checked(Vec3::new(x, y, z))?;
        let color = ColorIndex::try_from(color_index)?;
        self.registry.add_at(position, color)
    }

    /// Removes the voxel at `key`. Returns `false` if there was none.
    pub fn remove_voxel(&mut self, key: VoxelKey) -> bool {
        self.registry.remove(key)
    }

    /// Moves a voxel without changing its identity or origin.
    ///
    /// # Errors
    ///
    /// `NonFiniteCoordinate` or `KeyNotFound`.
    pub fn update_voxel(&mut self, key: VoxelKey, position: Vec3) -> VoxelResult<()> {
        if !position.is_finite() {
            return Err(VoxelError::NonFiniteCoordinate);
        }
        self.registry.update_position(key, position)
    }

    /// Removes every voxel, every group, and any staged sketch.
    ///
    /// Returns the number of voxels removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.registry.count();
        self.registry.clear();
        self.sketch.discard();
        removed
    }

    /// Sets the motion mode applied from the next tick on.
    ///
    /// # Errors
    ///
    /// `NonFiniteCoordinate` if `floor_y` is NaN or infinite.
    pub fn set_gravity(&mut self, enabled: bool, floor_y: f32) -> VoxelResult<MotionMode> {
        if !floor_y.is_finite() {
            return Err(VoxelError::NonFiniteCoordinate);
        }
        self.mode = MotionMode::from_flags(enabled, floor_y);
        debug!(enabled, floor_y, "gravity mode");
        Ok(self.mode)
    }

    /// Applies or removes rainbow display colors. Returns groups recolored.
    pub fn set_rainbow(&mut self, enabled: bool) -> usize {
        self.rainbow.set_active(self.registry.pool_mut(), enabled)
    }

    /// Stages a position in the sketch.
    ///
    /// # Errors
    ///
    /// `NonFiniteCoordinate` or `CoordinateOutOfRange`.
    pub fn stage_sketch(&mut self, x: f32, y: f32, z: f32) -> VoxelResult<Option<VoxelKey>> {
        let position = checked(Vec3::new(x, y, z))?;
        Ok(self.sketch.stage(position, &self.registry))
    }

    /// Builds every staged position with one palette color.
    ///
    /// # Errors
    ///
    /// `InvalidColorIndex`. The sketch is kept in that case.
    pub fn commit_sketch(&mut self, color_index: u8) -> VoxelResult<CommitReport> {
        let color = ColorIndex::try_from(color_index)?;
        Ok(self.sketch.commit(&mut self.registry, color))
    }

    /// Drops the sketch. Returns positions dropped.
    pub fn discard_sketch(&mut self) -> usize {
        self.sketch.discard()
    }

    /// Dispatches one command from the input collaborator.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation reports. Failures are logged.
    pub fn apply(&mut self, command: VoxelCommand) -> VoxelResult<CommandOutcome> {
        let result = match command {
            VoxelCommand::AddVoxel { position, color_index } => self
                .add_voxel(position.x, position.y, position.z, color_index)
                .map(CommandOutcome::Added),
            VoxelCommand::RemoveVoxel { key } => Ok(CommandOutcome::Removed(self.remove_voxel(key))),
            VoxelCommand::StageSketch { position } => self
                .stage_sketch(position.x, position.y, position.z)
                .map(CommandOutcome::Staged),
            VoxelCommand::CommitSketch { color_index } => {
                self.commit_sketch(color_index).map(CommandOutcome::Committed)
            }
            VoxelCommand::DiscardSketch => Ok(CommandOutcome::Discarded(self.discard_sketch())),
            VoxelCommand::ClearAll => Ok(CommandOutcome::Cleared(self.clear_all())),
            VoxelCommand::SetGravity { enabled, floor_y } => {
                self.set_gravity(enabled, floor_y).map(CommandOutcome::GravitySet)
            }
            VoxelCommand::SetRainbow { enabled } => Ok(CommandOutcome::RainbowSet(self.set_rainbow(enabled))),
        };

        if let Err(error) = &result {
            warn!(kind = ?command.kind(), %error, "command rejected");
        }
        result
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advances physics by one frame under the current mode.
    pub fn tick(&mut self) -> PhysicsStats {
        self.frame += 1;
        self.physics.step(&mut self.registry, self.mode)
    }

    /// Hands every changed group to the render sink. Returns groups uploaded.
    pub fn flush(&mut self) -> usize {
        self.registry.flush()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The registry (and through it, the render surface).
    #[must_use]
    pub const fn registry(&self) -> &VoxelRegistry<S> {
        &self.registry
    }

    /// Total live voxels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Current motion mode.
    #[must_use]
    pub const fn mode(&self) -> MotionMode {
        self.mode
    }

    /// True while rainbow colors are applied.
    #[must_use]
    pub const fn rainbow_active(&self) -> bool {
        self.rainbow.is_active()
    }

    /// The pending sketch.
    #[must_use]
    pub const fn sketch(&self) -> &SketchBuffer {
        &self.sketch
    }

    /// Frames ticked so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

/// Accepts only positions that quantize to a distinct key.
fn checked(position: Vec3) -> VoxelResult<Vec3> {
    if !position.is_finite() {
        Err(VoxelError::NonFiniteCoordinate)
    } else if !VoxelKey::is_representable(position) {
        Err(VoxelError::CoordinateOutOfRange)
    } else {
        Ok(position)
    }
}
