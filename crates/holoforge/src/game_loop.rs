//! # Session Loop
//!
//! One frame:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. DRAIN COMMANDS                                                   │
//! │    └─ Apply the VoxelCommands queued when the frame began           │
//! │                                                                     │
//! │ 2. PHYSICS TICK                                                     │
//! │    └─ Advance every voxel under the current motion mode             │
//! │                                                                     │
//! │ 3. FLUSH                                                            │
//! │    └─ Hand dirty groups to the render sink                          │
//! │                                                                     │
//! │ 4. END FRAME                                                        │
//! │    └─ Record timing, warn on budget overrun                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are applied before the tick, so a voxel added this frame
//! already moves this frame. Commands arriving mid-drain wait for the next
//! frame, so a busy producer cannot stall one.

use std::time::{Duration, Instant};

use holoforge_core::{ConfigResult, HeadlessSink, PhysicsStats, RenderSink, SceneConfig, VoxelScene};
use tracing::{info, warn};

use crate::events::{CommandChannel, CommandSender, DEFAULT_COMMAND_CAPACITY};

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Configuration for the session loop.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Command channel capacity.
    pub command_capacity: usize,
    /// Frame budget in microseconds.
    pub frame_budget_us: u64,
    /// Warn on frames over budget.
    pub enable_timing_logs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            frame_budget_us: duration_us(TARGET_FRAME_TIME),
            enable_timing_logs: false,
        }
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Commands applied successfully.
    pub commands_applied: u32,
    /// Commands the scene refused.
    pub commands_rejected: u32,
    /// Per-phase voxel counts from the physics pass.
    pub physics: PhysicsStats,
    /// Live voxels after the frame.
    pub voxels: usize,
    /// Live groups after the frame.
    pub groups: usize,
    /// Groups handed to the sink.
    pub groups_uploaded: usize,
    /// Wall time in microseconds.
    pub total_us: u64,
}

/// Owns the scene and its command channel; runs frames.
pub struct SessionLoop<S: RenderSink = HeadlessSink> {
    scene: VoxelScene<S>,
    commands: CommandChannel,
    config: SessionConfig,
    frame_count: u64,
    stats_accumulator: FrameStatsAccumulator,
}

impl SessionLoop<HeadlessSink> {
    /// Creates a headless session.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if `scene_config` fails validation.
    pub fn new(scene_config: &SceneConfig, config: SessionConfig) -> ConfigResult<Self> {
        Ok(Self::with_scene(VoxelScene::new(scene_config)?, config))
    }
}

impl<S: RenderSink> SessionLoop<S> {
    /// Wraps an existing scene.
    #[must_use]
    pub fn with_scene(scene: VoxelScene<S>, config: SessionConfig) -> Self {
        let commands = CommandChannel::new(config.command_capacity);
        let stats_accumulator = FrameStatsAccumulator::with_budget(config.frame_budget_us);

        Self {
            scene,
            commands,
            config,
            frame_count: 0,
            stats_accumulator,
        }
    }

    /// Handle for the input collaborator.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Runs one frame.
    pub fn run_frame(&mut self) -> FrameStats {
        let start = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        for command in self.commands.take_pending() {
            // Rejections are logged by the scene
            match self.scene.apply(command) {
                Ok(_) => stats.commands_applied += 1,
                Err(_) => stats.commands_rejected += 1,
            }
        }

        stats.physics = self.scene.tick();
        stats.groups_uploaded = self.scene.flush();
        stats.voxels = self.scene.count();
        stats.groups = self.scene.registry().group_count();
        stats.total_us = duration_us(start.elapsed());

        self.end_frame(stats);
        stats
    }

    /// Runs `frames` frames. Returns statistics for just those frames.
    pub fn run_frames(&mut self, frames: u64) -> FrameStatsAccumulator {
        let mut batch = FrameStatsAccumulator::with_budget(self.config.frame_budget_us);
        for _ in 0..frames {
            batch.record(self.run_frame());
        }
        batch
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator.record(stats);

        if self.config.enable_timing_logs && stats.total_us > self.config.frame_budget_us {
            warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                budget_us = self.config.frame_budget_us,
                "frame exceeded budget"
            );
        }
    }

    /// Frames run so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Statistics since the session started.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &VoxelScene<S> {
        &self.scene
    }
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of frame times.
    pub total_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded the budget.
    pub frames_over_budget: u64,
    /// Commands applied.
    pub commands_applied: u64,
    /// Commands rejected.
    pub commands_rejected: u64,
    /// Group uploads.
    pub groups_uploaded: u64,
    budget_us: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator against the 60 FPS budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(duration_us(TARGET_FRAME_TIME))
    }

    /// Creates an accumulator against `budget_us`.
    #[must_use]
    pub fn with_budget(budget_us: u64) -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            commands_applied: 0,
            commands_rejected: 0,
            groups_uploaded: 0,
            budget_us,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.commands_applied += u64::from(stats.commands_applied);
        self.commands_rejected += u64::from(stats.commands_rejected);
        self.groups_uploaded += stats.groups_uploaded as u64;

        if stats.total_us > self.budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Share of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a one-line summary at `info`.
    pub fn log_summary(&self) {
        if self.frames_recorded == 0 {
            info!("no frames recorded");
            return;
        }
        info!(
            frames = self.frames_recorded,
            avg_ms = format_args!("{:.3}", self.avg_frame_ms()),
            min_ms = format_args!("{:.3}", self.min_frame_us as f64 / 1000.0),
            max_ms = format_args!("{:.3}", self.max_frame_us as f64 / 1000.0),
            over_budget = self.frames_over_budget,
            applied = self.commands_applied,
            rejected = self.commands_rejected,
            uploads = self.groups_uploaded,
            "session summary"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
