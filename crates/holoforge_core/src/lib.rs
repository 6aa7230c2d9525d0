//! # Holoforge Core
//!
//! Instanced voxel registry for a gesture-driven voxel builder:
//! - Sparse grid keys mapped to dense, per-color instance buffers
//! - O(1) add and remove; buffers never fragment
//! - One draw call per color, re-uploaded only when it changed
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         VoxelScene                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Palette → InstanceGroupPool ← VoxelRegistry ← Physics       │
//! │                 │                   ▲                        │
//! │           RenderSink          SketchBuffer   Rainbow         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use holoforge_core::{SceneConfig, VoxelScene};
//!
//! let mut scene = VoxelScene::new(&SceneConfig::default()).unwrap();
//! scene.add_voxel(0.0, 5.0, 0.0, 3).unwrap();
//! scene.set_gravity(true, 0.0).unwrap();
//! scene.tick();
//! assert_eq!(scene.count(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod instancing;
pub mod palette;
pub mod physics;
pub mod rainbow;
pub mod registry;
pub mod render;
pub mod scene;
pub mod sketch;

pub use config::{DisplayConfig, PhysicsConfig, SceneConfig};
pub use error::{ConfigError, ConfigResult, VoxelError, VoxelResult};
pub use instancing::{
    DisplayColors, GroupId, GroupMaterial, InstanceGroup, InstanceGroupPool, InstanceTransform,
};
pub use palette::{resolve, Color, ColorIndex, PALETTE, PALETTE_LEN};
pub use physics::{MotionMode, MotionPhase, PhysicsIntegrator, PhysicsStats};
pub use rainbow::RainbowModulator;
pub use registry::{AddOutcome, VoxelRecord, VoxelRegistry};
pub use render::{HeadlessSink, RenderHandle, RenderSink, UploadedGroup};
pub use scene::{CommandOutcome, VoxelScene};
pub use sketch::{CommitReport, SketchBuffer};

pub use holoforge_shared::{Vec3, VoxelCommand, VoxelKey};
