//! # Headless Session
//!
//! Scripted build session without a GPU: lays a floor, stacks a tower,
//! sketches a wall, drops everything under gravity, toggles rainbow mode,
//! lets it float home, then clears.
//!
//! Run with: cargo run -p holoforge --bin headless_session [scene.toml]
//! Set `RUST_LOG=holoforge_core=debug` for group lifecycle events.

use std::error::Error;

use holoforge::{SessionConfig, SessionLoop};
use holoforge_core::SceneConfig;
use holoforge_shared::{Vec3, VoxelCommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const FLOOR_SIDE: u8 = 6;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("holoforge=info,holoforge_core=info,headless_session=info")
        }))
        .with(fmt::layer())
        .init();

    let scene_config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let grid = scene_config.grid_size;

    let mut session = SessionLoop::new(
        &scene_config,
        SessionConfig {
            enable_timing_logs: true,
            ..SessionConfig::default()
        },
    )?;
    let sender = session.sender();

    // Floor, one color per row
    for row in 0..FLOOR_SIDE {
        for col in 0..FLOOR_SIDE {
            sender.send_blocking(VoxelCommand::AddVoxel {
                position: Vec3::new(f32::from(col) * grid, 4.0 * grid, f32::from(row) * grid),
                color_index: row,
            })?;
        }
    }
    // Tower
    for level in 5..12u8 {
        sender.send_blocking(VoxelCommand::AddVoxel {
            position: Vec3::new(0.0, f32::from(level) * grid, 0.0),
            color_index: 20,
        })?;
    }
    // Sketched wall, committed in one go
    for step in 0..8u8 {
        sender.send_blocking(VoxelCommand::StageSketch {
            position: Vec3::new(-2.0 * grid, 6.0 * grid, f32::from(step) * grid),
        })?;
    }
    sender.send_blocking(VoxelCommand::CommitSketch { color_index: 9 })?;

    let built = session.run_frame();
    info!(voxels = built.voxels, groups = built.groups, "scene built");

    sender.send_blocking(VoxelCommand::SetGravity { enabled: true, floor_y: 0.0 })?;
    let fall = session.run_frames(180);
    info!(frames = fall.frames_recorded, uploads = fall.groups_uploaded, "gravity pass");

    sender.send(VoxelCommand::SetRainbow { enabled: true })?;
    sender.send_blocking(VoxelCommand::SetGravity { enabled: false, floor_y: 0.0 })?;
    let home = session.run_frames(120);
    info!(frames = home.frames_recorded, uploads = home.groups_uploaded, "return pass");

    sender.send(VoxelCommand::SetRainbow { enabled: false })?;
    sender.send_blocking(VoxelCommand::ClearAll)?;
    session.run_frame();

    let sink = session.scene().registry().sink();
    info!(
        live_groups = sink.live_handles().len(),
        uploads = sink.uploads(),
        bytes = sink.bytes_uploaded(),
        "sink totals"
    );
    session.stats().log_summary();
    Ok(())
}
