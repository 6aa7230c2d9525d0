//! # Holoforge
//!
//! Session layer: turns recognizer commands into scene mutations, one
//! frame at a time.
//!
//! ```text
//! ┌──────────────┐   VoxelCommand   ┌──────────────┐   dirty groups   ┌────────────┐
//! │  Recognizer  │─────────────────>│ SessionLoop  │─────────────────>│ RenderSink │
//! │ (any thread) │ CommandChannel   │  VoxelScene  │   flush()        │            │
//! └──────────────┘                  └──────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: bounded command channel
//! - `game_loop`: frame orchestration and timing

pub mod events;
pub mod game_loop;

pub use holoforge_core as core;
pub use holoforge_shared as shared;

pub use events::{ChannelError, CommandChannel, CommandSender};
pub use game_loop::{FrameStats, FrameStatsAccumulator, SessionConfig, SessionLoop};
