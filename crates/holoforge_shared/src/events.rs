//! Input vocabulary for the voxel engine.
//!
//! The gesture recognizer translates raw hand data into these commands.
//! They are serializable so a recorded session can be replayed.

use serde::{Deserialize, Serialize};

use crate::key::VoxelKey;
use crate::math::Vec3;

/// Command discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Voxel added
    AddVoxel = 0,
    /// Voxel removed
    RemoveVoxel = 1,
    /// Position staged in the sketch
    StageSketch = 2,
    /// Sketch committed into voxels
    CommitSketch = 3,
    /// Sketch thrown away
    DiscardSketch = 4,
    /// Everything cleared
    ClearAll = 5,
    /// Gravity mode changed
    SetGravity = 6,
    /// Rainbow mode changed
    SetRainbow = 7,
}

/// High-level commands issued by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VoxelCommand {
    /// Place a voxel
    AddVoxel {
        /// World position
        position: Vec3,
        /// Raw palette index (validated by the scene)
        color_index: u8,
    },

    /// Remove the voxel at a key
    RemoveVoxel {
        /// Quantized key
        key: VoxelKey,
    },

    /// Stage a position in the pending sketch
    StageSketch {
        /// World position (snapped to the grid on staging)
        position: Vec3,
    },

    /// Turn every staged position into a voxel
    CommitSketch {
        /// Raw palette index for the committed voxels
        color_index: u8,
    },

    /// Drop every staged position
    DiscardSketch,

    /// Remove every voxel and every color group
    ClearAll,

    /// Switch between falling and returning motion
    SetGravity {
        /// Gravity on
        enabled: bool,
        /// Height of the floor plane
        floor_y: f32,
    },

    /// Switch rainbow display colors
    SetRainbow {
        /// Rainbow on
        enabled: bool,
    },
}

impl VoxelCommand {
    /// Returns the discriminator for this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::AddVoxel { .. } => CommandKind::AddVoxel,
            Self::RemoveVoxel { .. } => CommandKind::RemoveVoxel,
            Self::StageSketch { .. } => CommandKind::StageSketch,
            Self::CommitSketch { .. } => CommandKind::CommitSketch,
            Self::DiscardSketch => CommandKind::DiscardSketch,
            Self::ClearAll => CommandKind::ClearAll,
            Self::SetGravity { .. } => CommandKind::SetGravity,
            Self::SetRainbow { .. } => CommandKind::SetRainbow,
        }
    }

    /// True for commands that can change the voxel population.
    #[must_use]
    pub const fn mutates_population(&self) -> bool {
        matches!(
            self,
            Self::AddVoxel { .. } | Self::RemoveVoxel { .. } | Self::CommitSketch { .. } | Self::ClearAll
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminator() {
        let cmd = VoxelCommand::SetGravity { enabled: true, floor_y: -5.0 };
        assert_eq!(cmd.kind(), CommandKind::SetGravity);
        assert!(!cmd.mutates_population());
        assert!(VoxelCommand::ClearAll.mutates_population());
    }

    #[test]
    fn test_recorded_session_parses() {
        #[derive(Deserialize)]
        struct Session {
            commands: Vec<VoxelCommand>,
        }

        let text = r#"
            [[commands]]
            [commands.AddVoxel]
            position = { x = 1.2, y = 0.0, z = 0.0 }
            color_index = 3

            [[commands]]
            [commands.SetRainbow]
            enabled = true
        "#;

        let session: Session = toml::from_str(text).unwrap();
        assert_eq!(session.commands.len(), 2);
        assert_eq!(session.commands[0].kind(), CommandKind::AddVoxel);
        assert_eq!(session.commands[1], VoxelCommand::SetRainbow { enabled: true });
    }
}
