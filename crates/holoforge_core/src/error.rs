//! # Error Types
//!
//! All failures in the engine are reported as values. Nothing here panics
//! on caller input.

use holoforge_shared::VoxelKey;
use thiserror::Error;

use crate::palette::Color;

/// Errors that can occur while mutating the voxel registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// The color group for this voxel is full. Nothing was changed.
    #[error("instance group {color} is full: capacity {capacity}")]
    CapacityExceeded {
        /// Concrete color of the full group.
        color: Color,
        /// The group's fixed capacity.
        capacity: usize,
    },

    /// No voxel exists at the key.
    #[error("no voxel at {0}")]
    KeyNotFound(VoxelKey),

    /// Palette index outside the fixed palette.
    #[error("palette index {0} out of range")]
    InvalidColorIndex(u8),

    /// Slot index outside a group's live range.
    #[error("slot {slot} out of range for group with {count} instances")]
    SlotOutOfRange {
        /// Requested slot.
        slot: usize,
        /// Live instance count.
        count: usize,
    },

    /// The group id does not name a live group.
    #[error("no instance group with index {0}")]
    GroupNotFound(usize),

    /// A coordinate was NaN or infinite.
    #[error("non-finite coordinate")]
    NonFiniteCoordinate,

    /// A coordinate is too large to quantize into a distinct key.
    #[error("coordinate beyond +/-{}", VoxelKey::MAX_COORDINATE)]
    CoordinateOutOfRange,
}

/// Result type for registry operations.
pub type VoxelResult<T> = Result<T, VoxelError>;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
