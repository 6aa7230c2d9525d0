//! # Scene Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an
//! empty file is a valid config.
//!
//! ```toml
//! group_capacity = 10000
//! grid_size = 1.2
//!
//! [physics]
//! gravity_accel = 0.025
//! restitution = 0.15
//!
//! [display]
//! rainbow_intensity = 2.5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use holoforge_shared::{
    GRAVITY_ACCEL, GRID_SIZE, HORIZONTAL_DAMPING, MAX_INSTANCES_PER_GROUP, RESTITUTION,
    RETURN_FACTOR,
};

use crate::error::{ConfigError, ConfigResult};
use crate::instancing::GroupMaterial;
use crate::palette::Color;

/// Motion constants, applied per frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Subtracted from vertical velocity each falling frame.
    pub gravity_accel: f32,
    /// Fraction of vertical speed reflected on floor impact.
    pub restitution: f32,
    /// Horizontal velocity multiplier on floor impact.
    pub horizontal_damping: f32,
    /// Lerp factor toward origin while gravity is off.
    pub return_factor: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_accel: GRAVITY_ACCEL,
            restitution: RESTITUTION,
            horizontal_damping: HORIZONTAL_DAMPING,
            return_factor: RETURN_FACTOR,
        }
    }
}

/// Group appearance and rainbow parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Emissive intensity with palette colors.
    pub base_intensity: f32,
    /// Emissive intensity in rainbow mode.
    pub rainbow_intensity: f32,
    /// HSL saturation of rainbow hues.
    pub rainbow_saturation: f32,
    /// HSL lightness of rainbow hues.
    pub rainbow_lightness: f32,
    /// Dark base fill under the emissive color.
    pub fill_base: u32,
    /// Fill opacity.
    pub opacity: f32,
    /// Cube edge as a fraction of the grid size.
    pub extent_ratio: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            base_intensity: 0.4,
            rainbow_intensity: 2.5,
            rainbow_saturation: 1.0,
            rainbow_lightness: 0.5,
            fill_base: 0x001122,
            opacity: 0.8,
            extent_ratio: 0.95,
        }
    }
}

/// Top-level scene configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Instances per color group.
    pub group_capacity: usize,
    /// Grid cell edge in world units.
    pub grid_size: f32,
    /// Motion constants.
    pub physics: PhysicsConfig,
    /// Appearance.
    pub display: DisplayConfig,
    /// Fixed seed for rainbow hues. Random when absent.
    pub rainbow_seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            group_capacity: MAX_INSTANCES_PER_GROUP,
            grid_size: GRID_SIZE,
            physics: PhysicsConfig::default(),
            display: DisplayConfig::default(),
            rainbow_seed: None,
        }
    }
}

impl SceneConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `Parse` on malformed TOML, `Invalid` on out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// `Invalid` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.group_capacity == 0 {
            return Err(ConfigError::Invalid("group_capacity must be > 0".into()));
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ConfigError::Invalid("grid_size must be finite and > 0".into()));
        }

        let p = &self.physics;
        if !(p.gravity_accel.is_finite() && p.gravity_accel >= 0.0) {
            return Err(ConfigError::Invalid("physics.gravity_accel must be >= 0".into()));
        }
        if !(0.0..=1.0).contains(&p.restitution) {
            return Err(ConfigError::Invalid("physics.restitution must be in [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&p.horizontal_damping) {
            return Err(ConfigError::Invalid(
                "physics.horizontal_damping must be in [0, 1]".into(),
            ));
        }
        if !(p.return_factor > 0.0 && p.return_factor <= 1.0) {
            return Err(ConfigError::Invalid("physics.return_factor must be in (0, 1]".into()));
        }

        let d = &self.display;
        if d.fill_base > 0x00ff_ffff {
            return Err(ConfigError::Invalid("display.fill_base must be 0xRRGGBB".into()));
        }
        if !(0.0..=1.0).contains(&d.opacity) || !(0.0..=1.0).contains(&d.extent_ratio) {
            return Err(ConfigError::Invalid(
                "display.opacity and display.extent_ratio must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Material template for new groups.
    #[must_use]
    pub fn group_material(&self) -> GroupMaterial {
        GroupMaterial {
            base_fill: Color(self.display.fill_base),
            opacity: self.display.opacity,
            extent: self.grid_size * self.display.extent_ratio,
            base_intensity: self.display.base_intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.group_capacity, 10_000);
    }

    #[test]
    fn test_partial_override() {
        let config = SceneConfig::from_toml_str(
            r"
            group_capacity = 64
            rainbow_seed = 7

            [physics]
            restitution = 0.3
            ",
        )
        .unwrap();

        assert_eq!(config.group_capacity, 64);
        assert_eq!(config.rainbow_seed, Some(7));
        assert!((config.physics.restitution - 0.3).abs() < f32::EPSILON);
        assert!((config.physics.gravity_accel - 0.025).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = SceneConfig::from_toml_str("group_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_return_factor() {
        let err = SceneConfig::from_toml_str("[physics]\nreturn_factor = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = SceneConfig::from_toml_str("group_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_group_material_extent() {
        let material = SceneConfig::default().group_material();
        assert!((material.extent - 1.14).abs() < 1e-6);
        assert_eq!(material.base_fill, Color(0x001122));
    }
}
