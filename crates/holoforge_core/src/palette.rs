//! # Palette
//!
//! A fixed, ordered table of 21 display colors. Voxels name their color by
//! index; the index is validated once, at the boundary, by constructing a
//! [`ColorIndex`]. Below the boundary every lookup is infallible.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VoxelError;

/// Number of entries in the palette.
pub const PALETTE_LEN: usize = 21;

/// Concrete 24-bit RGB color (`0xRRGGBB`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Returns the color as normalized RGB.
    #[must_use]
    pub fn to_rgb(self) -> [f32; 3] {
        let channel = |shift: u32| f32::from(((self.0 >> shift) & 0xff) as u8) / 255.0;
        [channel(16), channel(8), channel(0)]
    }

    /// Returns the raw hex value.
    #[must_use]
    pub const fn hex(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// The palette, in index order.
pub const PALETTE: [Color; PALETTE_LEN] = [
    Color(0x00f0ff), Color(0xff0000), Color(0x0000ff), Color(0x00ff00), Color(0xffff00),
    Color(0xff00ff), Color(0xffa500), Color(0x800080), Color(0x00ff7f), Color(0xff1493),
    Color(0x7fff00), Color(0x40e0d0), Color(0xffd700), Color(0xff4500), Color(0x9370db),
    Color(0x00ced1), Color(0xf08080), Color(0xadff2f), Color(0xff6347), Color(0x00bfff),
    Color(0xda70d6),
];

/// Validated palette index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorIndex(u8);

impl ColorIndex {
    /// The first palette entry (cyan), used for committed sketches.
    pub const DEFAULT: Self = Self(0);

    /// Validates a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < PALETTE_LEN {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Resolves this index to its concrete color.
    #[inline]
    #[must_use]
    pub const fn color(self) -> Color {
        PALETTE[self.0 as usize]
    }
}

impl TryFrom<u8> for ColorIndex {
    type Error = VoxelError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(VoxelError::InvalidColorIndex(index))
    }
}

impl From<ColorIndex> for u8 {
    fn from(index: ColorIndex) -> Self {
        index.0
    }
}

/// Resolves a palette index to its concrete color.
#[inline]
#[must_use]
pub const fn resolve(index: ColorIndex) -> Color {
    index.color()
}

/// Converts hue, saturation and lightness (each in `[0, 1]`) to RGB.
#[must_use]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let hue = hue.rem_euclid(1.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);

    if saturation == 0.0 {
        return [lightness; 3];
    }

    let q = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    [
        hue_to_channel(p, q, hue + 1.0 / 3.0),
        hue_to_channel(p, q, hue),
        hue_to_channel(p, q, hue - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
