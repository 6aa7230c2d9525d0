//! # Rainbow Mode
//!
//! Overrides each group's display colors with a random hue. One hue per
//! group per activation; instance data is never touched. Turning the mode
//! off restores the exact palette colors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::DisplayConfig;
use crate::instancing::{DisplayColors, InstanceGroupPool};
use crate::palette::hsl_to_rgb;

/// Display color override for every group.
pub struct RainbowModulator<R: Rng = StdRng> {
    rng: R,
    active: bool,
    intensity: f32,
    saturation: f32,
    lightness: f32,
}

impl RainbowModulator<StdRng> {
    /// Creates a modulator seeded from the OS entropy source.
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        Self::with_rng(display, StdRng::from_entropy())
    }

    /// Creates a modulator with a reproducible hue sequence.
    #[must_use]
    pub fn seeded(display: &DisplayConfig, seed: u64) -> Self {
        Self::with_rng(display, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RainbowModulator<R> {
    /// Creates a modulator drawing hues from `rng`.
    #[must_use]
    pub fn with_rng(display: &DisplayConfig, rng: R) -> Self {
        Self {
            rng,
            active: false,
            intensity: display.rainbow_intensity,
            saturation: display.rainbow_saturation,
            lightness: display.rainbow_lightness,
        }
    }

    /// True while rainbow colors are applied.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Applies or removes the override on every existing group.
    ///
    /// Activating again while active draws fresh hues. Returns the number
    /// of groups recolored.
    pub fn set_active(&mut self, pool: &mut InstanceGroupPool, active: bool) -> usize {
        self.active = active;
        let mut recolored = 0;

        for group in pool.iter_mut() {
            if active {
                let rgb = hsl_to_rgb(self.rng.gen::<f32>(), self.saturation, self.lightness);
                group.set_display(DisplayColors {
                    fill: rgb,
                    intensity: self.intensity,
                    outline: rgb,
                });
            } else {
                group.reset_display();
            }
            recolored += 1;
        }

        debug!(active, recolored, "rainbow mode");
        recolored
    }
}
