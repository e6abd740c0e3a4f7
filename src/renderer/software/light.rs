//! Distance light diminishing.
//!
//! Every sector light level maps to four constants; the multiplier for a
//! surface point is then a cheap clamp of `coef / dist`. Parameters for all
//! 256 levels are computed once and shared.

use once_cell::sync::Lazy;

pub const MAX_LIGHT_VALUE: u8 = 255;

/// Floor for the final multiplier, however far away the surface is.
pub const MIN_LIGHT_MUL: f32 = 0.02;

/// Distance (map units) below which a surface gets its sector's full level.
const FULL_BRIGHT_DIST: f32 = 128.0;

/// Fraction of the light range removed at every distance; fixes where the
/// falloff reaches the sector minimum (`FULL_BRIGHT_DIST * (1 + 1/SUB)`).
const FALLOFF_SUB: f32 = 0.25;

static LIGHT_TABLE: Lazy<[LightParams; 256]> =
    Lazy::new(|| std::array::from_fn(|level| LightParams::compute(level as u8)));

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    /// Light at infinity.
    pub min: f32,
    /// Light up close (the sector level itself).
    pub max: f32,
    pub sub: f32,
    pub coef: f32,
}

impl LightParams {
    /// Memoised parameters for `level`.
    #[inline]
    pub fn for_level(level: u8) -> LightParams {
        LIGHT_TABLE[level as usize]
    }

    /// Darker sectors fade further: the minimum drops by
    /// `level * (255 - level) / 128` below the sector level.
    pub fn compute(level: u8) -> LightParams {
        let max = level as f32;
        let dark = max * (MAX_LIGHT_VALUE as f32 - max) / 128.0;
        let min = (max - dark).max(0.0);
        let range = max - min;
        LightParams {
            min,
            max,
            sub: range * FALLOFF_SUB,
            coef: range * (1.0 + FALLOFF_SUB) * FULL_BRIGHT_DIST,
        }
    }

    /// Light value (0‥255) at `dist` map units.
    #[inline]
    pub fn light_at(&self, dist: f32) -> f32 {
        let dist = dist.max(1.0);
        (self.min + self.coef / dist - self.sub).clamp(self.min, self.max)
    }

    /// Colour multiplier at `dist`, never below [`MIN_LIGHT_MUL`].
    #[inline]
    pub fn light_mul_for_dist(&self, dist: f32) -> f32 {
        (self.light_at(dist) / MAX_LIGHT_VALUE as f32).max(MIN_LIGHT_MUL)
    }
}
