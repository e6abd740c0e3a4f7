//! Per-column units of rasterisation work.
//!
//! Every list is an arena: cleared at the start of a frame, reserved to a
//! fixed budget, never grown while the frame is being built. Pushing past
//! the budget drops the fragment and counts it.

use glam::Vec3;

use crate::math::Fixed;
use crate::world::TextureId;

/// Texture-coordinate walker for one column.
///
/// The step is quantised to 16.16 like the classic texel step. The error
/// that quantisation accumulates over the whole column is split in half
/// and applied once, after the first pixel, so the walk never drifts more
/// than half of it from the exact coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexStep {
    pub start: f32,
    pub step: f32,
    pub sub_pixel: f32,
}

impl TexStep {
    pub fn new(start: f32, step: f32, height: u32) -> Self {
        let quantised = Fixed::from_f32(step).to_f32();
        let drift = (step - quantised) * height as f32;
        Self {
            start,
            step: quantised,
            sub_pixel: drift * 0.5,
        }
    }

    /// Coordinate of pixel `i`.
    #[inline]
    pub fn at(&self, i: u32) -> f32 {
        match i {
            0 => self.start,
            _ => self.start + self.sub_pixel + self.step * i as f32,
        }
    }

    /// Coordinates of successive pixels, walked incrementally.
    #[inline]
    pub fn coords(self) -> impl Iterator<Item = f32> {
        (0u32..).scan(self.start, move |v, i| {
            let cur = *v;
            *v += self.step;
            if i == 0 {
                *v += self.sub_pixel;
            }
            Some(cur)
        })
    }
}

/// One column of a wall section.
#[derive(Clone, Copy, Debug)]
pub struct WallFragment {
    pub x: u16,
    pub y: u16,
    pub height: u16,
    /// Unwrapped texture column; the blitter wraps it.
    pub tex_x: i32,
    pub tex_y: TexStep,
    pub light: f32,
    pub texture: TextureId,
    pub depth: f32,
}

/// One column of a floor or ceiling. Texture coordinates are found per
/// pixel from the plane, so only the plane and the wall it hangs off are
/// recorded.
#[derive(Clone, Copy, Debug)]
pub struct FlatFragment {
    pub x: u16,
    pub y: u16,
    pub height: u16,
    pub light_level: u8,
    /// The pixel touching the wall is sampled at the wall itself instead of
    /// at its own (slightly further) ray hit.
    pub clamp_first_pixel: bool,
    pub depth: f32,
    /// World position where the column meets the wall; `z` is the plane.
    pub world: Vec3,
    pub texture: TextureId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkyFragment {
    pub x: u16,
    pub y: u16,
    pub height: u16,
}

/// One column of a sprite after occlusion clipping.
#[derive(Clone, Copy, Debug)]
pub struct SpriteFragment {
    pub x: u16,
    pub y: u16,
    pub height: u16,
    pub tex_x: i32,
    pub tex_y: TexStep,
    pub light: f32,
    pub texture: TextureId,
    pub depth: f32,
    pub shadow: bool,
    pub flip: bool,
}

/// All fragment lists of one frame.
#[derive(Default)]
pub struct FragmentLists {
    pub walls: Vec<WallFragment>,
    pub floors: Vec<FlatFragment>,
    pub ceilings: Vec<FlatFragment>,
    pub skies: Vec<SkyFragment>,
    pub sprites: Vec<SpriteFragment>,
    budget: usize,
    dropped: usize,
}

fn push_bounded<T>(list: &mut Vec<T>, budget: usize, dropped: &mut usize, item: T) -> bool {
    if list.len() < budget {
        list.push(item);
        true
    } else {
        *dropped += 1;
        false
    }
}

impl FragmentLists {
    /// Empty every list and make sure each can hold `budget` entries
    /// without reallocating.
    pub fn reset(&mut self, budget: usize) {
        self.budget = budget;
        self.dropped = 0;
        self.walls.clear();
        self.floors.clear();
        self.ceilings.clear();
        self.skies.clear();
        self.sprites.clear();
        self.walls.reserve(budget);
        self.floors.reserve(budget);
        self.ceilings.reserve(budget);
        self.skies.reserve(budget);
        self.sprites.reserve(budget);
    }

    #[inline]
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Fragments refused this frame because a list was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn push_wall(&mut self, f: WallFragment) -> bool {
        push_bounded(&mut self.walls, self.budget, &mut self.dropped, f)
    }

    pub fn push_floor(&mut self, f: FlatFragment) -> bool {
        push_bounded(&mut self.floors, self.budget, &mut self.dropped, f)
    }

    pub fn push_ceiling(&mut self, f: FlatFragment) -> bool {
        push_bounded(&mut self.ceilings, self.budget, &mut self.dropped, f)
    }

    pub fn push_sky(&mut self, f: SkyFragment) -> bool {
        push_bounded(&mut self.skies, self.budget, &mut self.dropped, f)
    }

    pub fn push_sprite(&mut self, f: SpriteFragment) -> bool {
        push_bounded(&mut self.sprites, self.budget, &mut self.dropped, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulated_step_stays_within_a_texel() {
        for (tex_h, col_h) in [(128.0, 300u32), (64.0, 7), (128.0, 1999), (32.0, 5000)] {
            let exact = tex_h / col_h as f32;
            let ts = TexStep::new(0.0, exact, col_h);
            let end = ts.coords().nth(col_h as usize).unwrap();
            assert!(
                (end - col_h as f32 * exact).abs() < 1.0,
                "{tex_h}/{col_h}: {end}"
            );
        }
    }

    #[test]
    fn correction_applies_after_first_pixel() {
        let ts = TexStep::new(2.0, 1.0 / 3.0, 600);
        assert!(ts.sub_pixel > 0.0);
        let mut it = ts.coords();
        assert_eq!(it.next(), Some(2.0));
        let second = it.next().unwrap();
        assert!((second - (2.0 + ts.step + ts.sub_pixel)).abs() < 1e-6);
        assert!((ts.at(5) - (2.0 + ts.sub_pixel + 5.0 * ts.step)).abs() < 1e-5);
    }

    #[test]
    fn exact_steps_need_no_correction() {
        let ts = TexStep::new(0.0, 0.5, 100);
        assert_eq!(ts.step, 0.5);
        assert_eq!(ts.sub_pixel, 0.0);
    }

    #[test]
    fn lists_drop_past_budget() {
        let mut lists = FragmentLists::default();
        lists.reset(2);
        let sky = SkyFragment {
            x: 0,
            y: 0,
            height: 1,
        };
        assert!(lists.push_sky(sky));
        assert!(lists.push_sky(sky));
        assert!(!lists.push_sky(sky));
        assert_eq!(lists.skies.len(), 2);
        assert_eq!(lists.dropped(), 1);

        lists.reset(2);
        assert!(lists.skies.is_empty());
        assert_eq!(lists.dropped(), 0);
    }
}
