//! Column blitter.
//!
//! Every fragment kind ends up here: one vertical run of pixels sampled
//! from a column-major texture with a stepped v coordinate. No allocation,
//! no world state.

use bitflags::bitflags;
use glam::Vec3;

use crate::renderer::Rgba;
use crate::renderer::software::fragments::TexStep;
use crate::world::{TRANSPARENT_PIXEL, Texture};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BlitFlags: u8 {
        /// Wrap u around the texture width instead of clamping.
        const H_WRAP  = 0x01;
        /// Wrap v around the texture height instead of clamping.
        const V_WRAP  = 0x02;
        const FLIP_H  = 0x04;
        /// Skip transparent texels.
        const MASKED  = 0x08;
        /// Only draw every other pixel (partial invisibility).
        const STIPPLE = 0x10;
    }
}

/// Light applied to every sampled texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightMul {
    Scalar(f32),
    Rgb(Vec3),
}

impl LightMul {
    /// Combine a light multiplier with the frame's colour tint. A white
    /// tint keeps the cheaper scalar path.
    #[inline]
    pub fn with_tint(light: f32, tint: Vec3) -> Self {
        if tint == Vec3::ONE {
            LightMul::Scalar(light)
        } else {
            LightMul::Rgb(tint * light)
        }
    }

    #[inline(always)]
    pub fn apply(&self, c: Rgba) -> Rgba {
        let (mr, mg, mb) = match *self {
            LightMul::Scalar(m) => (m, m, m),
            LightMul::Rgb(v) => (v.x, v.y, v.z),
        };
        let ch = |shift: u32, m: f32| {
            let v = ((c >> shift) & 0xFF) as f32 * m;
            (v.clamp(0.0, 255.0) as u32) << shift
        };
        0xFF00_0000 | ch(16, mr) | ch(8, mg) | ch(0, mb)
    }
}

/// Destination of a blit: a row-major `width * height` pixel slice.
pub struct Target<'p> {
    pub pixels: &'p mut [Rgba],
    pub width: usize,
    pub height: usize,
}

impl<'p> Target<'p> {
    pub fn new(pixels: &'p mut [Rgba], width: usize, height: usize) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn put(&mut self, x: usize, y: usize, c: Rgba) {
        if let Some(p) = self.pixels.get_mut(y * self.width + x) {
            *p = c;
        }
    }
}

/// One column to blit.
#[derive(Clone, Copy, Debug)]
pub struct ColumnBlit {
    pub x: usize,
    pub y: i32,
    pub height: u32,
    pub tex_x: i32,
    pub tex_y: TexStep,
    pub light: LightMul,
    pub flags: BlitFlags,
}

#[inline(always)]
fn wrap_or_clamp(v: i32, len: usize, wrap: bool) -> usize {
    if wrap {
        v.rem_euclid(len as i32) as usize
    } else {
        v.clamp(0, len as i32 - 1) as usize
    }
}

pub fn blit_column(target: &mut Target<'_>, tex: &Texture, b: &ColumnBlit) {
    if b.x >= target.width || tex.w == 0 || tex.h == 0 {
        return;
    }

    let mut u = wrap_or_clamp(b.tex_x, tex.w, b.flags.contains(BlitFlags::H_WRAP));
    if b.flags.contains(BlitFlags::FLIP_H) {
        u = tex.w - 1 - u;
    }
    let column = tex.column(u);
    let v_wrap = b.flags.contains(BlitFlags::V_WRAP);
    let masked = b.flags.contains(BlitFlags::MASKED);
    let stipple = b.flags.contains(BlitFlags::STIPPLE);

    for (i, v) in b.tex_y.coords().take(b.height as usize).enumerate() {
        let y = b.y + i as i32;
        if y < 0 {
            continue;
        }
        let y = y as usize;
        if y >= target.height {
            break;
        }
        if stipple && (y + b.x) & 1 == 1 {
            continue;
        }
        let texel = column[wrap_or_clamp(v.floor() as i32, tex.h, v_wrap)];
        if masked && texel == TRANSPARENT_PIXEL {
            continue;
        }
        target.put(b.x, y, b.light.apply(texel));
    }
}
