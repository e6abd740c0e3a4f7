//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! It describes what to draw with a [`Scene`] (level, objects, textures,
//! camera) and hands it to a type that implements [`Renderer`].
//!
//! * Back-ends can be swapped without changing game logic.
//! * A helper blanket‐impl [`RendererExt`] adds `render_frame` so
//!   call-sites stay short.

use glam::Vec3;

use crate::world::{Camera, Level, SpriteBank, TextureBank, ThingList};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Per-frame lighting tweaks driven by gameplay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameEffects {
    /// Added to every sector light level (weapon flash), saturating.
    pub extra_light: u8,
    /// Per-channel multiplier applied on top of lighting (damage/pickup
    /// flashes). `Vec3::ONE` leaves colours untouched.
    pub tint: Vec3,
}

impl Default for FrameEffects {
    fn default() -> Self {
        Self {
            extra_light: 0,
            tint: Vec3::ONE,
        }
    }
}

/// Everything one frame reads. Borrowed for the duration of the frame;
/// nothing in here may change until the frame is finished.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub level: &'a Level,
    pub things: &'a ThingList,
    pub sprites: &'a SpriteBank,
    pub textures: &'a TextureBank,
    pub camera: Camera,
    pub effects: FrameEffects,
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Run visibility, fragment generation and rasterisation for `scene`.
    fn draw_level(&mut self, scene: &Scene<'_>);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `render_frame` adaptor.
pub trait RendererExt: Renderer {
    fn render_frame<F>(&mut self, width: usize, height: usize, scene: &Scene<'_>, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        self.draw_level(scene);
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;

pub use software::Software;
