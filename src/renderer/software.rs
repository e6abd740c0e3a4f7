//! ---------------------------------------------------------------------------
//! Classic software (CPU) column renderer
//!
//! * Fills a `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Walks the BSP front to back; each seg is cut into per-column wall, flat
//!   and sky fragments clipped against what nearer segs already cover, so no
//!   depth buffer is needed.
//! * Sprites are clipped afterwards against the per-column occluder tables
//!   and drawn far to near on top.
//! ---------------------------------------------------------------------------

pub mod blit;
pub mod bsp;
pub mod fragments;
pub mod light;
pub mod occlusion;
pub mod planes;
pub mod projection;
mod renderer;
pub mod segs;
pub mod sprites;
pub mod view;

pub use renderer::{Frame, FrameStats, PlaneKey, Software};

#[cfg(test)]
mod tests;
