//! Numeric boundary between legacy world data and the float pipeline.
//!
//! World geometry lives in [`Fixed`] (16.16) and angles in [`Bam`]; the
//! renderer converts both to `f32` exactly once per frame when it builds
//! its view context.

mod angle;
mod fixed;

pub use angle::{ANG45, ANG90, ANG180, ANG270, Bam};
pub use fixed::{FRACBITS, FRACUNIT, Fixed};
