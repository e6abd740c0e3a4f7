use glam::{Vec2, Vec3};

use crate::math::{Bam, Fixed};

/// Player view-point in world space.
///
/// * Only **yaw** (heading) is simulated – Doom never tilts up/down.
/// * Stored the way gameplay stores a mobj: fixed-point position and a
///   binary angle. The renderer converts it to floats once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub x: Fixed,
    pub y: Fixed,
    /// Absolute eye height, not height above the floor.
    pub z: Fixed,
    pub angle: Bam,
}

impl Camera {
    pub fn new(x: Fixed, y: Fixed, z: Fixed, angle: Bam) -> Self {
        Self { x, y, z, angle }
    }

    /// Build from float map units and a yaw in radians (0 = east, CCW).
    pub fn from_world(pos: Vec3, yaw: f32) -> Self {
        Self {
            x: Fixed::from_f32(pos.x),
            y: Fixed::from_f32(pos.y),
            z: Fixed::from_f32(pos.z),
            angle: Bam::from_radians(yaw),
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.angle.sin_cos();
        Vec2::new(c, s)
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe, + right).
    pub fn step(&mut self, forward: f32, side: f32) {
        let delta = self.forward() * forward + self.right() * side;
        self.x += Fixed::from_f32(delta.x);
        self.y += Fixed::from_f32(delta.y);
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.angle = self.angle + Bam::from_radians(delta_yaw);
    }

    pub fn rise(&mut self, dz: f32) {
        self.z += Fixed::from_f32(dz);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
