//! Per-resolution tables and the per-frame render context.
//!
//! [`ViewTables`] changes only with the output resolution; [`ViewContext`]
//! is rebuilt from the camera every frame and is the single place where
//! fixed-point world coordinates turn into floats.

use glam::{Vec2, Vec3};

use crate::config::RenderConfig;
use crate::math::{Bam, Fixed};
use crate::renderer::FrameEffects;
use crate::renderer::software::projection::ProjectionMatrix;
use crate::world::{Camera, Vertex};

/// View height the sky texture was authored for.
pub const REFERENCE_VIEW_HEIGHT: f32 = 160.0;

const MIN_FOV_DEGREES: f32 = 1.0;
const MAX_FOV_DEGREES: f32 = 179.0;

/// Everything derived from the output resolution.
#[derive(Clone, Debug)]
pub struct ViewTables {
    pub width: usize,
    pub height: usize,
    pub width_f: f32,
    pub height_f: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub proj: ProjectionMatrix,
    /// Pixels per unit of `lateral / depth`.
    pub x_scale: f32,
    /// Pixels per unit of `height / depth`; negative because rows grow
    /// downwards.
    pub y_scale: f32,
    pub aspect: f32,
    /// Half the horizontal field of view.
    pub clip_angle: Bam,
    /// View-relative angle through the centre of each column, positive
    /// to the left.
    pub x_to_angle: Vec<Bam>,
}

impl Default for ViewTables {
    fn default() -> Self {
        Self::new(0, 0, &RenderConfig::default())
    }
}

impl ViewTables {
    pub fn new(width: usize, height: usize, cfg: &RenderConfig) -> Self {
        let width_f = width as f32;
        let height_f = height as f32;
        let half_w = width_f * 0.5;
        let half_h = height_f * 0.5;
        // out-of-range settings fall back to something projectable
        let fov_degrees = if cfg.fov_degrees.is_finite() {
            cfg.fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
        } else {
            90.0
        };
        let fov = fov_degrees.to_radians();
        let aspect = cfg
            .aspect_ratio
            .filter(|a| *a > 0.0 && a.is_finite())
            .unwrap_or(if height > 0 {
                width_f / height_f
            } else {
                1.0
            });
        let z_near = if cfg.z_near > 0.0 && cfg.z_near.is_finite() {
            cfg.z_near
        } else {
            1.0
        };
        let z_far = if cfg.z_far > z_near && cfg.z_far.is_finite() {
            cfg.z_far
        } else {
            z_near + 16384.0
        };
        let proj = ProjectionMatrix::new(fov, aspect, z_near, z_far);
        let x_scale = proj.r0c0 * half_w;

        let x_to_angle = (0..width)
            .map(|x| Bam::from_radians(((half_w - (x as f32 + 0.5)) / x_scale).atan()))
            .collect();

        Self {
            width,
            height,
            width_f,
            height_f,
            half_w,
            half_h,
            aspect,
            z_near,
            z_far,
            proj,
            x_scale,
            y_scale: proj.r1c1 * half_h,
            clip_angle: Bam::from_radians(fov * 0.5),
            x_to_angle,
        }
    }

    /// Rows of a sky texture `tex_h` texels tall once scaled to this view.
    #[inline]
    pub fn sky_column_height(&self, tex_h: usize) -> usize {
        (tex_h as f32 * self.height_f / REFERENCE_VIEW_HEIGHT).ceil() as usize
    }

    /// Screen column of a view-relative angle (positive = left).
    #[inline]
    pub fn angle_to_x(&self, rel: Bam) -> f32 {
        self.half_w - rel.to_signed_radians().tan() * self.x_scale
    }
}

/// Camera-derived state for one frame, passed by reference down the
/// whole pipeline.
#[derive(Clone, Copy, Debug)]
pub struct ViewContext<'t> {
    pub tables: &'t ViewTables,
    pub cam_x: Fixed,
    pub cam_y: Fixed,
    pub pos: Vec3,
    pub angle: Bam,
    pub sin: f32,
    pub cos: f32,
    pub forward: Vec2,
    pub right: Vec2,
    pub extra_light: u8,
    pub tint: Vec3,
}

impl<'t> ViewContext<'t> {
    pub fn new(camera: &Camera, tables: &'t ViewTables, effects: FrameEffects) -> Self {
        let (sin, cos) = camera.angle.sin_cos();
        Self {
            tables,
            cam_x: camera.x,
            cam_y: camera.y,
            pos: camera.pos(),
            angle: camera.angle,
            sin,
            cos,
            forward: Vec2::new(cos, sin),
            right: Vec2::new(sin, -cos),
            extra_light: effects.extra_light,
            tint: effects.tint,
        }
    }

    /// Map-space offset from the camera; the subtraction happens in
    /// fixed point so far-away coordinates keep their precision.
    #[inline]
    pub fn rel(&self, x: Fixed, y: Fixed) -> Vec2 {
        Vec2::new((x - self.cam_x).to_f32(), (y - self.cam_y).to_f32())
    }

    /// `(lateral, depth)` of a map point, lateral positive to the right.
    #[inline]
    pub fn to_view(&self, x: Fixed, y: Fixed) -> Vec2 {
        let d = self.rel(x, y);
        Vec2::new(d.dot(self.right), d.dot(self.forward))
    }

    #[inline]
    pub fn vertex_to_view(&self, v: Vertex) -> Vec2 {
        self.to_view(v.x, v.y)
    }

    #[inline]
    pub fn vertex_world(&self, v: Vertex) -> Vec2 {
        Vec2::new(v.x.to_f32(), v.y.to_f32())
    }

    /// Absolute angle from the camera to a map point.
    #[inline]
    pub fn angle_to(&self, x: Fixed, y: Fixed) -> Bam {
        let d = self.rel(x, y);
        Bam::of_vector(d.x, d.y)
    }

    #[inline(always)]
    pub fn screen_x(&self, lateral: f32, inv_z: f32) -> f32 {
        self.tables.half_w + self.tables.x_scale * lateral * inv_z
    }

    /// Screen row of world height `z` seen at inverse depth `inv_z`.
    #[inline(always)]
    pub fn screen_y(&self, z: f32, inv_z: f32) -> f32 {
        self.tables.half_h + self.tables.y_scale * (z - self.pos.z) * inv_z
    }

    /// Sector light with this frame's extra light applied.
    #[inline]
    pub fn light_level(&self, sector_light: u8) -> u8 {
        sector_light.saturating_add(self.extra_light)
    }

    /// Absolute view angle through the centre of column `x`.
    #[inline]
    pub fn column_angle(&self, x: usize) -> Bam {
        self.angle + self.tables.x_to_angle.get(x).copied().unwrap_or_default()
    }
}
