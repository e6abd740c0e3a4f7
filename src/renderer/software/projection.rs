use glam::Vec2;

use crate::renderer::software::view::ViewContext;
use crate::world::Vertex;

/// Sparse perspective matrix. Only four entries are non-zero:
///
/// ```text
/// | r0c0   0     0     0   |
/// |  0    r1c1   0     0   |
/// |  0     0    r2c2  r2c3 |
/// |  0     0     1     0   |
/// ```
///
/// View space is x = right, y = up, z = depth; `w` after projection is the
/// depth itself, so `1/w` is the perspective-correct interpolant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionMatrix {
    pub r0c0: f32,
    pub r1c1: f32,
    pub r2c2: f32,
    pub r2c3: f32,
}

impl ProjectionMatrix {
    /// `fov` is the horizontal field of view in radians, `aspect` the
    /// width/height ratio of the view.
    pub fn new(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let f = (fov * 0.5).tan();
        Self {
            r0c0: 1.0 / f,
            r1c1: -aspect / f,
            r2c2: -z_far / (z_near - z_far),
            r2c3: -(z_near * z_far) / (z_far - z_near),
        }
    }

    /// Normalised device depth of a view-space depth: 0 at the near plane,
    /// 1 at the far plane.
    #[inline]
    pub fn ndc_depth(&self, z: f32) -> f32 {
        (self.r2c2 * z + self.r2c3) / z
    }
}

/// One wall end after projection; attributes are pre-divided by depth so
/// they interpolate linearly in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    pub x: f32,
    pub inv_z: f32,
    pub u_over_z: f32,
    pub world_over_z: Vec2,
}

/// A wall edge clipped to the near plane and mapped to screen columns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub p1: ProjectedPoint,
    pub p2: ProjectedPoint,
    /// First and last covered column, already clamped to the view.
    pub x_l: i32,
    pub x_r: i32,
}

/// Per-column attributes recovered from an [`Edge`].
#[derive(Clone, Copy, Debug)]
pub struct ColumnSample {
    pub inv_z: f32,
    pub depth: f32,
    pub u: f32,
    pub world: Vec2,
}

impl Edge {
    /// Perspective-correct attributes at the centre of column `x`.
    #[inline]
    pub fn sample(&self, x: i32) -> ColumnSample {
        let span = self.p2.x - self.p1.x;
        let t = (((x as f32 + 0.5) - self.p1.x) / span).clamp(0.0, 1.0);
        let inv_z = self.p1.inv_z + (self.p2.inv_z - self.p1.inv_z) * t;
        let depth = 1.0 / inv_z;
        let u = (self.p1.u_over_z + (self.p2.u_over_z - self.p1.u_over_z) * t) * depth;
        let world = self.p1.world_over_z.lerp(self.p2.world_over_z, t) * depth;
        ColumnSample {
            inv_z,
            depth,
            u,
            world,
        }
    }
}

/// Transform, near-clip and project the wall `v1 → v2`. `u_start` is the
/// texture u at `v1`.
///
/// `None` when both ends are behind the near plane, when the wall faces
/// away (projects right-to-left) or covers no pixel centre.
pub fn project_seg(view: &ViewContext<'_>, v1: Vertex, v2: Vertex, u_start: f32) -> Option<Edge> {
    let t = view.tables;
    let mut a = view.vertex_to_view(v1);
    let mut b = view.vertex_to_view(v2);
    let len = (b - a).length();

    let (mut t1, mut t2) = (0.0, 1.0);
    if !clip_near(&mut a, &mut b, &mut t1, &mut t2, t.z_near) {
        return None;
    }

    let inv1 = 1.0 / a.y;
    let inv2 = 1.0 / b.y;
    let sx1 = view.screen_x(a.x, inv1);
    let sx2 = view.screen_x(b.x, inv2);
    // NaN-safe: reject anything that is not strictly left-to-right
    if !(sx2 > sx1) {
        return None;
    }

    let x_l = ((sx1 - 0.5).ceil().max(0.0)) as i32;
    let x_r = ((sx2 - 0.5).ceil() - 1.0).min(t.width_f - 1.0) as i32;
    if x_l > x_r {
        return None;
    }

    let w1 = view.vertex_world(v1);
    let w2 = view.vertex_world(v2);
    let world1 = w1.lerp(w2, t1);
    let world2 = w1.lerp(w2, t2);

    Some(Edge {
        p1: ProjectedPoint {
            x: sx1,
            inv_z: inv1,
            u_over_z: (u_start + t1 * len) * inv1,
            world_over_z: world1 * inv1,
        },
        p2: ProjectedPoint {
            x: sx2,
            inv_z: inv2,
            u_over_z: (u_start + t2 * len) * inv2,
            world_over_z: world2 * inv2,
        },
        x_l,
        x_r,
    })
}

/// Clip a view-space segment (x = lateral, y = depth) to `depth >= near`.
/// `t1`/`t2` track where the surviving ends sit on the original segment.
/// Returns false if it is completely behind.
pub fn clip_near(p1: &mut Vec2, p2: &mut Vec2, t1: &mut f32, t2: &mut f32, near: f32) -> bool {
    if p1.y < near && p2.y < near {
        return false;
    }
    if p1.y < near {
        let t = (near - p1.y) / (p2.y - p1.y);
        *p1 += (*p2 - *p1) * t;
        p1.y = near;
        *t1 = t;
    }
    if p2.y < near {
        let t = (near - p2.y) / (p1.y - p2.y);
        *p2 += (*p1 - *p2) * t;
        p2.y = near;
        *t2 = 1.0 - t * (1.0 - *t1);
    }
    true
}
