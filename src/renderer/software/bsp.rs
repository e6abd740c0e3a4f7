//! Front-to-back BSP walk.

use log::warn;

use crate::math::{ANG180, Bam, Fixed};
use crate::renderer::Scene;
use crate::renderer::software::renderer::Frame;
use crate::renderer::software::view::ViewContext;
use crate::world::bsp::{CHILD_MASK, SUBSECTOR_BIT, side_of_segment};
use crate::world::{Aabb, SubsectorId};

/// Corner pairs of a node box seen from each of the nine regions around
/// it, as indices into `[top, bottom, left, right]`: `(x1, y1, x2, y2)`.
/// Region 5 is inside the box.
const CHECK_COORD: [[usize; 4]; 12] = [
    [3, 0, 2, 1],
    [3, 0, 2, 0],
    [3, 1, 2, 0],
    [0; 4],
    [2, 0, 2, 1],
    [0; 4],
    [3, 1, 3, 0],
    [0; 4],
    [2, 0, 3, 1],
    [2, 1, 3, 1],
    [2, 1, 3, 0],
    [0; 4],
];

/// Clip the angular span `angle1 → angle2` (absolute, `angle1` to the
/// left) to the view. Returns the view-relative span or `None` when it is
/// entirely outside the field of view or seen from behind.
pub fn clip_to_view(view: &ViewContext<'_>, angle1: Bam, angle2: Bam) -> Option<(Bam, Bam)> {
    let clip = view.tables.clip_angle;
    let span = angle1 - angle2;
    if span.0 >= ANG180.0 {
        return None;
    }

    let mut a1 = angle1 - view.angle;
    let mut a2 = angle2 - view.angle;

    let t = a1 + clip;
    if t.0 > (clip + clip).0 {
        if (t - (clip + clip)).0 >= span.0 {
            return None;
        }
        a1 = clip;
    }
    let t = clip - a2;
    if t.0 > (clip + clip).0 {
        if (t - (clip + clip)).0 >= span.0 {
            return None;
        }
        a2 = -clip;
    }
    Some((a1, a2))
}

impl Frame {
    /// Walk the whole tree from the root.
    pub fn walk_bsp(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>) {
        let root = scene.level.bsp_root();
        self.render_child(view, scene, root, 0);
    }

    fn render_child(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>, child: u16, depth: usize) {
        if self.screen_full() {
            return;
        }
        if child & SUBSECTOR_BIT != 0 {
            self.visit_subsector(view, scene, child & CHILD_MASK);
            return;
        }
        let Some(node) = scene.level.nodes.get(child as usize) else {
            return;
        };
        // children always sit below their parent; anything else is a cycle
        if depth > scene.level.nodes.len() {
            warn!(target: "renderer", "BSP cycle through node {child}");
            return;
        }

        let side = node.point_side(view.cam_x, view.cam_y);
        self.render_child(view, scene, node.child[side], depth + 1);
        if self.bbox_visible(view, &node.bbox[side ^ 1]) {
            self.render_child(view, scene, node.child[side ^ 1], depth + 1);
        }
    }

    /// Emit every seg of one leaf, then submit its objects.
    pub fn visit_subsector(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>, id: SubsectorId) {
        let level = scene.level;
        let Some(ss) = level.subsectors.get(id as usize) else {
            return;
        };
        self.stats.leaves_visited += 1;

        self.add_sprites_in_sector(view, scene, ss.sector);

        let first = ss.first_seg as usize;
        for seg_id in first..first + ss.seg_count as usize {
            let Some(seg) = level.segs.get(seg_id) else {
                break;
            };
            let (v1, v2) = level.seg_vertices(seg);
            // back-face: the camera must be on the seg's front (right) side
            if side_of_segment(v1, v2, view.cam_x, view.cam_y) != 0 {
                continue;
            }
            let a1 = view.angle_to(v1.x, v1.y);
            let a2 = view.angle_to(v2.x, v2.y);
            if clip_to_view(view, a1, a2).is_none() {
                continue;
            }
            self.add_seg(view, scene, seg_id as u16);
        }
    }

    /// True if any part of `bbox` may be visible: inside the field of view
    /// and over at least one column that still accepts pixels.
    pub fn bbox_visible(&self, view: &ViewContext<'_>, bbox: &Aabb) -> bool {
        let (x, y) = (view.cam_x, view.cam_y);
        let box_x = if x <= bbox.left {
            0
        } else if x < bbox.right {
            1
        } else {
            2
        };
        let box_y = if y >= bbox.top {
            0
        } else if y > bbox.bottom {
            1
        } else {
            2
        };
        let box_pos = box_y * 4 + box_x;
        if box_pos == 5 {
            return true;
        }

        let coords: [Fixed; 4] = [bbox.top, bbox.bottom, bbox.left, bbox.right];
        let [cx1, cy1, cx2, cy2] = CHECK_COORD[box_pos];
        let angle1 = view.angle_to(coords[cx1], coords[cy1]);
        let angle2 = view.angle_to(coords[cx2], coords[cy2]);
        // camera on the box's edge line
        if (angle1 - angle2).0 >= ANG180.0 {
            return true;
        }
        let Some((a1, a2)) = clip_to_view(view, angle1, angle2) else {
            return false;
        };

        let t = view.tables;
        let sx1 = (t.angle_to_x(a1) - 0.5).floor().max(0.0) as usize;
        let sx2 = (t.angle_to_x(a2) + 0.5).ceil().min(t.width_f) as usize;
        self.any_open_column(sx1, sx2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::renderer::FrameEffects;
    use crate::renderer::software::view::ViewTables;
    use crate::world::Camera;
    use glam::Vec3;

    fn tables() -> ViewTables {
        ViewTables::new(320, 200, &RenderConfig::default())
    }

    #[test]
    fn spans_in_front_survive() {
        let t = tables();
        let cam = Camera::from_world(Vec3::ZERO, 0.0);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        // wall crossing the view from left (north) to right (south)
        let a1 = view.angle_to(Fixed::from_int(100), Fixed::from_int(50));
        let a2 = view.angle_to(Fixed::from_int(100), Fixed::from_int(-50));
        let (r1, r2) = clip_to_view(&view, a1, a2).unwrap();
        assert!(r1.to_signed_radians() > 0.0 && r2.to_signed_radians() < 0.0);
    }

    #[test]
    fn spans_behind_or_reversed_are_rejected() {
        let t = tables();
        let cam = Camera::from_world(Vec3::ZERO, 0.0);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        // behind the camera
        let a1 = view.angle_to(Fixed::from_int(-100), Fixed::from_int(-50));
        let a2 = view.angle_to(Fixed::from_int(-100), Fixed::from_int(50));
        assert!(clip_to_view(&view, a1, a2).is_none());
        // same wall seen from its back
        let a1 = view.angle_to(Fixed::from_int(100), Fixed::from_int(-50));
        let a2 = view.angle_to(Fixed::from_int(100), Fixed::from_int(50));
        assert!(clip_to_view(&view, a1, a2).is_none());
    }

    #[test]
    fn wide_spans_are_clamped_to_fov() {
        let t = tables();
        let cam = Camera::from_world(Vec3::ZERO, 0.0);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        let a1 = view.angle_to(Fixed::from_int(10), Fixed::from_int(500));
        let a2 = view.angle_to(Fixed::from_int(10), Fixed::from_int(-500));
        let (r1, r2) = clip_to_view(&view, a1, a2).unwrap();
        assert_eq!(r1, t.clip_angle);
        assert_eq!(r2, -t.clip_angle);
    }

    #[test]
    fn box_touching_the_camera_is_visible() {
        let t = tables();
        let mut frame = Frame::default();
        frame.reset(&t, &RenderConfig::default(), 0);
        let bbox = Aabb {
            top: Fixed::from_int(256),
            bottom: Fixed::from_int(-256),
            left: Fixed::ZERO,
            right: Fixed::from_int(256),
        };

        // standing on the left edge, looking along it
        let cam = Camera::from_world(Vec3::new(0.0, 50.0, 41.0), 0.0);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        assert!(frame.bbox_visible(&view, &bbox));

        let cam = Camera::from_world(Vec3::new(-0.5, 50.0, 41.0), 0.0);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        assert!(frame.bbox_visible(&view, &bbox));

        // behind the camera
        let cam = Camera::from_world(Vec3::new(-10.0, 50.0, 41.0), std::f32::consts::PI);
        let view = ViewContext::new(&cam, &t, FrameEffects::default());
        assert!(!frame.bbox_visible(&view, &bbox));
    }
}
