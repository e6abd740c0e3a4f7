//! Sprite collection, depth sort and per-column occlusion clipping.

use crate::math::Fixed;
use crate::renderer::Scene;
use crate::renderer::software::fragments::{SpriteFragment, TexStep};
use crate::renderer::software::light::LightParams;
use crate::renderer::software::occlusion::Bounds;
use crate::renderer::software::renderer::Frame;
use crate::renderer::software::view::ViewContext;
use crate::world::bsp::side_of_segment;
use crate::world::{LinedefId, MapObject, SectorId, ThingId, TextureId};

/// Objects closer than this are not drawn.
pub const MIN_SPRITE_DEPTH: f32 = 4.0;

/// A visible object, projected and waiting for the depth sort.
#[derive(Clone, Copy, Debug)]
pub struct DrawSprite {
    pub thing: ThingId,
    /// Map position, used for the side test against occluding lines.
    pub world_x: Fixed,
    pub world_y: Fixed,
    pub screen_lx: f32,
    pub screen_rx: f32,
    pub screen_ty: f32,
    pub screen_by: f32,
    pub depth: f32,
    pub light: f32,
    pub texture: TextureId,
    pub tex_w: u16,
    pub tex_h: u16,
    pub flip: bool,
    pub transparent: bool,
}

/// Project `obj` to the screen. `None` if it is too near, too far,
/// off-screen or has no size.
pub fn project_sprite(
    view: &ViewContext<'_>,
    scene: &Scene<'_>,
    thing: ThingId,
    obj: &MapObject,
    light_level: u8,
    z_offset: f32,
) -> Option<DrawSprite> {
    let frame = scene.sprites.frame(obj.sprite)?;
    let texture = scene.textures.resolve(frame.texture);
    let tex = scene.textures.texture_or_missing(texture);
    let t = view.tables;

    let p = view.to_view(obj.x, obj.y);
    let depth = p.y;
    if !(MIN_SPRITE_DEPTH..=t.z_far).contains(&depth) {
        return None;
    }
    let inv_z = 1.0 / depth;

    let w = tex.w as f32;
    let h = tex.h as f32;
    let left_offset = if frame.flipped {
        w - frame.left_offset as f32
    } else {
        frame.left_offset as f32
    };
    let lateral_l = p.x - left_offset;
    let screen_lx = view.screen_x(lateral_l, inv_z);
    let screen_rx = view.screen_x(lateral_l + w, inv_z);

    let top_z = obj.z.to_f32() + frame.top_offset as f32 + z_offset;
    let screen_ty = view.screen_y(top_z, inv_z);
    let screen_by = view.screen_y(top_z - h, inv_z);

    if !(screen_rx > screen_lx) || !(screen_by > screen_ty) {
        return None;
    }
    if screen_rx <= 0.0 || screen_lx >= t.width_f || screen_by <= 0.0 || screen_ty >= t.height_f {
        return None;
    }

    let light = if frame.fullbright {
        1.0
    } else {
        LightParams::for_level(light_level).light_mul_for_dist(depth)
    };

    Some(DrawSprite {
        thing,
        world_x: obj.x,
        world_y: obj.y,
        screen_lx,
        screen_rx,
        screen_ty,
        screen_by,
        depth,
        light,
        texture,
        tex_w: tex.w as u16,
        tex_h: tex.h as u16,
        flip: frame.flipped,
        transparent: obj.is_shadow(),
    })
}

#[inline(always)]
fn first_centre_at(p: f32) -> i32 {
    (p - 0.5).ceil() as i32
}

impl Frame {
    /// Submit every object linked into `sector` that has not been
    /// submitted yet this frame.
    pub fn add_sprites_in_sector(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>, sector: SectorId) {
        let Some(sec) = scene.level.sectors.get(sector as usize) else {
            return;
        };
        let light_level = view.light_level(sec.light);

        for &id in scene.things.in_sector(sector) {
            let Some(mark) = self.sprite_marks.get_mut(id as usize) else {
                continue;
            };
            if *mark == self.valid_count {
                continue;
            }
            *mark = self.valid_count;

            let Some(obj) = scene.things.get(id) else {
                continue;
            };
            if !obj.is_drawn() {
                continue;
            }
            self.stats.sprites_submitted += 1;

            let Some(spr) = project_sprite(view, scene, id, obj, light_level, self.sprite_z_offset)
            else {
                continue;
            };
            if self.draw_sprites.len() < self.max_sprites {
                self.draw_sprites.push(spr);
            } else {
                self.stats.dropped_sprites += 1;
            }
        }
    }

    /// Sort the collected sprites by depth and split them into occlusion
    /// clipped columns, farthest first so nearer sprites are drawn last.
    pub fn build_sprite_fragments(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>) {
        self.draw_sprites.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for i in (0..self.draw_sprites.len()).rev() {
            let spr = self.draw_sprites[i];
            let columns = self.split_sprite(view, scene, &spr);
            if columns > 0 {
                self.stats.sprites_drawn += 1;
                self.stats.sprite_fragments += columns;
            }
        }
    }

    fn split_sprite(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>, spr: &DrawSprite) -> usize {
        let level = scene.level;
        let x_first = first_centre_at(spr.screen_lx).max(0);
        let x_last = (first_centre_at(spr.screen_rx) - 1).min(self.width as i32 - 1);
        let y_first = first_centre_at(spr.screen_ty);
        let y_last = first_centre_at(spr.screen_by) - 1;
        if x_first > x_last || y_first > y_last {
            return 0;
        }

        let u_scale = spr.tex_w as f32 / (spr.screen_rx - spr.screen_lx);
        let v_step = spr.tex_h as f32 / (spr.screen_by - spr.screen_ty);

        // the sprite is in front of a line when it shares the camera's side
        let in_front_of = |line: LinedefId| {
            let Some(l) = level.linedefs.get(line as usize) else {
                return false;
            };
            let (Some(&v1), Some(&v2)) = (
                level.vertices.get(l.v1 as usize),
                level.vertices.get(l.v2 as usize),
            ) else {
                return false;
            };
            side_of_segment(v1, v2, spr.world_x, spr.world_y)
                == side_of_segment(v1, v2, view.cam_x, view.cam_y)
        };

        let mut columns = 0;
        for x in x_first..=x_last {
            let col = x as usize;
            let open = self
                .occluders
                .occluder_for(col, spr.depth, &in_front_of)
                .map_or(Bounds::open(self.height), |b| b.intersect(Bounds::open(self.height)));
            let Some((open_first, open_last)) = open.rows() else {
                continue;
            };
            let first = y_first.max(open_first);
            let last = y_last.min(open_last);
            if first > last {
                continue;
            }

            let u = ((x as f32 + 0.5 - spr.screen_lx) * u_scale).floor() as i32;
            let height = (last - first + 1) as u32;
            let v_start = (first as f32 + 0.5 - spr.screen_ty) * v_step;
            let pushed = self.fragments.push_sprite(SpriteFragment {
                x: col as u16,
                y: first as u16,
                height: height as u16,
                tex_x: u.clamp(0, spr.tex_w as i32 - 1),
                tex_y: TexStep::new(v_start, v_step, height),
                light: spr.light,
                texture: spr.texture,
                depth: spr.depth,
                shadow: spr.transparent,
                flip: spr.flip,
            });
            if pushed {
                columns += 1;
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::renderer::FrameEffects;
    use crate::renderer::software::view::ViewTables;
    use crate::world::maps::RoomSpec;
    use crate::world::{Camera, ThingList, maps};
    use glam::Vec3;

    struct Fixture {
        level: crate::world::Level,
        things: ThingList,
        sprites: crate::world::SpriteBank,
        bank: crate::world::TextureBank,
        tables: ViewTables,
    }

    fn fixture(objs: &[MapObject]) -> Fixture {
        fixture_in(|b| maps::square_room(b, 512, 255).unwrap(), objs)
    }

    fn fixture_in(
        level: impl FnOnce(&crate::world::TextureBank) -> crate::world::Level,
        objs: &[MapObject],
    ) -> Fixture {
        let bank = maps::sample_bank().unwrap();
        let level = level(&bank);
        let mut things = ThingList::new();
        for o in objs {
            things.push(o.clone());
        }
        things.link(&level);
        Fixture {
            sprites: maps::sample_sprites(&bank),
            level,
            things,
            bank,
            tables: ViewTables::new(320, 200, &RenderConfig::default()),
        }
    }

    /// Equal rooms either side of the two-sided line at x = 0.
    fn open_rooms(objs: &[MapObject]) -> Fixture {
        let spec = RoomSpec::new(0, 128, 255);
        fixture_in(|b| maps::stepped_rooms(b, spec, spec).unwrap(), objs)
    }

    impl Fixture {
        fn opening(&self) -> LinedefId {
            let level = &self.level;
            level
                .segs
                .iter()
                .find(|s| level.seg_sides(s).is_some_and(|sd| sd.back.is_some()))
                .map(|s| s.linedef)
                .unwrap()
        }

        /// Clip the only object against a closed occluder on the opening
        /// at `occluder_depth` in every column.
        fn clip_behind_opening(&self, cam: Camera, occluder_depth: f32) -> Frame {
            let scene = self.scene(cam);
            let view = ViewContext::new(&cam, &self.tables, scene.effects);
            let mut frame = Frame::default();
            frame.reset(&self.tables, &RenderConfig::default(), self.things.len());

            let obj = self.things.get(0).unwrap();
            let spr = project_sprite(&view, &scene, 0, obj, 255, 4.0).unwrap();
            assert!(spr.depth > occluder_depth);
            frame.draw_sprites.push(spr);

            let line = self.opening();
            for x in 0..self.tables.width {
                frame.occluders.insert(x, occluder_depth, line, Bounds::CLOSED, true);
            }
            frame.build_sprite_fragments(&view, &scene);
            frame
        }

        fn scene(&self, camera: Camera) -> Scene<'_> {
            Scene {
                level: &self.level,
                things: &self.things,
                sprites: &self.sprites,
                textures: &self.bank,
                camera,
                effects: FrameEffects::default(),
            }
        }
    }

    #[test]
    fn projects_centred_and_sized_by_depth() {
        let f = fixture(&[MapObject::new(100, 0, 0, 0)]);
        let cam = Camera::from_world(Vec3::new(0.0, 0.0, 41.0), 0.0);
        let scene = f.scene(cam);
        let view = ViewContext::new(&cam, &f.tables, scene.effects);
        let obj = f.things.get(0).unwrap();
        let spr = project_sprite(&view, &scene, 0, obj, 255, 4.0).unwrap();

        assert!((spr.depth - 100.0).abs() < 1e-3);
        let centre = (spr.screen_lx + spr.screen_rx) * 0.5;
        assert!((centre - f.tables.half_w).abs() < 1e-3);
        let width = spr.screen_rx - spr.screen_lx;
        assert!((width - maps::SPRITE_W as f32 * f.tables.x_scale / 100.0).abs() < 1e-3);
        assert_eq!(spr.light, 1.0);
    }

    #[test]
    fn rejects_too_near_and_behind() {
        let f = fixture(&[MapObject::new(2, 0, 0, 0), MapObject::new(-50, 0, 0, 0)]);
        let cam = Camera::from_world(Vec3::new(0.0, 0.0, 41.0), 0.0);
        let scene = f.scene(cam);
        let view = ViewContext::new(&cam, &f.tables, scene.effects);
        for id in 0..2 {
            let obj = f.things.get(id).unwrap();
            assert!(project_sprite(&view, &scene, id, obj, 255, 4.0).is_none());
        }
    }

    #[test]
    fn extra_z_offset_lifts_sprite() {
        let f = fixture(&[MapObject::new(100, 0, 0, 0)]);
        let cam = Camera::from_world(Vec3::new(0.0, 0.0, 41.0), 0.0);
        let scene = f.scene(cam);
        let view = ViewContext::new(&cam, &f.tables, scene.effects);
        let obj = f.things.get(0).unwrap();
        let low = project_sprite(&view, &scene, 0, obj, 255, 0.0).unwrap();
        let high = project_sprite(&view, &scene, 0, obj, 255, 4.0).unwrap();
        let lift = low.screen_by - high.screen_by;
        assert!((lift - 4.0 * -f.tables.y_scale / 100.0).abs() < 1e-3);
    }

    #[test]
    fn sprite_behind_a_closed_column_is_hidden() {
        let f = open_rooms(&[MapObject::new(128, 0, 0, 0)]);
        let cam = Camera::from_world(Vec3::new(-128.0, 0.0, 41.0), 0.0);
        let frame = f.clip_behind_opening(cam, 64.0);

        assert!(frame.fragments.sprites.is_empty());
        assert_eq!(frame.stats.sprite_fragments, 0);
        assert_eq!(frame.stats.sprites_drawn, 0);
    }

    #[test]
    fn sprite_on_the_camera_side_of_a_nearer_line_is_drawn() {
        // the occluder is nearer by depth, but the object stands in front
        // of its line
        let f = open_rooms(&[MapObject::new(-64, 0, 0, 0)]);
        let cam = Camera::from_world(Vec3::new(-128.0, 0.0, 41.0), 0.0);
        let frame = f.clip_behind_opening(cam, 32.0);

        assert!(!frame.fragments.sprites.is_empty());
        assert_eq!(frame.stats.sprites_drawn, 1);
        assert_eq!(frame.stats.sprite_fragments, frame.fragments.sprites.len());
    }
}
