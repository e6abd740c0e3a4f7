//! Whole-frame scenarios over the sample maps.

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

use crate::config::RenderConfig;
use crate::renderer::{FrameEffects, Renderer, RendererExt, Scene, Software};
use crate::world::{Camera, Level, LinedefId, MapObject, SpriteBank, TextureBank, ThingList, maps};
use crate::world::maps::RoomSpec;

const W: usize = 320;
const H: usize = 200;

struct World {
    bank: TextureBank,
    sprites: SpriteBank,
    level: Level,
    things: ThingList,
}

impl World {
    fn new(level: impl FnOnce(&TextureBank) -> Level, objects: &[MapObject]) -> Self {
        let bank = maps::sample_bank().unwrap();
        let level = level(&bank);
        let mut things = ThingList::new();
        for o in objects {
            things.push(o.clone());
        }
        things.link(&level);
        Self {
            sprites: maps::sample_sprites(&bank),
            bank,
            level,
            things,
        }
    }

    fn scene(&self, camera: Camera, effects: FrameEffects) -> Scene<'_> {
        Scene {
            level: &self.level,
            things: &self.things,
            sprites: &self.sprites,
            textures: &self.bank,
            camera,
            effects,
        }
    }

    fn render(&self, sw: &mut Software, camera: Camera) {
        self.render_with(sw, camera, FrameEffects::default());
    }

    fn render_with(&self, sw: &mut Software, camera: Camera, effects: FrameEffects) {
        let scene = self.scene(camera, effects);
        sw.render_frame(W, H, &scene, |_, _, _| {});
    }
}

fn eye(x: f32, y: f32, yaw: f32) -> Camera {
    Camera::from_world(Vec3::new(x, y, 41.0), yaw)
}

fn two_sided_line(level: &Level) -> LinedefId {
    level
        .segs
        .iter()
        .find(|s| level.seg_sides(s).is_some_and(|sides| sides.back.is_some()))
        .map(|s| s.linedef)
        .unwrap()
}

#[test]
fn square_room_shows_every_wall_one_plane_each() {
    let world = World::new(|b| maps::square_room(b, 256, 255).unwrap(), &[]);
    let mut sw = Software::default();
    let mut walls = HashSet::new();

    for k in [1.0, 3.0, 5.0, 7.0] {
        world.render(&mut sw, eye(0.0, 0.0, k * FRAC_PI_4));
        let frame = sw.frame();
        let stats = sw.stats();

        assert_eq!(stats.floor_groups, 1, "yaw {k}");
        assert_eq!(stats.ceiling_groups, 1, "yaw {k}");
        assert_eq!(stats.wall_groups, 2, "yaw {k}");
        assert!(frame.seg_clip().iter().all(|b| b.is_full()));
        assert!(frame.fragments().walls.iter().all(|f| (f.light - 1.0).abs() < 1e-6));

        walls.extend(
            frame
                .draw_segs()
                .iter()
                .filter(|ds| ds.wall_columns > 0)
                .map(|ds| ds.line),
        );
    }
    assert_eq!(walls.len(), 4);
}

#[test]
fn walled_off_sprite_is_invisible() {
    let world = World::new(
        |b| maps::walled_rooms(b).unwrap(),
        &[MapObject::new(192, 0, 0, 0)],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-128.0, 0.0, 0.0));

    let stats = sw.stats();
    assert_eq!(stats.sprite_fragments, 0);
    assert!(sw.frame().fragments().sprites.is_empty());
    // the west room fills the view before the east leaf is reached
    assert_eq!(stats.leaves_visited, 1);
}

#[test]
fn sprite_below_a_step_is_clipped_away() {
    let world = World::new(
        |b| {
            maps::stepped_rooms(b, RoomSpec::new(0, 128, 255), RoomSpec::new(100, 228, 255))
                .unwrap()
        },
        &[MapObject::new(128, 0, 0, 0)],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-128.0, 0.0, 0.0));

    let stats = sw.stats();
    assert_eq!(stats.leaves_visited, 2);
    assert_eq!(stats.sprites_submitted, 1);
    assert_eq!(sw.frame().draw_sprites().len(), 1);
    assert_eq!(stats.sprite_fragments, 0);
}

#[test]
fn sprite_above_the_step_is_drawn() {
    let world = World::new(
        |b| {
            maps::stepped_rooms(b, RoomSpec::new(0, 128, 255), RoomSpec::new(24, 228, 255))
                .unwrap()
        },
        &[MapObject::new(128, 0, 24, 0)],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-128.0, 0.0, 0.0));
    assert!(sw.stats().sprite_fragments > 0);
}

#[test]
fn nearer_sprite_wins() {
    let world = World::new(
        |b| maps::square_room(b, 512, 255).unwrap(),
        &[MapObject::new(100, 0, 0, 0), MapObject::new(200, 0, 0, 1)],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(0.0, 0.0, 0.0));

    let centre = (W / 2) as u16;
    let last = sw
        .frame()
        .fragments()
        .sprites
        .iter()
        .filter(|f| f.x == centre)
        .last()
        .unwrap();
    assert!((last.depth - 100.0).abs() < 1e-3);
    assert_eq!(sw.pixels()[(H / 2) * W + W / 2], 0xFF_FF0000);
    assert_eq!(sw.stats().sprites_drawn, 2);
}

#[test]
fn projection_follows_config() {
    let cfg = RenderConfig {
        aspect_ratio: Some(2.0),
        ..RenderConfig::default()
    };
    let mut sw = Software::new(cfg);
    sw.init_math_tables(W, H);
    let m = sw.tables().proj;
    assert!((m.r0c0 - 1.0).abs() < 1e-6);
    assert!((m.r1c1 + 2.0).abs() < 1e-6);
    assert!((m.r2c2 - 16385.0 / 16384.0).abs() < 1e-6);
    assert!((m.r2c3 + 16385.0 / 16384.0).abs() < 1e-6);
}

#[test]
fn fragments_come_nearest_first() {
    let world = World::new(
        |b| {
            maps::stepped_rooms(b, RoomSpec::new(0, 128, 200), RoomSpec::new(24, 96, 200))
                .unwrap()
        },
        &[],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-200.0, 30.0, 0.1));

    let frame = sw.frame();
    let mut last_depth = vec![0.0f32; W];
    for f in &frame.fragments().walls {
        let x = f.x as usize;
        assert!(f.depth >= last_depth[x] - 1e-3, "column {x}");
        last_depth[x] = f.depth;
    }
    for col in frame.occluders().iter() {
        assert!(col.is_sorted());
    }
    assert!(frame.stats().leaves_visited <= world.level.subsectors.len());
}

#[test]
fn equal_rooms_leave_the_opening_unoccluded() {
    let spec = RoomSpec::new(0, 128, 200);
    let world = World::new(|b| maps::stepped_rooms(b, spec, spec).unwrap(), &[]);
    let mut sw = Software::default();
    world.render(&mut sw, eye(-128.0, 0.0, 0.0));

    let line = two_sided_line(&world.level);
    let frame = sw.frame();
    assert!(frame.occluders().iter().all(|c| !c.lines().contains(&line)));
    assert!(frame.draw_segs().iter().any(|ds| ds.line == line));
    assert_eq!(sw.stats().leaves_visited, 2);
}

#[test]
fn standing_on_the_partition_still_sees_the_far_room() {
    let spec = RoomSpec::new(0, 128, 200);
    let world = World::new(|b| maps::stepped_rooms(b, spec, spec).unwrap(), &[]);
    let mut sw = Software::default();

    for x in [0.0, -0.5] {
        world.render(&mut sw, eye(x, 50.0, 0.0));
        let stats = sw.stats();
        assert_eq!(stats.leaves_visited, 2, "x {x}");
        assert!(stats.wall_groups > 0, "x {x}");
        assert!(sw.frame().seg_clip().iter().all(|b| b.is_full()), "x {x}");
    }
}

#[test]
fn step_records_its_line_as_occluder() {
    let world = World::new(
        |b| {
            maps::stepped_rooms(b, RoomSpec::new(0, 128, 200), RoomSpec::new(24, 128, 200))
                .unwrap()
        },
        &[],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-128.0, 0.0, 0.0));

    let line = two_sided_line(&world.level);
    let centre = sw.frame().occluders().column(W / 2).unwrap();
    assert_eq!(centre.lines().first(), Some(&line));
    assert!(centre.len() >= 2);
    // the step only covers rows below the horizon
    let step = centre.bounds()[0];
    assert_eq!(step.top, -1);
    assert!(step.bottom as usize > H / 2 && (step.bottom as usize) < H);
}

#[test]
fn budget_exhaustion_degrades_quietly() {
    let cfg = RenderConfig {
        fragment_budget_per_column: 0,
        max_draw_sprites: 1,
        ..RenderConfig::default()
    };
    let world = World::new(
        |b| maps::square_room(b, 512, 255).unwrap(),
        &[MapObject::new(100, 0, 0, 0), MapObject::new(200, 0, 0, 1)],
    );
    let mut sw = Software::new(cfg);
    world.render(&mut sw, eye(0.0, 0.0, 0.0));

    let stats = sw.stats();
    assert!(stats.dropped_fragments > 0);
    assert_eq!(stats.dropped_sprites, 1);
    assert!(sw.frame().fragments().walls.is_empty());
    let clear = sw.config().clear_colour;
    assert!(sw.pixels().iter().all(|&p| p == clear));
}

#[test]
fn objects_are_submitted_once_per_frame() {
    let world = World::new(
        |b| maps::square_room(b, 512, 255).unwrap(),
        &[MapObject::new(100, 0, 0, 0)],
    );
    let mut sw = Software::default();
    for _ in 0..3 {
        world.render(&mut sw, eye(0.0, 0.0, 0.0));
        assert_eq!(sw.stats().sprites_submitted, 1);
    }
}

#[test]
fn tint_reaches_every_surface() {
    let world = World::new(|b| maps::square_room(b, 512, 160).unwrap(), &[]);
    let mut sw = Software::default();
    let effects = FrameEffects {
        extra_light: 0,
        tint: Vec3::new(1.0, 0.0, 0.0),
    };
    world.render_with(&mut sw, eye(0.0, 0.0, 0.0), effects);

    for y in 0..H {
        let p = sw.pixels()[y * W + W / 2];
        assert_eq!(p & 0x0000_FFFF, 0, "row {y}: {p:08x}");
    }
}

#[test]
fn extra_light_brightens() {
    let world = World::new(|b| maps::square_room(b, 512, 96).unwrap(), &[]);
    let mut sw = Software::default();
    world.render(&mut sw, eye(0.0, 0.0, 0.0));
    let dim: Vec<f32> = sw.frame().fragments().walls.iter().map(|f| f.light).collect();

    let effects = FrameEffects {
        extra_light: 64,
        ..FrameEffects::default()
    };
    world.render_with(&mut sw, eye(0.0, 0.0, 0.0), effects);
    let lit = &sw.frame().fragments().walls;
    assert_eq!(dim.len(), lit.len());
    assert!(dim.iter().zip(lit).all(|(d, l)| l.light > *d));
}

#[test]
fn sky_shows_above_a_lower_sky_ceiling() {
    let world = World::new(
        |b| {
            maps::stepped_rooms(b, RoomSpec::new(0, 160, 255), RoomSpec::new(0, 128, 255).with_sky())
                .unwrap()
        },
        &[],
    );
    let mut sw = Software::default();
    world.render(&mut sw, eye(-250.0, 0.0, 0.0));

    let sky_flat = world.bank.id("F_SKY1").unwrap();
    assert!(sw.stats().sky_columns > 0);
    assert!(sw.frame().fragments().ceilings.iter().all(|f| f.texture != sky_flat));
}

#[test]
fn demo_level_renders() {
    let bank = maps::sample_bank().unwrap();
    let (level, things) = maps::demo(&bank).unwrap();
    let sprites = maps::sample_sprites(&bank);
    let scene = Scene {
        level: &level,
        things: &things,
        sprites: &sprites,
        textures: &bank,
        camera: eye(-200.0, 0.0, 0.0),
        effects: FrameEffects::default(),
    };
    let mut sw = Software::default();
    sw.begin_frame(W, H);
    sw.draw_level(&scene);
    let stats = sw.stats();
    assert_eq!(stats.leaves_visited, 2);
    assert!(stats.sprites_drawn > 0);
    assert!(sw.frame().seg_clip().iter().all(|b| b.is_full()));
}
