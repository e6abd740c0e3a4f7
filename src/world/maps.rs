//! Small hand-built levels and a procedural texture set, used by the
//! demo viewer and the tests in place of WAD data.

use crate::renderer::Rgba;
use crate::world::builder::{LevelBuilder, LevelError, SideTextures};
use crate::world::geometry::{Aabb, Level};
use crate::world::texture::{Texture, TextureBank, TextureError, TextureId, TRANSPARENT_PIXEL};
use crate::world::things::{MapObject, MobjFlags, SpriteBank, SpriteFrame, ThingList};

pub const SPRITE_W: usize = 32;
pub const SPRITE_H: usize = 64;

/// Floor, ceiling and light of one room.
#[derive(Clone, Copy, Debug)]
pub struct RoomSpec {
    pub floor: i32,
    pub ceil: i32,
    pub light: u8,
    pub sky: bool,
}

impl RoomSpec {
    pub const fn new(floor: i32, ceil: i32, light: u8) -> Self {
        Self {
            floor,
            ceil,
            light,
            sky: false,
        }
    }

    pub const fn with_sky(self) -> Self {
        Self { sky: true, ..self }
    }
}

/*──────────────────────────── textures ────────────────────────────────*/

fn shade(c: Rgba, k: u32) -> Rgba {
    let ch = |s: u32| (((c >> s) & 0xFF) * k / 8) << s;
    0xFF00_0000 | ch(16) | ch(8) | ch(0)
}

fn sprite(name: &str, body: Rgba) -> Texture {
    Texture::from_fn(name, SPRITE_W, SPRITE_H, |u, _| {
        if u == 0 || u == SPRITE_W - 1 {
            TRANSPARENT_PIXEL
        } else {
            body
        }
    })
}

/// Bank with the textures every sample map refers to.
pub fn sample_bank() -> Result<TextureBank, TextureError> {
    let mut bank = TextureBank::default_with_checker();

    bank.insert(
        "WALL",
        Texture::from_fn("WALL", 64, 128, |u, v| {
            let offset = if (v / 16) % 2 == 0 { 0 } else { 16 };
            if v % 16 == 0 || (u + offset) % 32 == 0 {
                0xFF_606060
            } else {
                shade(0xFF_B04020, 6 + ((u / 32 + v / 16) % 3) as u32)
            }
        }),
    )?;
    bank.insert(
        "STEP",
        Texture::from_fn("STEP", 64, 32, |_, v| {
            if v % 8 < 2 { 0xFF_404040 } else { 0xFF_8C8C70 }
        }),
    )?;
    bank.insert(
        "FLOOR",
        Texture::from_fn("FLOOR", 64, 64, |u, v| {
            if ((u / 8) + (v / 8)) % 2 == 0 {
                0xFF_5A4A32
            } else {
                0xFF_786446
            }
        }),
    )?;
    bank.insert(
        "CEIL",
        Texture::from_fn("CEIL", 64, 64, |u, v| {
            if u % 32 == 0 || v % 32 == 0 {
                0xFF_303030
            } else {
                0xFF_9A9A9A
            }
        }),
    )?;
    let sky_flat = bank.insert("F_SKY1", Texture::solid("F_SKY1", 64, 64, 0xFF_000000))?;
    let sky = bank.insert(
        "SKY1",
        Texture::from_fn("SKY1", 256, 128, |u, v| {
            let cloud = ((u * 7 + v * 3) % 37 < 5) as u32 * 40;
            let b = 255 - (v as u32 * 100 / 128);
            0xFF00_0000 | ((60 + cloud) << 16) | ((110 + cloud) << 8) | b
        }),
    )?;
    bank.set_sky(sky_flat, sky)?;

    bank.insert("SPR_RED", sprite("SPR_RED", 0xFF_FF0000))?;
    bank.insert("SPR_BLUE", sprite("SPR_BLUE", 0xFF_0000FF))?;
    Ok(bank)
}

/// Frame 0 = red sprite, frame 1 = blue sprite, both anchored at their
/// bottom-centre.
pub fn sample_sprites(bank: &TextureBank) -> SpriteBank {
    let mut sprites = SpriteBank::default();
    for name in ["SPR_RED", "SPR_BLUE"] {
        sprites.insert(SpriteFrame {
            texture: bank.id_or_missing(name),
            left_offset: (SPRITE_W / 2) as i16,
            top_offset: SPRITE_H as i16,
            flipped: false,
            fullbright: false,
        });
    }
    sprites
}

struct Ids {
    wall: TextureId,
    step: TextureId,
    floor: TextureId,
    ceil: TextureId,
    sky: TextureId,
}

impl Ids {
    fn lookup(bank: &TextureBank) -> Self {
        Self {
            wall: bank.id_or_missing("WALL"),
            step: bank.id_or_missing("STEP"),
            floor: bank.id_or_missing("FLOOR"),
            ceil: bank.id_or_missing("CEIL"),
            sky: bank.id_or_missing("F_SKY1"),
        }
    }

    fn room(&self, b: &mut LevelBuilder, spec: RoomSpec) -> u16 {
        let ceil_tex = if spec.sky { self.sky } else { self.ceil };
        b.sector(spec.floor, spec.ceil, self.floor, ceil_tex, spec.light)
    }
}

/*───────────────────────────── levels ─────────────────────────────────*/

/// One square sector `2 * half` wide centred on the origin, floor 0,
/// ceiling 128, no BSP nodes.
pub fn square_room(bank: &TextureBank, half: i32, light: u8) -> Result<Level, LevelError> {
    let t = Ids::lookup(bank);
    let mut b = LevelBuilder::new("SQUARE");
    let sec = t.room(&mut b, RoomSpec::new(0, 128, light));
    let side = b.sidedef(sec, SideTextures::middle(t.wall));

    // clockwise so the interior is on every wall's right
    let v = [
        b.vertex(-half, half),
        b.vertex(half, half),
        b.vertex(half, -half),
        b.vertex(-half, -half),
    ];
    let first = b.segs_len();
    for i in 0..4 {
        let line = b.one_sided(v[i], v[(i + 1) % 4], side);
        b.seg(line, 0);
    }
    b.subsector(first..first + 4);
    b.build()
}

/// Two closed rooms, west `x ∈ [-256, 0]` (sector 0) and east
/// `x ∈ [64, 320]` (sector 1), split by a node at `x = 32`.
pub fn walled_rooms(bank: &TextureBank) -> Result<Level, LevelError> {
    let t = Ids::lookup(bank);
    let mut b = LevelBuilder::new("WALLED");

    let leaf = |b: &mut LevelBuilder, x0: i32, x1: i32| {
        let sec = t.room(b, RoomSpec::new(0, 128, 255));
        let side = b.sidedef(sec, SideTextures::middle(t.wall));
        let v = [
            b.vertex(x0, 128),
            b.vertex(x1, 128),
            b.vertex(x1, -128),
            b.vertex(x0, -128),
        ];
        let first = b.segs_len();
        for i in 0..4 {
            let line = b.one_sided(v[i], v[(i + 1) % 4], side);
            b.seg(line, 0);
        }
        b.subsector(first..first + 4)
    };
    let west = leaf(&mut b, -256, 0);
    let east = leaf(&mut b, 64, 320);

    b.node(
        (32, 0),
        (0, 1),
        (east, Aabb::new(64, -128, 320, 128)),
        (west, Aabb::new(-256, -128, 0, 128)),
    );
    b.build()
}

/// West room `x ∈ [-256, 0]` (sector 0) opening through a two-sided line
/// at `x = 0` onto east room `x ∈ [0, 256]` (sector 1).
pub fn stepped_rooms(
    bank: &TextureBank,
    west: RoomSpec,
    east: RoomSpec,
) -> Result<Level, LevelError> {
    let t = Ids::lookup(bank);
    let mut b = LevelBuilder::new("STEPPED");
    let w_sec = t.room(&mut b, west);
    let e_sec = t.room(&mut b, east);
    let w_wall = b.sidedef(w_sec, SideTextures::middle(t.wall));
    let e_wall = b.sidedef(e_sec, SideTextures::middle(t.wall));
    let w_step = b.sidedef(w_sec, SideTextures::steps(t.step, t.step));
    let e_step = b.sidedef(e_sec, SideTextures::steps(t.step, t.step));

    let va = b.vertex(-256, 128);
    let vb = b.vertex(0, 128);
    let vc = b.vertex(0, -128);
    let vd = b.vertex(-256, -128);
    let ve = b.vertex(256, 128);
    let vf = b.vertex(256, -128);

    let ab = b.one_sided(va, vb, w_wall);
    let bc = b.two_sided(vb, vc, w_step, e_step);
    let cd = b.one_sided(vc, vd, w_wall);
    let da = b.one_sided(vd, va, w_wall);
    let be = b.one_sided(vb, ve, e_wall);
    let ef = b.one_sided(ve, vf, e_wall);
    let fc = b.one_sided(vf, vc, e_wall);

    let first = b.segs_len();
    for line in [ab, bc, cd, da] {
        b.seg(line, 0);
    }
    let west_leaf = b.subsector(first..first + 4);

    let first = b.segs_len();
    for line in [be, ef, fc] {
        b.seg(line, 0);
    }
    b.seg(bc, 1);
    let east_leaf = b.subsector(first..first + 4);

    b.node(
        (0, 0),
        (0, -1),
        (west_leaf, Aabb::new(-256, -128, 0, 128)),
        (east_leaf, Aabb::new(0, -128, 256, 128)),
    );
    b.build()
}

/// Indoor room looking out over a step into a sky-lit courtyard, with a
/// few objects scattered around (one of them a shadow).
pub fn demo(bank: &TextureBank) -> Result<(Level, ThingList), LevelError> {
    let level = stepped_rooms(
        bank,
        RoomSpec::new(0, 128, 176),
        RoomSpec::new(24, 256, 255).with_sky(),
    )?;

    let mut things = ThingList::new();
    things.push(MapObject::new(-96, 64, 0, 0));
    things.push(MapObject::new(128, -48, 24, 1));
    things.push(MapObject::new(200, 80, 24, 0));
    let mut ghost = MapObject::new(96, 40, 24, 1);
    ghost.flags |= MobjFlags::SHADOW;
    things.push(ghost);
    things.link(&level);

    Ok((level, things))
}
