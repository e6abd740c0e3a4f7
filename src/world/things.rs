//! Dynamic objects as the renderer sees them: a position, a sprite frame
//! and a couple of visibility bits. Movement and AI live elsewhere and
//! update these records between frames.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::math::Fixed;
use crate::world::geometry::{Level, SectorId};
use crate::world::texture::TextureId;

pub type ThingId = u16;
pub type SpriteFrameId = u16;

bitflags! {
    /// Subset of the runtime mobj flags that affect drawing.
    ///
    /// Numeric values match `doom/info.h`.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MobjFlags: u32 {
        // Not linked into any sector: never drawn.
        const NOSECTOR       = 0x0000_0008;
        // Partial invisibility (spectre): drawn with a stipple pattern.
        const SHADOW         = 0x0004_0000;
    }
}

/// One animation frame of a sprite, as a patch with its hot-spot offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteFrame {
    pub texture: TextureId,
    /// Texels from the left edge to the object's centre.
    pub left_offset: i16,
    /// Texels from the top edge down to the object's origin (its feet).
    pub top_offset: i16,
    pub flipped: bool,
    /// Ignore sector light (muzzle flashes, fireballs).
    pub fullbright: bool,
}

#[derive(Clone, Debug)]
pub struct MapObject {
    pub x: Fixed,
    pub y: Fixed,
    /// Feet height.
    pub z: Fixed,
    pub sprite: SpriteFrameId,
    pub flags: MobjFlags,
}

impl MapObject {
    pub fn new(x: i32, y: i32, z: i32, sprite: SpriteFrameId) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
            z: Fixed::from_int(z),
            sprite,
            flags: MobjFlags::empty(),
        }
    }

    #[inline]
    pub fn is_drawn(&self) -> bool {
        !self.flags.contains(MobjFlags::NOSECTOR)
    }

    #[inline]
    pub fn is_shadow(&self) -> bool {
        self.flags.contains(MobjFlags::SHADOW)
    }
}

/*──────────────────────────── sprite frames ───────────────────────────*/

#[derive(Default)]
pub struct SpriteBank {
    frames: Vec<SpriteFrame>,
}

impl SpriteBank {
    pub fn insert(&mut self, frame: SpriteFrame) -> SpriteFrameId {
        self.frames.push(frame);
        (self.frames.len() - 1) as SpriteFrameId
    }

    #[inline]
    pub fn frame(&self, id: SpriteFrameId) -> Option<&SpriteFrame> {
        self.frames.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/*──────────────────────────── object list ─────────────────────────────*/

/// All dynamic objects plus a per-sector index of who stands where.
///
/// `link` must run after objects move and before the next frame renders.
#[derive(Default)]
pub struct ThingList {
    objects: Vec<MapObject>,
    by_sector: Vec<SmallVec<[ThingId; 4]>>,
}

impl ThingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, obj: MapObject) -> ThingId {
        self.objects.push(obj);
        (self.objects.len() - 1) as ThingId
    }

    #[inline]
    pub fn get(&self, id: ThingId) -> Option<&MapObject> {
        self.objects.get(id as usize)
    }

    pub fn get_mut(&mut self, id: ThingId) -> Option<&mut MapObject> {
        self.objects.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapObject> {
        self.objects.iter()
    }

    /// Rebuild the per-sector lists from current positions.
    pub fn link(&mut self, level: &Level) {
        for list in &mut self.by_sector {
            list.clear();
        }
        self.by_sector.resize_with(level.sectors.len(), SmallVec::new);

        for (id, obj) in self.objects.iter().enumerate() {
            if !obj.is_drawn() {
                continue;
            }
            if let Some(list) = level
                .sector_at(obj.x, obj.y)
                .and_then(|s| self.by_sector.get_mut(s as usize))
            {
                list.push(id as ThingId);
            }
        }
    }

    /// Objects standing in `sector` as of the last `link`.
    #[inline]
    pub fn in_sector(&self, sector: SectorId) -> &[ThingId] {
        self.by_sector
            .get(sector as usize)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }
}
