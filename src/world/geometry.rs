use bitflags::bitflags;

use crate::math::Fixed;
use crate::world::texture::TextureId;

pub type SubsectorId = u16;
pub type LinedefId = u16;
pub type SegmentId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type NodeId = u16;

/// Runtime snapshot of one map.
///
/// Read-only while a frame renders; doors and lifts mutate sector heights
/// strictly between frames.
#[derive(Debug, Default)]
pub struct Level {
    pub name: String,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub vertices: Vec<Vertex>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0010;
        const LOWER_UNPEGGED  = 0x0020;
        const SECRET          = 0x0040;
        const BLOCK_SOUND     = 0x0080;
        const NOT_ON_MAP      = 0x0200;
    }
}

#[derive(Clone, Debug)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub special: u16,
    pub tag: u16,
    pub right_sidedef: Option<SidedefId>,
    pub left_sidedef: Option<SidedefId>,
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug)]
pub struct Sidedef {
    pub x_off: Fixed,
    pub y_off: Fixed,
    pub upper: TextureId,
    pub lower: TextureId,
    pub middle: TextureId,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }
}

/// Directed piece of a linedef bounding one subsector. Its front side is
/// on the right of `v1 → v2`.
#[derive(Clone, Debug)]
pub struct Seg {
    pub v1: VertexId,
    pub v2: VertexId,
    pub linedef: LinedefId,
    /// 0 = seg runs along the linedef (right sidedef in front), 1 = against it.
    pub dir: u16,
    /// Distance from the linedef start to `v1`, for texture u.
    pub offset: Fixed,
}

#[derive(Clone, Debug)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegmentId,
    pub sector: SectorId,
}

/// Axis-aligned box in map units, stored the way node children carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Fixed,
    pub right: Fixed,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
    pub bbox: [Aabb; 2],
    pub child: [u16; 2],
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub floor_h: Fixed,
    pub ceil_h: Fixed,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    pub light: u8,
    pub special: i16,
    pub tag: i16,
}

/*------------------------ per-seg resolution ------------------------*/

/// Everything the renderer needs to know about one seg's two sides.
pub struct SegSides<'l> {
    pub line: &'l Linedef,
    pub front_side: &'l Sidedef,
    pub front: &'l Sector,
    pub back: Option<&'l Sector>,
}

impl Level {
    /// Resolve the front sidedef and both sectors of `seg`.
    ///
    /// `None` for a seg whose front sidedef is missing (malformed map);
    /// the renderer skips such segs.
    pub fn seg_sides(&self, seg: &Seg) -> Option<SegSides<'_>> {
        let line = self.linedefs.get(seg.linedef as usize)?;
        let (front_idx, back_idx) = if seg.dir == 0 {
            (line.right_sidedef, line.left_sidedef)
        } else {
            (line.left_sidedef, line.right_sidedef)
        };
        let front_side = self.sidedefs.get(front_idx? as usize)?;
        let front = self.sectors.get(front_side.sector as usize)?;
        let back = if line.flags.contains(LinedefFlags::TWO_SIDED) {
            back_idx
                .and_then(|i| self.sidedefs.get(i as usize))
                .and_then(|sd| self.sectors.get(sd.sector as usize))
        } else {
            None
        };
        Some(SegSides {
            line,
            front_side,
            front,
            back,
        })
    }
}
