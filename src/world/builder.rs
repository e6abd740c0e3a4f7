//! Programmatic level construction, standing in for a map loader.
//!
//! Ids are handed out in insertion order; `build` checks every cross
//! reference once so the renderer can index the arenas directly.

use std::ops::Range;

use crate::math::Fixed;
use crate::world::bsp::{CHILD_MASK, SUBSECTOR_BIT};
use crate::world::geometry::{
    Aabb, Level, Linedef, LinedefFlags, LinedefId, Node, NodeId, Sector, SectorId, Seg,
    SegmentId, Sidedef, SidedefId, Subsector, SubsectorId, Vertex, VertexId,
};
use crate::world::texture::{NO_TEXTURE, TextureId};

/// Integrity problems found while assembling a level.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no subsectors")]
    Empty,

    #[error("{what} {index} references missing {target} {id}")]
    Dangling {
        what: &'static str,
        index: usize,
        target: &'static str,
        id: usize,
    },

    #[error("subsector {0} has no segs")]
    EmptySubsector(usize),

    #[error("seg {0} has no front sidedef")]
    NoFrontSide(usize),

    #[error("node {0} child {1:#06x} is not below it in the tree")]
    Cycle(usize, u16),
}

/// Textures on one sidedef.
#[derive(Clone, Copy, Debug, Default)]
pub struct SideTextures {
    pub upper: TextureId,
    pub middle: TextureId,
    pub lower: TextureId,
}

impl SideTextures {
    pub fn middle(tex: TextureId) -> Self {
        Self {
            upper: NO_TEXTURE,
            middle: tex,
            lower: NO_TEXTURE,
        }
    }

    pub fn steps(upper: TextureId, lower: TextureId) -> Self {
        Self {
            upper,
            middle: NO_TEXTURE,
            lower,
        }
    }
}

#[derive(Default)]
pub struct LevelBuilder {
    level: Level,
}

impl LevelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            level: Level {
                name: name.to_string(),
                ..Level::default()
            },
        }
    }

    pub fn vertex(&mut self, x: i32, y: i32) -> VertexId {
        self.level.vertices.push(Vertex::new(x, y));
        (self.level.vertices.len() - 1) as VertexId
    }

    pub fn sector(
        &mut self,
        floor_h: i32,
        ceil_h: i32,
        floor_tex: TextureId,
        ceil_tex: TextureId,
        light: u8,
    ) -> SectorId {
        self.level.sectors.push(Sector {
            floor_h: Fixed::from_int(floor_h),
            ceil_h: Fixed::from_int(ceil_h),
            floor_tex,
            ceil_tex,
            light,
            special: 0,
            tag: 0,
        });
        (self.level.sectors.len() - 1) as SectorId
    }

    pub fn sidedef(&mut self, sector: SectorId, tex: SideTextures) -> SidedefId {
        self.level.sidedefs.push(Sidedef {
            x_off: Fixed::ZERO,
            y_off: Fixed::ZERO,
            upper: tex.upper,
            lower: tex.lower,
            middle: tex.middle,
            sector,
        });
        (self.level.sidedefs.len() - 1) as SidedefId
    }

    pub fn linedef(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        flags: LinedefFlags,
        right: Option<SidedefId>,
        left: Option<SidedefId>,
    ) -> LinedefId {
        self.level.linedefs.push(Linedef {
            v1,
            v2,
            flags,
            special: 0,
            tag: 0,
            right_sidedef: right,
            left_sidedef: left,
        });
        (self.level.linedefs.len() - 1) as LinedefId
    }

    /// Wall seen only from its right side.
    pub fn one_sided(&mut self, v1: VertexId, v2: VertexId, side: SidedefId) -> LinedefId {
        self.linedef(v1, v2, LinedefFlags::IMPASSABLE, Some(side), None)
    }

    /// Opening between the sector of `right` and the sector of `left`.
    pub fn two_sided(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        right: SidedefId,
        left: SidedefId,
    ) -> LinedefId {
        self.linedef(v1, v2, LinedefFlags::TWO_SIDED, Some(right), Some(left))
    }

    /// Seg covering the whole of `linedef`; `dir` 1 walks it backwards.
    pub fn seg(&mut self, linedef: LinedefId, dir: u16) -> SegmentId {
        let (v1, v2) = match self.level.linedefs.get(linedef as usize) {
            Some(ld) if dir == 0 => (ld.v1, ld.v2),
            Some(ld) => (ld.v2, ld.v1),
            None => (VertexId::MAX, VertexId::MAX),
        };
        self.level.segs.push(Seg {
            v1,
            v2,
            linedef,
            dir,
            offset: Fixed::ZERO,
        });
        (self.level.segs.len() - 1) as SegmentId
    }

    /// Id the next `seg` call will hand out.
    pub fn segs_len(&self) -> SegmentId {
        self.level.segs.len() as SegmentId
    }

    /// Convex leaf made of `segs`; its sector is taken from the first
    /// seg's front side when the level is built.
    pub fn subsector(&mut self, segs: Range<SegmentId>) -> u16 {
        self.level.subsectors.push(Subsector {
            seg_count: segs.end.saturating_sub(segs.start),
            first_seg: segs.start,
            sector: SectorId::MAX,
        });
        SUBSECTOR_BIT | (self.level.subsectors.len() - 1) as SubsectorId
    }

    /// Partition line through `(x, y)` along `(dx, dy)`. `front` holds the
    /// right-hand side, `back` the left; each is `(child id, bounds)`.
    pub fn node(
        &mut self,
        (x, y): (i32, i32),
        (dx, dy): (i32, i32),
        front: (u16, Aabb),
        back: (u16, Aabb),
    ) -> NodeId {
        self.level.nodes.push(Node {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
            dx: Fixed::from_int(dx),
            dy: Fixed::from_int(dy),
            bbox: [front.1, back.1],
            child: [front.0, back.0],
        });
        (self.level.nodes.len() - 1) as NodeId
    }

    /// Validate every reference and resolve subsector sectors.
    pub fn build(mut self) -> Result<Level, LevelError> {
        let lvl = &self.level;
        if lvl.subsectors.is_empty() {
            return Err(LevelError::Empty);
        }

        let dangling = |what, index, target, id: usize| LevelError::Dangling {
            what,
            index,
            target,
            id,
        };

        for (i, sd) in lvl.sidedefs.iter().enumerate() {
            if sd.sector as usize >= lvl.sectors.len() {
                return Err(dangling("sidedef", i, "sector", sd.sector as usize));
            }
        }
        for (i, ld) in lvl.linedefs.iter().enumerate() {
            for v in [ld.v1, ld.v2] {
                if v as usize >= lvl.vertices.len() {
                    return Err(dangling("linedef", i, "vertex", v as usize));
                }
            }
            for sd in [ld.right_sidedef, ld.left_sidedef].into_iter().flatten() {
                if sd as usize >= lvl.sidedefs.len() {
                    return Err(dangling("linedef", i, "sidedef", sd as usize));
                }
            }
        }
        for (i, seg) in lvl.segs.iter().enumerate() {
            if seg.linedef as usize >= lvl.linedefs.len() {
                return Err(dangling("seg", i, "linedef", seg.linedef as usize));
            }
            if lvl.seg_sides(seg).is_none() {
                return Err(LevelError::NoFrontSide(i));
            }
        }

        let mut sectors = Vec::with_capacity(lvl.subsectors.len());
        for (i, ss) in lvl.subsectors.iter().enumerate() {
            if ss.seg_count == 0 {
                return Err(LevelError::EmptySubsector(i));
            }
            let last = ss.first_seg as usize + ss.seg_count as usize;
            if last > lvl.segs.len() {
                return Err(dangling("subsector", i, "seg", last - 1));
            }
            let first = &lvl.segs[ss.first_seg as usize];
            let sector = lvl
                .seg_sides(first)
                .map(|s| s.front_side.sector)
                .ok_or(LevelError::NoFrontSide(ss.first_seg as usize))?;
            sectors.push(sector);
        }

        for (i, node) in lvl.nodes.iter().enumerate() {
            for child in node.child {
                let idx = (child & CHILD_MASK) as usize;
                if child & SUBSECTOR_BIT != 0 {
                    if idx >= lvl.subsectors.len() {
                        return Err(dangling("node", i, "subsector", idx));
                    }
                } else if idx >= i {
                    return Err(LevelError::Cycle(i, child));
                }
            }
        }

        for (ss, sector) in self.level.subsectors.iter_mut().zip(sectors) {
            ss.sector = sector;
        }
        Ok(self.level)
    }
}
