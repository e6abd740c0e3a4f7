use crate::math::Fixed;
use crate::world::geometry::{Aabb, Level, Node, Seg, SubsectorId, Vertex};

pub const CHILD_MASK: u16 = 0x7FFF;

pub const SUBSECTOR_BIT: u16 = 0x8000;

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Child id of the BSP root (`nodes.len()-1` in Doom).
    ///
    /// A level with a single convex region has no nodes at all; its root
    /// is then subsector 0.
    #[inline(always)]
    pub fn bsp_root(&self) -> u16 {
        match self.nodes.len() {
            0 => SUBSECTOR_BIT,
            n => (n - 1) as u16,
        }
    }

    /// Walk the BSP and return the subsector id containing `(x, y)`.
    pub fn locate_subsector(&self, x: Fixed, y: Fixed) -> SubsectorId {
        let mut child = self.bsp_root();
        while child & SUBSECTOR_BIT == 0 {
            let node = &self.nodes[child as usize];
            child = node.child[node.point_side(x, y)];
        }
        child & CHILD_MASK
    }

    /// Sector under `(x, y)`.
    pub fn sector_at(&self, x: Fixed, y: Fixed) -> Option<u16> {
        self.subsectors
            .get(self.locate_subsector(x, y) as usize)
            .map(|ss| ss.sector)
    }

    /// Endpoints of `seg`.
    #[inline]
    pub fn seg_vertices(&self, seg: &Seg) -> (Vertex, Vertex) {
        (
            self.vertices[seg.v1 as usize],
            self.vertices[seg.v2 as usize],
        )
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// 0 = *front* of splitter, 1 = *back*. Exact: the cross product is
    /// taken in 64-bit integer space on the raw 16.16 values.
    #[inline(always)]
    pub fn point_side(&self, x: Fixed, y: Fixed) -> usize {
        side_of_line(self.x, self.y, self.dx, self.dy, x, y)
    }
}

/// 0 when `(px, py)` is on the right of (or on) the directed line through
/// `(x, y)` with direction `(dx, dy)`, 1 when on its left.
#[inline(always)]
pub fn side_of_line(x: Fixed, y: Fixed, dx: Fixed, dy: Fixed, px: Fixed, py: Fixed) -> usize {
    let lhs = (px.0 as i64 - x.0 as i64) * dy.0 as i64;
    let rhs = (py.0 as i64 - y.0 as i64) * dx.0 as i64;
    if lhs >= rhs { 0 } else { 1 }
}

/// Same test against the line carrying `v1 → v2`.
#[inline(always)]
pub fn side_of_segment(v1: Vertex, v2: Vertex, px: Fixed, py: Fixed) -> usize {
    side_of_line(v1.x, v1.y, v2.x - v1.x, v2.y - v1.y, px, py)
}

// ──────────────────────────────────────────────────────────────────────────
//                       Aabb geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Aabb {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            top: Fixed::from_int(top),
            bottom: Fixed::from_int(bottom),
            left: Fixed::from_int(left),
            right: Fixed::from_int(right),
        }
    }

    pub fn contains(&self, x: Fixed, y: Fixed) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Smallest box holding every vertex in `pts`.
    pub fn around(pts: impl IntoIterator<Item = Vertex>) -> Option<Self> {
        pts.into_iter().fold(None, |acc: Option<Aabb>, v| {
            Some(match acc {
                None => Aabb {
                    top: v.y,
                    bottom: v.y,
                    left: v.x,
                    right: v.x,
                },
                Some(b) => Aabb {
                    top: b.top.max(v.y),
                    bottom: b.bottom.min(v.y),
                    left: b.left.min(v.x),
                    right: b.right.max(v.x),
                },
            })
        })
    }
}
