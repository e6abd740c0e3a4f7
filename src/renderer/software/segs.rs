//! Seg → fragment conversion.
//!
//! Each visible seg is projected once, then walked column by column:
//! ceiling above it, wall sections, floor below it, all clipped to the
//! column's open range. The range is then narrowed (or closed) and the
//! seg is recorded as an occluder for sprite clipping.

use crate::renderer::software::fragments::{FlatFragment, SkyFragment, TexStep, WallFragment};
use crate::renderer::software::light::LightParams;
use crate::renderer::software::occlusion::Bounds;
use crate::renderer::software::projection::{ColumnSample, Edge, project_seg};
use crate::renderer::software::renderer::{Frame, PlaneKey};
use crate::renderer::software::view::ViewContext;
use crate::renderer::Scene;
use crate::world::{LinedefFlags, LinedefId, Sector, SegmentId, TextureBank, TextureId};

/// What a seg puts on screen, decided once per seg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegEmit {
    pub ceiling: bool,
    pub floor: bool,
    /// Two-sided only: the ceilings differ, so the top of the opening is
    /// a silhouette.
    pub upper_occluder: bool,
    /// Two-sided only: the floors differ.
    pub lower_occluder: bool,
    /// The silhouette is the back ceiling (lower than the front one); an
    /// upper wall section is visible.
    pub upper_uses_back_z: bool,
    /// The silhouette is the back floor (higher than the front one); a
    /// lower wall section is visible.
    pub lower_uses_back_z: bool,
    pub two_sided: bool,
    /// Nothing behind the seg shows through: one-sided walls and closed
    /// doors.
    pub closes: bool,
    pub sky_ceiling: bool,
    /// Upper section between two sky sectors: drawn as sky.
    pub sky_upper: bool,
}

impl SegEmit {
    pub fn decide(front: &Sector, back: Option<&Sector>, eye_z: f32, bank: &TextureBank) -> Self {
        let f_floor = front.floor_h.to_f32();
        let f_ceil = front.ceil_h.to_f32();
        let sky_ceiling = bank.is_sky_flat(front.ceil_tex);

        let mut emit = SegEmit {
            ceiling: f_ceil > eye_z,
            floor: f_floor < eye_z,
            sky_ceiling,
            ..SegEmit::default()
        };

        let Some(back) = back else {
            emit.closes = true;
            return emit;
        };

        let b_floor = back.floor_h.to_f32();
        let b_ceil = back.ceil_h.to_f32();

        emit.two_sided = true;
        emit.upper_occluder = b_ceil != f_ceil;
        emit.lower_occluder = b_floor != f_floor;
        emit.upper_uses_back_z = b_ceil < f_ceil;
        emit.lower_uses_back_z = b_floor > f_floor;
        emit.sky_upper = sky_ceiling && bank.is_sky_flat(back.ceil_tex);
        emit.closes = b_ceil <= f_floor || b_floor >= f_ceil || b_ceil <= b_floor;
        emit
    }

    /// True when this seg narrows the columns it covers.
    #[inline]
    pub fn occludes(&self) -> bool {
        self.closes || self.upper_occluder || self.lower_occluder
    }
}

/// A projected seg, kept for the rest of the frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawSeg {
    pub seg: SegmentId,
    pub line: LinedefId,
    pub edge: Edge,

    /// World heights: front sector top/bottom, back sector top/bottom
    /// (equal to the front ones for one-sided segs).
    pub front_top_z: f32,
    pub front_bottom_z: f32,
    pub back_top_z: f32,
    pub back_bottom_z: f32,

    pub emit: SegEmit,
    pub light_level: u8,
    pub light: LightParams,

    /// Resolved (animated) textures of each wall section.
    pub mid_tex: TextureId,
    pub upper_tex: TextureId,
    pub lower_tex: TextureId,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,

    /// World height at which v = 0 for each section, texture y offset
    /// folded in.
    pub mid_anchor: f32,
    pub upper_anchor: f32,
    pub lower_anchor: f32,

    /// Columns that produced at least one wall fragment.
    pub wall_columns: u32,
}

/// First pixel row whose centre lies at or below screen y `y`.
#[inline(always)]
fn row_at(y: f32) -> i32 {
    (y - 0.5).ceil().clamp(-1.0, i16::MAX as f32) as i32
}

#[inline(always)]
fn to_bound(row: i32, height: usize) -> i16 {
    row.clamp(-1, height as i32) as i16
}

/// World height seen at the centre of `row` for a surface at `inv_z`.
#[inline(always)]
fn world_z_at_row(view: &ViewContext<'_>, row: i32, inv_z: f32) -> f32 {
    view.pos.z + (row as f32 + 0.5 - view.tables.half_h) / (view.tables.y_scale * inv_z)
}

impl Frame {
    /// Project `seg_id` and emit its columns.
    pub fn add_seg(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>, seg_id: SegmentId) {
        self.stats.segs_submitted += 1;
        let level = scene.level;
        let bank = scene.textures;
        let Some(seg) = level.segs.get(seg_id as usize) else {
            return;
        };
        let Some(sides) = level.seg_sides(seg) else {
            return;
        };
        let (v1, v2) = level.seg_vertices(seg);
        let u_start = (seg.offset + sides.front_side.x_off).to_f32();
        let Some(edge) = project_seg(view, v1, v2, u_start) else {
            return;
        };
        self.stats.segs_drawn += 1;

        let front = sides.front;
        let back = sides.back;
        let emit = SegEmit::decide(front, back, view.pos.z, bank);

        let front_top_z = front.ceil_h.to_f32();
        let front_bottom_z = front.floor_h.to_f32();
        let (back_top_z, back_bottom_z) = back
            .map(|b| (b.ceil_h.to_f32(), b.floor_h.to_f32()))
            .unwrap_or((front_top_z, front_bottom_z));

        let side = sides.front_side;
        let pegging = sides.line.flags;
        let y_off = side.y_off.to_f32();
        let tex_h = |id: TextureId| bank.animated(id).h as f32;

        let mid_anchor = if pegging.contains(LinedefFlags::LOWER_UNPEGGED) {
            front_bottom_z + tex_h(side.middle)
        } else {
            front_top_z
        };
        let upper_anchor = if pegging.contains(LinedefFlags::UPPER_UNPEGGED) {
            front_top_z
        } else {
            back_top_z + tex_h(side.upper)
        };
        let lower_anchor = if pegging.contains(LinedefFlags::LOWER_UNPEGGED) {
            front_top_z
        } else {
            back_bottom_z
        };

        let light_level = view.light_level(front.light);
        let mut ds = DrawSeg {
            seg: seg_id,
            line: seg.linedef,
            edge,
            front_top_z,
            front_bottom_z,
            back_top_z,
            back_bottom_z,
            emit,
            light_level,
            light: LightParams::for_level(light_level),
            mid_tex: bank.resolve(side.middle),
            upper_tex: bank.resolve(side.upper),
            lower_tex: bank.resolve(side.lower),
            floor_tex: bank.resolve(front.floor_tex),
            ceil_tex: bank.resolve(front.ceil_tex),
            mid_anchor: mid_anchor + y_off,
            upper_anchor: upper_anchor + y_off,
            lower_anchor: lower_anchor + y_off,
            wall_columns: 0,
        };

        for x in edge.x_l..=edge.x_r {
            self.emit_seg_column(view, &mut ds, x);
        }

        if ds.wall_columns > 0 {
            self.stats.wall_groups += 1;
        }
        self.draw_segs.push(ds);
    }

    /// Emit one column of `ds` and update the column's clip state.
    pub fn emit_seg_column(&mut self, view: &ViewContext<'_>, ds: &mut DrawSeg, x: i32) {
        let Ok(col) = usize::try_from(x) else {
            return;
        };
        let Some(&clip) = self.seg_clip.get(col) else {
            return;
        };
        if clip.is_full() {
            return;
        }

        let s = ds.edge.sample(x);
        if !(s.inv_z > 0.0) || !s.depth.is_finite() {
            return;
        }
        let row = |z: f32| row_at(view.screen_y(z, s.inv_z));
        let emit = ds.emit;
        let light = ds.light.light_mul_for_dist(s.depth);

        let top_row = row(ds.front_top_z);
        let bottom_row = row(ds.front_bottom_z);
        let open_first = clip.top as i32 + 1;
        let open_last = clip.bottom as i32 - 1;
        let mut walls = false;

        // ceiling: from the top of the open range down to the wall
        if emit.ceiling {
            let last = (top_row - 1).min(open_last);
            if emit.sky_ceiling {
                self.push_sky_rows(col, open_first, last);
            } else {
                self.push_flat_rows(ds, &s, col, open_first, last, true, last == top_row - 1);
            }
        }

        if !emit.two_sided {
            let first = top_row.max(open_first);
            let last = (bottom_row - 1).min(open_last);
            let wall = WallRows::new(first, last, ds.mid_tex, ds.mid_anchor);
            walls |= self.push_wall_rows(view, &s, col, wall, light);
        } else {
            if emit.upper_uses_back_z {
                let first = top_row.max(open_first);
                let last = (row(ds.back_top_z) - 1).min(bottom_row - 1).min(open_last);
                if emit.sky_upper {
                    self.push_sky_rows(col, first, last);
                } else {
                    let wall = WallRows::new(first, last, ds.upper_tex, ds.upper_anchor);
                    walls |= self.push_wall_rows(view, &s, col, wall, light);
                }
            }
            if emit.lower_uses_back_z {
                let first = row(ds.back_bottom_z).max(top_row).max(open_first);
                let last = (bottom_row - 1).min(open_last);
                let wall = WallRows::new(first, last, ds.lower_tex, ds.lower_anchor);
                walls |= self.push_wall_rows(view, &s, col, wall, light);
            }
        }
        if walls {
            ds.wall_columns += 1;
        }

        // floor: from the wall down to the bottom of the open range
        if emit.floor {
            let first = bottom_row.max(open_first);
            self.push_flat_rows(ds, &s, col, first, open_last, false, first == bottom_row);
        }

        // narrow or close the column
        let own = if emit.closes {
            Bounds::CLOSED
        } else {
            let top = if emit.upper_uses_back_z {
                row(ds.back_top_z)
            } else {
                top_row
            } - 1;
            let bottom = if emit.lower_uses_back_z {
                row(ds.back_bottom_z)
            } else {
                bottom_row
            };
            Bounds {
                top: to_bound(top, self.height),
                bottom: to_bound(bottom, self.height),
            }
        };
        let narrowed = clip.intersect(own);
        self.seg_clip[col] = narrowed;
        if narrowed.is_full() {
            self.full_cols += 1;
        }

        if emit.occludes() && !self.occluders.insert(col, s.depth, ds.line, own, emit.closes) {
            self.stats.untracked_occluders += 1;
        }
    }

    fn push_wall_rows(
        &mut self,
        view: &ViewContext<'_>,
        s: &ColumnSample,
        x: usize,
        wall: WallRows,
        light: f32,
    ) -> bool {
        if wall.first > wall.last {
            return false;
        }
        let height = (wall.last - wall.first + 1) as u32;
        let v_start = wall.anchor - world_z_at_row(view, wall.first, s.inv_z);
        let v_step = -1.0 / (view.tables.y_scale * s.inv_z);
        self.fragments.push_wall(WallFragment {
            x: x as u16,
            y: wall.first as u16,
            height: height as u16,
            tex_x: s.u.floor() as i32,
            tex_y: TexStep::new(v_start, v_step, height),
            light,
            texture: wall.texture,
            depth: s.depth,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn push_flat_rows(
        &mut self,
        ds: &DrawSeg,
        s: &ColumnSample,
        x: usize,
        first: i32,
        last: i32,
        ceiling: bool,
        touches_wall: bool,
    ) {
        if first > last {
            return;
        }
        let (z, texture) = if ceiling {
            (ds.front_top_z, ds.ceil_tex)
        } else {
            (ds.front_bottom_z, ds.floor_tex)
        };
        let frag = FlatFragment {
            x: x as u16,
            y: first as u16,
            height: (last - first + 1) as u16,
            light_level: ds.light_level,
            clamp_first_pixel: touches_wall,
            depth: s.depth,
            world: s.world.extend(z),
            texture,
        };
        let pushed = if ceiling {
            self.fragments.push_ceiling(frag)
        } else {
            self.fragments.push_floor(frag)
        };
        if pushed {
            self.note_plane(PlaneKey {
                ceiling,
                height: z.to_bits(),
                texture,
                light_level: ds.light_level,
            });
        }
    }

    fn push_sky_rows(&mut self, x: usize, first: i32, last: i32) {
        if first > last {
            return;
        }
        if self.fragments.push_sky(SkyFragment {
            x: x as u16,
            y: first as u16,
            height: (last - first + 1) as u16,
        }) {
            self.stats.sky_columns += 1;
        }
    }
}

/// Rows and texture of one wall section in one column.
#[derive(Clone, Copy)]
struct WallRows {
    first: i32,
    last: i32,
    texture: TextureId,
    anchor: f32,
}

impl WallRows {
    #[inline]
    fn new(first: i32, last: i32, texture: TextureId, anchor: f32) -> Self {
        Self {
            first,
            last,
            texture,
            anchor,
        }
    }
}
