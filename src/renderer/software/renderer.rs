use log::{debug, info, trace, warn};

use crate::{
    config::RenderConfig,
    renderer::{
        Renderer, Rgba, Scene,
        software::{
            blit::{BlitFlags, ColumnBlit, LightMul, Target, blit_column},
            fragments::FragmentLists,
            occlusion::{Bounds, OccludingColumns},
            planes::{draw_flat_column, draw_sky_column},
            segs::DrawSeg,
            sprites::DrawSprite,
            view::{ViewContext, ViewTables},
        },
    },
    world::TextureId,
};

/// Counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub leaves_visited: usize,
    pub segs_submitted: usize,
    pub segs_drawn: usize,
    /// Segs that produced at least one wall column.
    pub wall_groups: usize,
    /// Distinct (height, texture, light) floor planes.
    pub floor_groups: usize,
    pub ceiling_groups: usize,
    pub sky_columns: usize,
    pub sprites_submitted: usize,
    pub sprites_drawn: usize,
    pub sprite_fragments: usize,
    pub dropped_fragments: usize,
    pub dropped_sprites: usize,
    /// Occluders that did not fit their column's table.
    pub untracked_occluders: usize,
}

/// Identity of a floor or ceiling plane, used to count plane groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneKey {
    pub ceiling: bool,
    /// `f32::to_bits` of the plane height.
    pub height: u32,
    pub texture: TextureId,
    pub light_level: u8,
}

/*───────────────────────────────────────────────────────────────────────*/
/*                           Per-frame arena                             */
/*───────────────────────────────────────────────────────────────────────*/

/// Everything one frame builds before rasterisation. Allocated once and
/// reused; `reset` only clears.
#[derive(Default)]
pub struct Frame {
    pub(crate) width: usize,
    pub(crate) height: usize,

    pub(crate) seg_clip: Vec<Bounds>,
    /// Columns whose `seg_clip` is closed.
    pub(crate) full_cols: usize,
    pub(crate) occluders: OccludingColumns,
    pub(crate) fragments: FragmentLists,
    pub(crate) draw_segs: Vec<DrawSeg>,
    pub(crate) draw_sprites: Vec<DrawSprite>,

    /// Frame number each object was last submitted in.
    pub(crate) sprite_marks: Vec<u32>,
    pub(crate) valid_count: u32,
    pub(crate) max_sprites: usize,
    pub(crate) sprite_z_offset: f32,

    pub(crate) plane_keys: Vec<PlaneKey>,
    pub(crate) stats: FrameStats,
}

impl Frame {
    /// Prepare for a frame of `tables`' size over `things` objects.
    pub fn reset(&mut self, tables: &ViewTables, config: &RenderConfig, things: usize) {
        self.width = tables.width;
        self.height = tables.height;

        self.seg_clip.clear();
        self.seg_clip.resize(self.width, Bounds::open(self.height));
        self.full_cols = 0;
        self.occluders.reset(self.width);
        self.fragments
            .reset(self.width * config.fragment_budget_per_column);
        self.draw_segs.clear();
        self.draw_sprites.clear();
        self.draw_sprites.reserve(config.max_draw_sprites);
        self.plane_keys.clear();
        self.stats = FrameStats::default();

        self.valid_count = self.valid_count.wrapping_add(1);
        if self.valid_count == 0 {
            self.sprite_marks.fill(0);
            self.valid_count = 1;
        }
        if self.sprite_marks.len() < things {
            self.sprite_marks.resize(things, 0);
        }
        self.max_sprites = config.max_draw_sprites;
        self.sprite_z_offset = config.sprite_extra_z_offset;
    }

    /// Visibility and fragment generation for `scene`.
    pub fn build(&mut self, view: &ViewContext<'_>, scene: &Scene<'_>) {
        self.walk_bsp(view, scene);
        self.build_sprite_fragments(view, scene);

        self.stats.dropped_fragments = self.fragments.dropped();
        if self.stats.dropped_fragments > 0 || self.stats.dropped_sprites > 0 {
            debug!(
                target: "renderer",
                "frame over capacity: {} fragments, {} sprites dropped",
                self.stats.dropped_fragments, self.stats.dropped_sprites
            );
        }
    }

    /// Blit every fragment: sky, walls, floors, ceilings, then sprites far
    /// to near.
    pub fn rasterize(
        &self,
        target: &mut Target<'_>,
        view: &ViewContext<'_>,
        scene: &Scene<'_>,
        sky_repeats: u32,
    ) {
        let bank = scene.textures;
        let lists = &self.fragments;

        if let Some(sky) = bank.sky_texture().map(|id| bank.animated(id)) {
            for f in &lists.skies {
                draw_sky_column(target, view, sky, f, sky_repeats);
            }
        }

        for f in &lists.walls {
            blit_column(
                target,
                bank.texture_or_missing(f.texture),
                &ColumnBlit {
                    x: f.x as usize,
                    y: f.y as i32,
                    height: f.height as u32,
                    tex_x: f.tex_x,
                    tex_y: f.tex_y,
                    light: LightMul::with_tint(f.light, view.tint),
                    flags: BlitFlags::H_WRAP | BlitFlags::V_WRAP,
                },
            );
        }

        for f in &lists.floors {
            draw_flat_column(target, view, bank, f, false);
        }
        for f in &lists.ceilings {
            draw_flat_column(target, view, bank, f, true);
        }

        for f in &lists.sprites {
            let mut flags = BlitFlags::MASKED;
            flags.set(BlitFlags::FLIP_H, f.flip);
            flags.set(BlitFlags::STIPPLE, f.shadow);
            blit_column(
                target,
                bank.texture_or_missing(f.texture),
                &ColumnBlit {
                    x: f.x as usize,
                    y: f.y as i32,
                    height: f.height as u32,
                    tex_x: f.tex_x,
                    tex_y: f.tex_y,
                    light: LightMul::with_tint(f.light, view.tint),
                    flags,
                },
            );
        }
    }

    /// No column accepts any more pixels.
    #[inline]
    pub fn screen_full(&self) -> bool {
        self.full_cols >= self.width
    }

    /// True if a column in `from..to` is still open.
    pub fn any_open_column(&self, from: usize, to: usize) -> bool {
        let to = to.min(self.seg_clip.len());
        from < to && self.seg_clip[from..to].iter().any(|b| !b.is_full())
    }

    pub(crate) fn note_plane(&mut self, key: PlaneKey) {
        if self.plane_keys.contains(&key) {
            return;
        }
        self.plane_keys.push(key);
        if key.ceiling {
            self.stats.ceiling_groups += 1;
        } else {
            self.stats.floor_groups += 1;
        }
    }

    pub fn fragments(&self) -> &FragmentLists {
        &self.fragments
    }

    pub fn occluders(&self) -> &OccludingColumns {
        &self.occluders
    }

    pub fn draw_segs(&self) -> &[DrawSeg] {
        &self.draw_segs
    }

    /// Projected sprites, nearest first.
    pub fn draw_sprites(&self) -> &[DrawSprite] {
        &self.draw_sprites
    }

    pub fn seg_clip(&self) -> &[Bounds] {
        &self.seg_clip
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column renderer: BSP front-to-back, per-column clipping, no depth
/// buffer.
pub struct Software {
    config: RenderConfig,
    tables: ViewTables,
    scratch: Vec<Rgba>,
    frame: Frame,
}

impl Default for Software {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Software {
    /// Settings that fail validation are still accepted; the math tables
    /// fall back to usable values for them.
    pub fn new(config: RenderConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!(target: "renderer", "{e}; out-of-range settings will be clamped");
        }
        Self {
            config,
            tables: ViewTables::default(),
            scratch: Vec::new(),
            frame: Frame::default(),
        }
    }

    /// Rebuild the projection and column tables for a new resolution.
    pub fn init_math_tables(&mut self, width: usize, height: usize) {
        self.tables = ViewTables::new(width, height, &self.config);
        self.scratch.resize(width * height, 0);
        info!(
            target: "renderer",
            "math tables rebuilt: {width}x{height}, fov {:.1}, aspect {:.3}",
            self.config.fov_degrees, self.tables.aspect
        );
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn tables(&self) -> &ViewTables {
        &self.tables
    }

    /// State of the last frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn stats(&self) -> &FrameStats {
        &self.frame.stats
    }

    /// The frame-buffer as last drawn.
    pub fn pixels(&self) -> &[Rgba] {
        &self.scratch
    }
}

impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.tables.width || h != self.tables.height || self.scratch.len() != w * h {
            self.init_math_tables(w, h);
        }
        self.scratch.fill(self.config.clear_colour);
    }

    fn draw_level(&mut self, scene: &Scene<'_>) {
        let (w, h) = (self.tables.width, self.tables.height);
        if w == 0 || h == 0 {
            return;
        }
        let view = ViewContext::new(&scene.camera, &self.tables, scene.effects);

        self.frame.reset(&self.tables, &self.config, scene.things.len());
        self.frame.build(&view, scene);

        let mut target = Target::new(&mut self.scratch, w, h);
        self.frame
            .rasterize(&mut target, &view, scene, self.config.sky_repeats);

        trace!(target: "renderer", "{:?}", self.frame.stats);
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.tables.width, self.tables.height);
    }
}
