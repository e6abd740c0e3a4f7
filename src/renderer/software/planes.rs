//! Floor, ceiling and sky columns.
//!
//! Flats are not stepped like walls: every pixel casts its own ray onto the
//! plane, so the texel and the light both come from the true hit distance.

use glam::Vec2;

use crate::renderer::software::blit::{BlitFlags, ColumnBlit, LightMul, Target, blit_column};
use crate::renderer::software::fragments::{FlatFragment, SkyFragment, TexStep};
use crate::renderer::software::light::LightParams;
use crate::renderer::software::view::ViewContext;
use crate::world::{Texture, TextureBank};

/// Distance along the view axis at which `row` meets a plane `plane_dz`
/// above (positive) or below (negative) the eye.
#[inline(always)]
fn plane_depth(view: &ViewContext<'_>, row: usize, plane_dz: f32) -> f32 {
    let dy = row as f32 + 0.5 - view.tables.half_h;
    view.tables.y_scale * plane_dz / dy
}

/// Map position seen through column `x` at `depth`.
#[inline(always)]
fn plane_point(view: &ViewContext<'_>, x: usize, depth: f32) -> Vec2 {
    let lateral = (x as f32 + 0.5 - view.tables.half_w) * depth / view.tables.x_scale;
    view.pos.truncate() + view.forward * depth + view.right * lateral
}

#[inline(always)]
fn flat_texel(tex: &Texture, p: Vec2) -> u32 {
    let u = (p.x.floor() as i32).rem_euclid(tex.w as i32) as usize;
    let v = ((-p.y).floor() as i32).rem_euclid(tex.h as i32) as usize;
    tex.texel(u, v)
}

/// Draw one floor or ceiling column. For a ceiling the wall sits under the
/// last row; for a floor, above the first.
pub fn draw_flat_column(
    target: &mut Target<'_>,
    view: &ViewContext<'_>,
    bank: &TextureBank,
    frag: &FlatFragment,
    ceiling: bool,
) {
    let tex = bank.animated(frag.texture);
    if tex.w == 0 || tex.h == 0 || frag.height == 0 {
        return;
    }
    let x = frag.x as usize;
    let first = frag.y as usize;
    let last = first + frag.height as usize - 1;
    let wall_row = if ceiling { last } else { first };
    let plane_dz = frag.world.z - view.pos.z;
    let light = LightParams::for_level(frag.light_level);

    for y in first..=last {
        if y >= target.height {
            break;
        }
        let mut depth = plane_depth(view, y, plane_dz);
        if !(depth > 0.0) || !depth.is_finite() {
            continue;
        }
        let p = if frag.clamp_first_pixel && y == wall_row && depth > frag.depth {
            depth = frag.depth;
            frag.world.truncate()
        } else {
            plane_point(view, x, depth)
        };
        let mul = LightMul::with_tint(light.light_mul_for_dist(depth), view.tint);
        target.put(x, y, mul.apply(flat_texel(tex, p)));
    }
}

/// Draw one sky column. The texture column follows the view angle through
/// `x`, the sky wraps `repeats` times around the full circle, and nothing
/// below the scaled texture height is painted.
pub fn draw_sky_column(
    target: &mut Target<'_>,
    view: &ViewContext<'_>,
    tex: &Texture,
    frag: &SkyFragment,
    repeats: u32,
) {
    let col_h = view.tables.sky_column_height(tex.h);
    let first = frag.y as usize;
    if col_h == 0 || first >= col_h {
        return;
    }
    let rows = (first + frag.height as usize).min(col_h) - first;
    let u = view
        .column_angle(frag.x as usize)
        .wrap_to_columns(repeats, tex.w as u32);
    let step = tex.h as f32 / col_h as f32;

    blit_column(
        target,
        tex,
        &ColumnBlit {
            x: frag.x as usize,
            y: first as i32,
            height: rows as u32,
            tex_x: u as i32,
            tex_y: TexStep::new(first as f32 * step, step, rows as u32),
            light: LightMul::with_tint(1.0, view.tint),
            flags: BlitFlags::empty(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::renderer::FrameEffects;
    use crate::renderer::software::view::ViewTables;
    use crate::world::{Camera, NO_TEXTURE};
    use glam::Vec3;

    fn view_of(tables: &ViewTables, effects: FrameEffects) -> ViewContext<'_> {
        let cam = Camera::from_world(Vec3::new(0.0, 0.0, 41.0), 0.0);
        ViewContext::new(&cam, tables, effects)
    }

    fn solid_bank(colour: u32) -> (TextureBank, crate::world::TextureId) {
        let mut bank = TextureBank::default_with_checker();
        let id = bank
            .insert("FLAT", Texture::solid("FLAT", 64, 64, colour))
            .unwrap();
        (bank, id)
    }

    #[test]
    fn floor_rows_hit_the_plane() {
        let tables = ViewTables::new(320, 200, &RenderConfig::default());
        let view = view_of(&tables, FrameEffects::default());
        let row = 150;
        let depth = plane_depth(&view, row, -41.0);
        let back = view.screen_y(0.0, 1.0 / depth);
        assert!((back - (row as f32 + 0.5)).abs() < 1e-3);

        let p = plane_point(&view, 160, depth);
        assert!((p.x - depth).abs() < 1e-3);
        assert!((p.y + 0.5 * depth / tables.x_scale).abs() < 1e-3);
    }

    #[test]
    fn flat_column_is_lit_and_tinted() {
        let tables = ViewTables::new(32, 20, &RenderConfig::default());
        let effects = FrameEffects {
            extra_light: 0,
            tint: Vec3::new(1.0, 0.0, 0.0),
        };
        let view = view_of(&tables, effects);
        let (bank, id) = solid_bank(0xFF_FFFFFF);
        let mut px = vec![0u32; 32 * 20];
        let frag = FlatFragment {
            x: 5,
            y: 12,
            height: 8,
            light_level: 255,
            clamp_first_pixel: false,
            depth: 10.0,
            world: Vec3::new(10.0, 0.0, 0.0),
            texture: id,
        };
        draw_flat_column(&mut Target::new(&mut px, 32, 20), &view, &bank, &frag, false);
        for y in 12..20 {
            assert_eq!(px[y * 32 + 5], 0xFF_FF0000, "row {y}");
        }
        assert_eq!(px[11 * 32 + 5], 0);
    }

    #[test]
    fn wall_pixel_is_clamped_to_the_wall() {
        let tables = ViewTables::new(32, 20, &RenderConfig::default());
        let view = view_of(&tables, FrameEffects::default());
        let mut bank = TextureBank::default_with_checker();
        // left half red, right half blue along x
        let id = bank
            .insert(
                "HALF",
                Texture::from_fn("HALF", 64, 64, |u, _| if u < 32 { 0xFF_FF0000 } else { 0xFF_0000FF }),
            )
            .unwrap();
        let mut px = vec![0u32; 32 * 20];
        let frag = FlatFragment {
            x: 16,
            y: 10,
            height: 1,
            light_level: 255,
            clamp_first_pixel: true,
            depth: 1.0,
            world: Vec3::new(1.0, 0.0, 0.0),
            texture: id,
        };
        draw_flat_column(&mut Target::new(&mut px, 32, 20), &view, &bank, &frag, false);
        assert_eq!(px[10 * 32 + 16], 0xFF_FF0000);
    }

    #[test]
    fn sky_stops_at_scaled_height() {
        let tables = ViewTables::new(32, 400, &RenderConfig::default());
        let view = view_of(&tables, FrameEffects::default());
        let sky = Texture::solid("SKY", 256, 128, 0xFF_3366CC);
        let col_h = tables.sky_column_height(sky.h);
        assert_eq!(col_h, 320);

        let mut px = vec![0u32; 32 * 400];
        let frag = SkyFragment {
            x: 3,
            y: 0,
            height: 400,
        };
        draw_sky_column(&mut Target::new(&mut px, 32, 400), &view, &sky, &frag, 4);
        assert_eq!(px[3], 0xFF_3366CC);
        assert_eq!(px[(col_h - 1) * 32 + 3], 0xFF_3366CC);
        assert_eq!(px[col_h * 32 + 3], 0);
    }

    #[test]
    fn missing_flat_still_draws() {
        let tables = ViewTables::new(32, 20, &RenderConfig::default());
        let view = view_of(&tables, FrameEffects::default());
        let bank = TextureBank::default_with_checker();
        let mut px = vec![0u32; 32 * 20];
        let frag = FlatFragment {
            x: 0,
            y: 15,
            height: 5,
            light_level: 255,
            clamp_first_pixel: false,
            depth: 10.0,
            world: Vec3::ZERO,
            texture: NO_TEXTURE,
        };
        draw_flat_column(&mut Target::new(&mut px, 32, 20), &view, &bank, &frag, false);
        assert!((15..20).all(|y| px[y * 32] != 0));
    }
}
