//! Interactive viewer for the sample levels.
//!
//! ```bash
//! cargo run --release -- --config view.toml --width 960 --height 600
//! ```
//!
//! Arrows turn and walk, A/D strafe, PgUp/PgDn change eye height,
//! F flashes extra light, R/G toggle a red/green tint.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec3;
use log::info;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use simplelog::TermLogger;

use yadoom_sw::{
    config::RenderConfig,
    renderer::{FrameEffects, RendererExt, Scene, Software},
    world::{Camera, maps},
};

const MOVE_SPEED: f32 = 6.0;
const TURN_SPEED: f32 = 0.05;
const FLASH_LIGHT: u8 = 48;

/// CLI options handled via `clap` derive; anything given here overrides
/// the config file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// TOML render configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Horizontal field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// -v for debug, -vv for per-frame statistics
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let level = match opts.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut config = match &opts.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(w) = opts.width {
        config.width = w;
    }
    if let Some(h) = opts.height {
        config.height = h;
    }
    if let Some(fov) = opts.fov {
        config.fov_degrees = fov;
    }
    config.validate()?;
    let (w, h) = (config.width, config.height);

    let bank = maps::sample_bank()?;
    let sprites = maps::sample_sprites(&bank);
    let (level, things) = maps::demo(&bank)?;
    info!("level {}: {} segs, {} objects", level.name, level.segs.len(), things.len());

    let mut camera = Camera::from_world(Vec3::new(-200.0, 0.0, 41.0), 0.0);
    let mut effects = FrameEffects::default();
    let mut renderer = Software::new(config);

    let mut win = Window::new("yadoom software renderer", w, h, WindowOptions::default())?;
    win.set_target_fps(35);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* movement --------------------------------------------------------- */
        let mut forward = 0.0;
        let mut side = 0.0;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            forward += MOVE_SPEED;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            forward -= MOVE_SPEED;
        }
        if win.is_key_down(Key::A) {
            side -= MOVE_SPEED;
        }
        if win.is_key_down(Key::D) {
            side += MOVE_SPEED;
        }
        if win.is_key_down(Key::Left) {
            camera.turn(TURN_SPEED);
        }
        if win.is_key_down(Key::Right) {
            camera.turn(-TURN_SPEED);
        }
        if win.is_key_down(Key::PageUp) {
            camera.rise(2.0);
        }
        if win.is_key_down(Key::PageDown) {
            camera.rise(-2.0);
        }
        camera.step(forward, side);

        /* effects ---------------------------------------------------------- */
        effects.extra_light = if win.is_key_down(Key::F) { FLASH_LIGHT } else { 0 };
        if win.is_key_pressed(Key::R, KeyRepeat::No) {
            effects.tint = toggle(effects.tint, Vec3::new(1.0, 0.4, 0.4));
        }
        if win.is_key_pressed(Key::G, KeyRepeat::No) {
            effects.tint = toggle(effects.tint, Vec3::new(0.6, 1.0, 0.6));
        }

        /* draw ------------------------------------------------------------- */
        let scene = Scene {
            level: &level,
            things: &things,
            sprites: &sprites,
            textures: &bank,
            camera,
            effects,
        };
        let mut shown = Ok(());
        renderer.render_frame(w, h, &scene, |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) && acc_frames > 0 {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

fn toggle(current: Vec3, tint: Vec3) -> Vec3 {
    if current == tint { Vec3::ONE } else { tint }
}
