//! Renderer configuration.
//!
//! Read from a TOML file; every key is optional and falls back to the
//! defaults below. The viewer layers its command-line flags on top.

use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::renderer::Rgba;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view.
    pub fov_degrees: f32,
    /// Width/height ratio used by the projection; the view's own ratio
    /// when unset.
    pub aspect_ratio: Option<f32>,
    pub z_near: f32,
    pub z_far: f32,
    pub max_draw_sprites: usize,
    /// Each fragment list holds `width * fragment_budget_per_column`.
    pub fragment_budget_per_column: usize,
    /// How many times the sky wraps around a full turn.
    pub sky_repeats: u32,
    /// Added to every sprite's height on screen.
    pub sprite_extra_z_offset: f32,
    pub clear_colour: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            fov_degrees: 90.0,
            aspect_ratio: None,
            z_near: 1.0,
            z_far: 16385.0,
            max_draw_sprites: 128,
            fragment_budget_per_column: 64,
            sky_repeats: 4,
            sprite_extra_z_offset: 4.0,
            clear_colour: 0xFF_202020,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: RenderConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = Self::from_toml_str(&fs::read_to_string(path)?)?;
        info!(target: "config", "loaded {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees {} outside (0, 180)",
                self.fov_degrees
            )));
        }
        if !(self.z_near > 0.0 && self.z_near < self.z_far) {
            return Err(ConfigError::Invalid(format!(
                "need 0 < z_near < z_far, got {} / {}",
                self.z_near, self.z_far
            )));
        }
        if let Some(a) = self.aspect_ratio {
            if !(a > 0.0 && a.is_finite()) {
                return Err(ConfigError::Invalid(format!("aspect_ratio {a}")));
            }
        }
        if self.sky_repeats == 0 {
            return Err(ConfigError::Invalid("sky_repeats must be at least 1".into()));
        }
        Ok(())
    }
}
