// Format-agnostic repository of textures handed over by the asset loader.
// The renderer and world logic interact through `TextureId` only.

use std::collections::HashMap;

use crate::renderer::Rgba;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Texel value that masked (sprite) blits leave unwritten.
pub const TRANSPARENT_PIXEL: Rgba = 0x0000_0000;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in **column-major**
/// order, so one wall or sprite column is a contiguous slice.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        Texture::checker("CHECKER", 8, 8, 0xFF_A0A0A0, 0xFF_404040)
    }
}

impl Texture {
    /// Build a texture by evaluating `f(u, v)` for every texel.
    pub fn from_fn<F>(name: &str, w: usize, h: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Rgba,
    {
        let mut pixels = Vec::with_capacity(w * h);
        for u in 0..w {
            for v in 0..h {
                pixels.push(f(u, v));
            }
        }
        Texture {
            name: name.to_string(),
            w,
            h,
            pixels,
        }
    }

    pub fn solid(name: &str, w: usize, h: usize, colour: Rgba) -> Self {
        Self::from_fn(name, w, h, |_, _| colour)
    }

    /// One-texel checkerboard of `a`/`b`.
    pub fn checker(name: &str, w: usize, h: usize, a: Rgba, b: Rgba) -> Self {
        Self::from_fn(name, w, h, |u, v| if (u ^ v) & 1 == 0 { a } else { b })
    }

    /// Contiguous texels of column `u` (caller wraps/clamps `u`).
    #[inline(always)]
    pub fn column(&self, u: usize) -> &[Rgba] {
        &self.pixels[u * self.h..(u + 1) * self.h]
    }

    #[inline(always)]
    pub fn texel(&self, u: usize, v: usize) -> Rgba {
        self.pixels[u * self.h + v]
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Texture has no texels, or its pixel vector does not match w×h.
    #[error("texture `{0}` has inconsistent dimensions")]
    BadSize(String),
}

/// Ceiling flat that means "open sky" plus the texture drawn there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sky {
    flat: TextureId,
    texture: TextureId,
}

/// A format-agnostic cache of wall textures, flats and sprite patches.
///
/// * Does **not** know about WADs or PNG; that is the loader’s job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
/// * Every id carries an *animated alias*: the id actually displayed. It
///   starts out pointing at itself; animation code re-points it between
///   frames.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
    anim: Vec<TextureId>,
    sky: Option<Sky>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
            anim: vec![NO_TEXTURE],
            sky: None,
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow by id; unknown ids fall back to the checkerboard.
    #[inline]
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data
            .get(id as usize)
            .unwrap_or(&self.data[NO_TEXTURE as usize])
    }

    /// The id displayed for `id` this frame (animated alias).
    #[inline]
    pub fn resolve(&self, id: TextureId) -> TextureId {
        self.anim.get(id as usize).copied().unwrap_or(NO_TEXTURE)
    }

    /// Texture displayed for `id`, following the animated alias.
    #[inline]
    pub fn animated(&self, id: TextureId) -> &Texture {
        self.texture_or_missing(self.resolve(id))
    }

    /// True if `flat` is the ceiling flat that opens onto the sky.
    #[inline]
    pub fn is_sky_flat(&self, flat: TextureId) -> bool {
        self.sky.is_some_and(|s| s.flat == flat)
    }

    /// Texture drawn for the sky, if one is registered.
    pub fn sky_texture(&self) -> Option<TextureId> {
        self.sky.map(|s| s.texture)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`) or the pixel
    ///   vector does not match the dimensions (`BadSize`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        if tex.w == 0 || tex.h == 0 || tex.pixels.len() != tex.w * tex.h {
            return Err(TextureError::BadSize(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.anim.push(id);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Display `shown` wherever `id` is referenced.
    pub fn set_anim_alias(&mut self, id: TextureId, shown: TextureId) -> Result<(), TextureError> {
        if shown as usize >= self.data.len() {
            return Err(TextureError::BadId(shown));
        }
        let slot = self
            .anim
            .get_mut(id as usize)
            .ok_or(TextureError::BadId(id))?;
        *slot = shown;
        Ok(())
    }

    /// Register `flat` as the sky ceiling and `texture` as the panorama.
    pub fn set_sky(&mut self, flat: TextureId, texture: TextureId) -> Result<(), TextureError> {
        for id in [flat, texture] {
            self.texture(id)?;
        }
        self.sky = Some(Sky { flat, texture });
        Ok(())
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
