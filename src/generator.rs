use std::path::{Path, PathBuf};

use crate::cache::AvatarCache;
use crate::config::Config;
use crate::error::{NameplateError, NameplateResult};
use crate::identity::Identity;
use crate::magick::{AvatarSpec, MagickRasterizer, Rasterizer};
use crate::palette::PaletteRegistry;

/// Maximum rendered size in pixels. Requests above this are silently capped:
/// large rasters are bounded by policy, and callers that need exact sizing
/// apply their own downstream resize.
pub const FULLSIZE: u32 = 600;

/// Per-call options for [`Generator::generate_with`].
#[derive(Clone, Copy, Debug)]
pub struct GenerateOpts {
    /// Reuse an existing cached PNG when present. When disabled the
    /// orchestrator always re-renders and overwrites the resolved path.
    pub cache: bool,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self { cache: true }
    }
}

/// Avatar generation orchestrator.
///
/// Per call: validate inputs (before any I/O), derive an [`Identity`], clamp
/// the size, resolve the cache path, and either return the cached file or
/// invoke the rasterizer and verify its output. Holds no mutable state beyond
/// the cache resolver's memo map, so one `Generator` may serve any number of
/// worker threads.
///
/// Concurrent cache-miss calls for the same key may both render and both
/// write the same destination. That race is benign: renders for a key are
/// deterministic, so the same bytes are expected either way. Callers who
/// require strict single-flight rendering should hold a per-key lock around
/// [`Generator::generate`].
pub struct Generator {
    config: Config,
    palettes: PaletteRegistry,
    cache: AvatarCache,
    rasterizer: Box<dyn Rasterizer>,
}

impl Generator {
    /// Build a generator that renders through the system ImageMagick binary.
    pub fn new(config: Config) -> NameplateResult<Self> {
        Self::with_rasterizer(config, Box::new(MagickRasterizer::new()))
    }

    /// Build a generator with an injected rasterizer.
    pub fn with_rasterizer(
        config: Config,
        rasterizer: Box<dyn Rasterizer>,
    ) -> NameplateResult<Self> {
        let palettes = PaletteRegistry::from_config(&config)?;
        let cache = AvatarCache::new(config.cache_root.clone());
        Ok(Self {
            config,
            palettes,
            cache,
            rasterizer,
        })
    }

    pub fn cache(&self) -> &AvatarCache {
        &self.cache
    }

    pub fn palettes(&self) -> &PaletteRegistry {
        &self.palettes
    }

    /// Generate (or reuse) the avatar for `username` at `size` pixels.
    pub fn generate(&self, username: &str, size: u32) -> NameplateResult<PathBuf> {
        self.generate_with(username, size, GenerateOpts::default())
    }

    /// [`Generator::generate`] with explicit options.
    #[tracing::instrument(skip(self))]
    pub fn generate_with(
        &self,
        username: &str,
        size: u32,
        opts: GenerateOpts,
    ) -> NameplateResult<PathBuf> {
        self.validate(username, size)?;

        let identity = Identity::from_username(username, &self.palettes, &self.config.palette)?;
        let effective = size.min(FULLSIZE);
        tracing::debug!(letters = %identity.letters, size = effective, "derived identity");

        let path = self.cache.resolve(&identity, effective)?;
        if opts.cache && path.is_file() {
            tracing::debug!(path = %path.display(), "using cached avatar");
            return Ok(path);
        }

        let spec = AvatarSpec {
            size: effective,
            background: identity.color,
            text: identity.letters.clone(),
            font: self.config.font_path.clone(),
            point_size: self.config.point_size,
            weight: self.config.font_weight,
            fill: self.config.fill_color.clone(),
            annotate_offset: self.config.annotate_offset.clone(),
            out_path: path.clone(),
        };
        self.rasterizer.draw_avatar(&spec)?;
        self.verify_output(&path, effective)?;

        tracing::info!(path = %path.display(), "avatar generated");
        Ok(path)
    }

    fn validate(&self, username: &str, size: u32) -> NameplateResult<()> {
        if username.trim().is_empty() {
            return Err(NameplateError::configuration("username cannot be empty"));
        }
        if size == 0 {
            return Err(NameplateError::configuration(
                "size must be a positive integer",
            ));
        }
        if !self.config.font_path.is_file() {
            return Err(NameplateError::configuration(format!(
                "font file not found: {}",
                self.config.font_path.display()
            )));
        }
        if self.config.fill_color.trim().is_empty() {
            return Err(NameplateError::configuration("fill color not configured"));
        }
        Ok(())
    }

    fn verify_output(&self, path: &Path, expected: u32) -> NameplateResult<()> {
        if !path.is_file() {
            return Err(NameplateError::filesystem(format!(
                "rasterizer reported success but '{}' was not written",
                path.display()
            )));
        }
        let (w, h) = image::image_dimensions(path).map_err(|e| {
            NameplateError::render(format!(
                "rasterizer produced an unreadable image at '{}': {e}",
                path.display()
            ))
        })?;
        if w != expected || h != expected {
            return Err(NameplateError::render(format!(
                "rasterizer produced {w}x{h}, expected {expected}x{expected}"
            )));
        }
        Ok(())
    }
}
