//! Nameplate derives deterministic "letter avatars": one or two initials over
//! a palette color, rendered to PNG and cached under a versioned,
//! collision-free path layout.
//!
//! # Pipeline overview
//!
//! 1. **Derive**: `username -> Identity` (initials + stable palette color)
//! 2. **Resolve**: `Identity + size -> cache path` (compute-once, versioned layout)
//! 3. **Render** (cache miss): invoke the external ImageMagick rasterizer
//! 4. **Verify**: the output file exists and decodes at the expected size
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identity derivation and path resolution are
//!   pure and stable for a given input, so cached artifacts are reusable and
//!   same-key render races are benign.
//! - **Typed errors only**: validation happens before any I/O, and external
//!   failures are re-wrapped into a stable taxonomy ([`NameplateError`]).
//! - **Opaque rasterization**: pixel output belongs to the external renderer
//!   behind the [`Rasterizer`] seam; only its parameters and failure
//!   propagation are this crate's contract.
//!
//! # Getting started
//!
//! ```no_run
//! use nameplate::{Config, Generator};
//!
//! let generator = Generator::new(Config::default())?;
//! let path = generator.generate("Tony Baloney", 128)?;
//! // => public/system/nameplate/1/TB/163_163_163/128.png
//! # Ok::<(), nameplate::NameplateError>(())
//! ```
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod identity;
pub mod magick;
pub mod palette;
pub mod resize;

pub use cache::{AvatarCache, CacheKey, FORMAT_VERSION};
pub use config::Config;
pub use error::{NameplateError, NameplateResult};
pub use generator::{FULLSIZE, GenerateOpts, Generator};
pub use identity::Identity;
pub use magick::{
    AvatarSpec, MagickRasterizer, Rasterizer, ResizeSpec, is_imagemagick_on_path,
};
pub use palette::{Palette, PaletteRegistry, PickStrategy, Rgb, validate_custom_palette};
pub use resize::{ResizeOutcome, Resizer};
