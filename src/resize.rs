use std::path::{Path, PathBuf};

use crate::error::{NameplateError, NameplateResult};
use crate::magick::{MagickRasterizer, Rasterizer, ResizeSpec};

/// Tagged result of a resize. This operation never raises past its boundary:
/// every failure, including validation, is folded into
/// [`ResizeOutcome::Failure`] with the original request for diagnostics.
#[derive(Clone, Debug)]
pub enum ResizeOutcome {
    Success {
        path: PathBuf,
    },
    Failure {
        message: String,
        from: PathBuf,
        to: PathBuf,
        width: u32,
        height: u32,
    },
}

impl ResizeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Destination path on success.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Success { path } => Some(path),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

/// Generic aspect-fill image resize: scale the source to fully cover the
/// target box, center-crop/pad onto transparency, sharpen, and encode at high
/// quality. Independent of avatar generation and usable on any raster the
/// external rasterizer understands.
pub struct Resizer {
    rasterizer: Box<dyn Rasterizer>,
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Resizer {
    /// Resizer backed by the system ImageMagick binary.
    pub fn new() -> Self {
        Self::with_rasterizer(Box::new(MagickRasterizer::new()))
    }

    pub fn with_rasterizer(rasterizer: Box<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Resize `from` into `to` at exactly `width`x`height`.
    ///
    /// Validation order is part of the contract: source existence, then
    /// width, then height, then destination non-empty; the first failure
    /// wins and its message surfaces in the outcome.
    pub fn resize_image(
        &self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
        width: u32,
        height: u32,
    ) -> ResizeOutcome {
        let from = from.as_ref().to_path_buf();
        let to = to.as_ref().to_path_buf();
        match self.run(&from, &to, width, height) {
            Ok(()) => ResizeOutcome::Success { path: to },
            Err(e) => ResizeOutcome::Failure {
                message: format!("Image resize failed: {}", e.detail()),
                from,
                to,
                width,
                height,
            },
        }
    }

    /// Legacy entry point collapsing the outcome to a boolean.
    #[deprecated(note = "use `resize_image` and inspect the returned `ResizeOutcome`")]
    pub fn resize(
        &self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
        width: u32,
        height: u32,
    ) -> bool {
        self.resize_image(from, to, width, height).is_success()
    }

    fn run(&self, from: &Path, to: &Path, width: u32, height: u32) -> NameplateResult<()> {
        if !from.is_file() {
            return Err(NameplateError::configuration(format!(
                "Source file not found: {}",
                from.display()
            )));
        }
        if width == 0 {
            return Err(NameplateError::configuration(
                "Width must be positive integer",
            ));
        }
        if height == 0 {
            return Err(NameplateError::configuration(
                "Height must be positive integer",
            ));
        }
        if to.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(NameplateError::configuration(
                "Destination path cannot be empty",
            ));
        }

        self.rasterizer.resize(&ResizeSpec {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            width,
            height,
        })
    }
}
