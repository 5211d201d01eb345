#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nameplate::{AvatarSpec, NameplateError, NameplateResult, Rasterizer, ResizeSpec};

pub fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "nameplate_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    img.save(path).unwrap();
}

#[derive(Clone, Copy, Debug)]
pub enum FakeBehavior {
    /// Write a valid PNG at the requested dimensions.
    WritePng,
    /// Write bytes that do not decode as an image.
    WriteGarbage,
    /// Write a valid PNG at the wrong dimensions.
    WrongSize,
    /// Return a render error without touching the filesystem.
    Fail,
}

/// Test stand-in for the external rasterizer, counting invocations.
pub struct FakeRasterizer {
    pub behavior: FakeBehavior,
    pub draws: Arc<AtomicUsize>,
    pub resizes: Arc<AtomicUsize>,
}

impl FakeRasterizer {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            draws: Arc::new(AtomicUsize::new(0)),
            resizes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn produce(&self, path: &Path, width: u32, height: u32) -> NameplateResult<()> {
        match self.behavior {
            FakeBehavior::WritePng => write_png(path, width, height),
            FakeBehavior::WriteGarbage => std::fs::write(path, b"not a png").unwrap(),
            FakeBehavior::WrongSize => write_png(path, 10, 10),
            FakeBehavior::Fail => return Err(NameplateError::render("boom")),
        }
        Ok(())
    }
}

impl Rasterizer for FakeRasterizer {
    fn draw_avatar(&self, spec: &AvatarSpec) -> NameplateResult<()> {
        self.draws.fetch_add(1, Ordering::SeqCst);
        self.produce(&spec.out_path, spec.size, spec.size)
    }

    fn resize(&self, spec: &ResizeSpec) -> NameplateResult<()> {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        self.produce(&spec.to, spec.width, spec.height)
    }
}
