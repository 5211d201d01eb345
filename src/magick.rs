use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{NameplateError, NameplateResult};
use crate::palette::Rgb;

/// Parameters for one avatar raster: a square canvas filled with the identity
/// color, initials annotated at a configured offset from center.
#[derive(Clone, Debug)]
pub struct AvatarSpec {
    pub size: u32,
    pub background: Rgb,
    pub text: String,
    pub font: PathBuf,
    pub point_size: u32,
    pub weight: u32,
    pub fill: String,
    pub annotate_offset: String,
    pub out_path: PathBuf,
}

/// Parameters for one aspect-fill resize: scale the source to fully cover
/// `width`x`height`, center-crop/pad onto transparency, sharpen, encode.
#[derive(Clone, Debug)]
pub struct ResizeSpec {
    pub from: PathBuf,
    pub to: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Seam to the external rasterizer. The library treats rasterization as an
/// opaque synchronous operation: only invocation parameters and failure
/// propagation are part of the contract, never bit-exact pixel output.
pub trait Rasterizer: Send + Sync {
    fn draw_avatar(&self, spec: &AvatarSpec) -> NameplateResult<()>;

    fn resize(&self, spec: &ResizeSpec) -> NameplateResult<()>;
}

/// Probe for ImageMagick on PATH.
pub fn is_imagemagick_on_path() -> bool {
    Command::new("convert")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// [`Rasterizer`] backed by the system ImageMagick `convert` binary.
///
/// We intentionally shell out to the installed binary rather than binding
/// ImageMagick natively, to avoid native dev header/lib requirements.
#[derive(Clone, Debug)]
pub struct MagickRasterizer {
    binary: String,
}

impl Default for MagickRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MagickRasterizer {
    pub fn new() -> Self {
        Self {
            binary: "convert".to_string(),
        }
    }

    /// Override the binary name, e.g. `magick` for ImageMagick 7 installs
    /// without the legacy `convert` shim.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[OsString]) -> NameplateResult<()> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                NameplateError::render(format!(
                    "failed to spawn '{}' (is ImageMagick installed and on PATH?): {e}",
                    self.binary
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NameplateError::render(format!(
                "'{}' exited with status {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Rasterizer for MagickRasterizer {
    fn draw_avatar(&self, spec: &AvatarSpec) -> NameplateResult<()> {
        self.run(&avatar_args(spec))
    }

    fn resize(&self, spec: &ResizeSpec) -> NameplateResult<()> {
        self.run(&resize_args(spec))
    }
}

fn avatar_args(spec: &AvatarSpec) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.push("-size".into());
    args.push(format!("{0}x{0}", spec.size).into());
    args.push(format!("xc:{}", spec.background).into());
    args.push("-pointsize".into());
    args.push(spec.point_size.to_string().into());
    args.push("-font".into());
    args.push(spec.font.clone().into());
    args.push("-weight".into());
    args.push(spec.weight.to_string().into());
    args.push("-fill".into());
    // ImageMagick rejects whitespace inside color strings.
    args.push(spec.fill.replace(char::is_whitespace, "").into());
    args.push("-gravity".into());
    args.push("Center".into());
    args.push("-annotate".into());
    args.push(spec.annotate_offset.clone().into());
    args.push(spec.text.clone().into());
    args.push(spec.out_path.clone().into());
    args
}

fn resize_args(spec: &ResizeSpec) -> Vec<OsString> {
    let extent = format!("{}x{}", spec.width, spec.height);
    vec![
        spec.from.clone().into(),
        "-background".into(),
        "transparent".into(),
        "-gravity".into(),
        "center".into(),
        "-thumbnail".into(),
        // `^` makes the thumbnail cover the box instead of fitting inside it.
        format!("{extent}^").into(),
        "-extent".into(),
        extent.into(),
        "-unsharp".into(),
        "2x0.5+0.7+0".into(),
        "-quality".into(),
        "98".into(),
        spec.to.clone().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn avatar_args_carry_every_render_parameter() {
        let spec = AvatarSpec {
            size: 64,
            background: Rgb::new(226, 95, 81),
            text: "TB".to_string(),
            font: PathBuf::from("fonts/Roboto-Medium.ttf"),
            point_size: 140,
            weight: 300,
            fill: "rgba(255, 255, 255, 0.65)".to_string(),
            annotate_offset: "-0+5".to_string(),
            out_path: PathBuf::from("out/64.png"),
        };
        let args = os(&avatar_args(&spec));

        assert_eq!(args[0..2], ["-size", "64x64"]);
        assert_eq!(args[2], "xc:rgb(226,95,81)");
        assert!(args.contains(&"rgba(255,255,255,0.65)".to_string()));
        assert!(args.contains(&"-gravity".to_string()));
        assert!(args.contains(&"TB".to_string()));
        assert_eq!(args.last().unwrap(), "out/64.png");
    }

    #[test]
    fn resize_args_cover_then_crop_at_center() {
        let spec = ResizeSpec {
            from: PathBuf::from("a.png"),
            to: PathBuf::from("b.png"),
            width: 80,
            height: 60,
        };
        let args = os(&resize_args(&spec));

        assert_eq!(args[0], "a.png");
        assert!(args.windows(2).any(|w| w == ["-thumbnail", "80x60^"]));
        assert!(args.windows(2).any(|w| w == ["-extent", "80x60"]));
        assert!(args.windows(2).any(|w| w == ["-unsharp", "2x0.5+0.7+0"]));
        assert!(args.windows(2).any(|w| w == ["-quality", "98"]));
        assert_eq!(args.last().unwrap(), "b.png");
    }
}
