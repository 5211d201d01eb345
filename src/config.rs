use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{NameplateError, NameplateResult};

/// Generation options recognized by the library. Every field has a documented
/// default, so `Config::default()` is a working configuration as long as the
/// font file exists.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory under which cached avatars are written.
    pub cache_root: PathBuf,
    /// Identifier of the active palette (`google`, `dracula`, `monokai`,
    /// `pastel`, `jedi_light`, or `custom`).
    pub palette: String,
    /// Hex color list backing the `custom` palette. Validated on registry
    /// construction: 2 to 20 entries, each `#rgb` or `#rrggbb`.
    pub custom_palette: Option<Vec<String>>,
    /// Font file handed to the rasterizer for the initials.
    pub font_path: PathBuf,
    /// Letter color, as an ImageMagick color string.
    pub fill_color: String,
    /// Font weight for the initials.
    pub font_weight: u32,
    /// Point size for the initials.
    pub point_size: u32,
    /// Annotation anchor offset relative to center gravity.
    pub annotate_offset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("public/system"),
            palette: "google".to_string(),
            custom_palette: None,
            font_path: PathBuf::from("fonts/Roboto-Medium.ttf"),
            fill_color: "rgba(255,255,255,0.65)".to_string(),
            font_weight: 300,
            point_size: 140,
            annotate_offset: "-0+5".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON document. Unset fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> NameplateResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NameplateError::configuration(format!("invalid configuration JSON: {e}")))
    }
}
