use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{NameplateError, NameplateResult};

/// RGB triplet used for avatar backgrounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Directory segment form used by the cache layout (`r_g_b`).
    pub fn path_segment(&self) -> String {
        format!("{}_{}_{}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    /// `rgb(r,g,b)` string accepted by ImageMagick.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// How a palette maps a username to one of its colors. A closed set: new
/// behaviors are added here, not via subclassing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickStrategy {
    /// SHA-256 of the username, first 8 digest bytes as a big-endian `u64`,
    /// reduced modulo palette length. Stable and approximately uniform for
    /// arbitrary input strings.
    Hashed,
    /// First character `A`-`Z` selects index 0-25 and a leading digit selects
    /// that digit's index; anything else falls back to the hashed scheme.
    AlphaIndexed,
}

/// Named, ordered, immutable collection of RGB colors.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Rgb>,
    strategy: PickStrategy,
}

impl Palette {
    pub fn hashed(colors: Vec<Rgb>) -> Self {
        Self {
            colors,
            strategy: PickStrategy::Hashed,
        }
    }

    pub fn alpha_indexed(colors: Vec<Rgb>) -> Self {
        Self {
            colors,
            strategy: PickStrategy::AlphaIndexed,
        }
    }

    /// Build a hashed palette from configuration-supplied hex strings,
    /// failing fast when the list does not satisfy [`validate_custom_palette`].
    pub fn custom(entries: &[String]) -> NameplateResult<Self> {
        if !validate_custom_palette(entries) {
            return Err(NameplateError::configuration(
                "invalid custom palette: expected 2..=20 entries of the form #rgb or #rrggbb",
            ));
        }
        let colors = entries.iter().filter_map(|e| parse_hex_color(e)).collect();
        Ok(Self::hashed(colors))
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn strategy(&self) -> PickStrategy {
        self.strategy
    }

    /// Select a color for `username`. The same username always maps to the
    /// same color for a given palette and length.
    pub fn pick(&self, username: &str) -> NameplateResult<Rgb> {
        if self.colors.is_empty() {
            return Err(NameplateError::configuration("palette has no colors"));
        }
        match self.strategy {
            PickStrategy::Hashed => Ok(self.hashed_pick(username)),
            PickStrategy::AlphaIndexed => Ok(self.alpha_indexed_pick(username)),
        }
    }

    fn hashed_pick(&self, username: &str) -> Rgb {
        let digest = Sha256::digest(username.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let n = u64::from_be_bytes(prefix);
        self.colors[(n % self.colors.len() as u64) as usize]
    }

    fn alpha_indexed_pick(&self, username: &str) -> Rgb {
        if let Some(c) = username.chars().next() {
            let c = c.to_ascii_uppercase();
            if c.is_ascii_uppercase() {
                return self.colors[(c as usize - 'A' as usize) % self.colors.len()];
            }
            if let Some(d) = c.to_digit(10) {
                return self.colors[d as usize % self.colors.len()];
            }
        }
        self.hashed_pick(username)
    }
}

/// Whether `entries` is an acceptable custom palette: 2 to 20 strings, each a
/// `#` followed by 3 or 6 hex digits.
pub fn validate_custom_palette(entries: &[String]) -> bool {
    (2..=20).contains(&entries.len()) && entries.iter().all(|e| is_hex_color(e))
}

fn is_hex_color(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('#') else {
        return false;
    };
    matches!(rest.len(), 3 | 6) && rest.chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_hex_color(s: &str) -> Option<Rgb> {
    let rest = s.strip_prefix('#')?;
    let full: String = match rest.len() {
        3 => rest.chars().flat_map(|c| [c, c]).collect(),
        6 => rest.to_string(),
        _ => return None,
    };
    let r = u8::from_str_radix(&full[0..2], 16).ok()?;
    let g = u8::from_str_radix(&full[2..4], 16).ok()?;
    let b = u8::from_str_radix(&full[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

/// Mapping from palette identifier to palette. Built once at startup and
/// treated as read-only afterward; concurrent reads are always safe.
#[derive(Clone, Debug)]
pub struct PaletteRegistry {
    palettes: HashMap<String, Palette>,
}

impl PaletteRegistry {
    /// Registry holding the five built-in palettes.
    pub fn builtin() -> Self {
        let mut registry = Self {
            palettes: HashMap::new(),
        };
        registry.register("google", Palette::alpha_indexed(GOOGLE.to_vec()));
        registry.register("dracula", Palette::hashed(DRACULA.to_vec()));
        registry.register("monokai", Palette::hashed(MONOKAI.to_vec()));
        registry.register("pastel", Palette::hashed(PASTEL.to_vec()));
        registry.register("jedi_light", Palette::hashed(JEDI_LIGHT.to_vec()));
        registry
    }

    /// Built-in palettes plus the configured custom palette, if any. Fails
    /// fast when `custom` is selected without colors or with invalid colors.
    pub fn from_config(config: &Config) -> NameplateResult<Self> {
        let mut registry = Self::builtin();
        match &config.custom_palette {
            Some(entries) => registry.register("custom", Palette::custom(entries)?),
            None if config.palette == "custom" => {
                return Err(NameplateError::configuration(
                    "custom palette selected but custom_palette is not configured",
                ));
            }
            None => {}
        }
        Ok(registry)
    }

    pub fn register(&mut self, id: impl Into<String>, palette: Palette) {
        self.palettes.insert(id.into(), palette);
    }

    pub fn get(&self, id: &str) -> Option<&Palette> {
        self.palettes.get(id)
    }

    /// Resolve the palette for `id` and delegate to its pick.
    pub fn color_for(&self, id: &str, username: &str) -> NameplateResult<Rgb> {
        let palette = self
            .palettes
            .get(id)
            .ok_or_else(|| NameplateError::configuration(format!("unknown palette: {id}")))?;
        palette.pick(username)
    }
}

const GOOGLE: [Rgb; 26] = [
    Rgb::new(226, 95, 81),   // A
    Rgb::new(242, 96, 145),  // B
    Rgb::new(187, 101, 202), // C
    Rgb::new(149, 114, 207), // D
    Rgb::new(120, 132, 205), // E
    Rgb::new(91, 149, 249),  // F
    Rgb::new(72, 194, 249),  // G
    Rgb::new(69, 208, 226),  // H
    Rgb::new(72, 182, 172),  // I
    Rgb::new(82, 188, 137),  // J
    Rgb::new(155, 206, 95),  // K
    Rgb::new(212, 227, 74),  // L
    Rgb::new(254, 218, 16),  // M
    Rgb::new(247, 192, 0),   // N
    Rgb::new(255, 168, 0),   // O
    Rgb::new(255, 138, 96),  // P
    Rgb::new(194, 194, 194), // Q
    Rgb::new(143, 164, 175), // R
    Rgb::new(162, 136, 126), // S
    Rgb::new(163, 163, 163), // T
    Rgb::new(175, 181, 226), // U
    Rgb::new(179, 155, 221), // V
    Rgb::new(194, 194, 194), // W
    Rgb::new(124, 222, 235), // X
    Rgb::new(188, 170, 164), // Y
    Rgb::new(173, 214, 125), // Z
];

const DRACULA: [Rgb; 10] = [
    Rgb::new(40, 42, 54),    // background
    Rgb::new(68, 71, 90),    // current line
    Rgb::new(98, 114, 164),  // comment
    Rgb::new(139, 233, 253), // cyan
    Rgb::new(80, 250, 123),  // green
    Rgb::new(255, 184, 108), // orange
    Rgb::new(255, 121, 198), // pink
    Rgb::new(189, 147, 249), // purple
    Rgb::new(241, 250, 140), // yellow
    Rgb::new(255, 85, 85),   // red
];

const MONOKAI: [Rgb; 8] = [
    Rgb::new(39, 40, 34),    // background
    Rgb::new(248, 248, 242), // foreground
    Rgb::new(249, 38, 114),  // pink
    Rgb::new(166, 226, 46),  // green
    Rgb::new(253, 151, 31),  // orange
    Rgb::new(102, 217, 239), // cyan
    Rgb::new(174, 129, 255), // purple
    Rgb::new(230, 219, 116), // yellow
];

const PASTEL: [Rgb; 5] = [
    Rgb::new(255, 179, 186), // light pink
    Rgb::new(255, 223, 186), // peach
    Rgb::new(255, 255, 186), // light yellow
    Rgb::new(186, 255, 201), // mint
    Rgb::new(186, 225, 255), // baby blue
];

const JEDI_LIGHT: [Rgb; 7] = [
    Rgb::new(255, 255, 255), // pure white
    Rgb::new(0, 87, 183),    // Jedi blue
    Rgb::new(114, 137, 218), // softer blue
    Rgb::new(0, 204, 255),   // cyan/saber glow
    Rgb::new(255, 214, 10),  // light yellow/gold
    Rgb::new(173, 216, 230), // pale blue
    Rgb::new(192, 192, 192), // silver
];

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn google_maps_leading_letter_to_fixed_index() {
        let registry = PaletteRegistry::builtin();
        assert_eq!(
            registry.color_for("google", "tony").unwrap(),
            Rgb::new(163, 163, 163)
        );
        assert_eq!(
            registry.color_for("google", "Tony").unwrap(),
            Rgb::new(163, 163, 163)
        );
        assert_eq!(
            registry.color_for("google", "ada").unwrap(),
            Rgb::new(226, 95, 81)
        );
    }

    #[test]
    fn google_maps_leading_digit_to_digit_index() {
        let registry = PaletteRegistry::builtin();
        assert_eq!(
            registry.color_for("google", "7foo").unwrap(),
            Rgb::new(69, 208, 226)
        );
    }

    #[test]
    fn google_falls_back_to_hash_for_symbols() {
        let registry = PaletteRegistry::builtin();
        let a = registry.color_for("google", "@foo").unwrap();
        let b = registry.color_for("google", "@foo").unwrap();
        assert_eq!(a, b);
        assert!(registry.get("google").unwrap().colors().contains(&a));
    }

    #[test]
    fn hashed_pick_is_deterministic_and_in_palette() {
        let registry = PaletteRegistry::builtin();
        let a = registry.color_for("dracula", "Tony Baloney").unwrap();
        let b = registry.color_for("dracula", "Tony Baloney").unwrap();
        assert_eq!(a, b);
        assert!(registry.get("dracula").unwrap().colors().contains(&a));
    }

    #[test]
    fn unknown_palette_is_a_configuration_error() {
        let registry = PaletteRegistry::builtin();
        let err = registry.color_for("solarized", "tony").unwrap_err();
        assert!(err.to_string().contains("unknown palette: solarized"));
    }

    #[test]
    fn custom_validator_accepts_short_and_long_hex() {
        assert!(validate_custom_palette(&strings(&[
            "#fff", "#a1b2c3", "#123456"
        ])));
    }

    #[test]
    fn custom_validator_rejects_bad_shapes() {
        // missing '#', wrong digit count
        assert!(!validate_custom_palette(&strings(&["fff", "#12"])));
        // too few
        assert!(!validate_custom_palette(&strings(&["#fff"])));
        assert!(!validate_custom_palette(&[]));
        // too many
        let too_many = vec!["#fff".to_string(); 21];
        assert!(!validate_custom_palette(&too_many));
        // non-hex digits
        assert!(!validate_custom_palette(&strings(&["#ggg", "#fff"])));
    }

    #[test]
    fn custom_palette_parses_hex_including_shorthand() {
        let palette = Palette::custom(&strings(&["#fff", "#a1b2c3"])).unwrap();
        assert_eq!(
            palette.colors(),
            &[Rgb::new(255, 255, 255), Rgb::new(161, 178, 195)]
        );
    }

    #[test]
    fn custom_palette_rejection_is_a_configuration_error() {
        let err = Palette::custom(&strings(&["#fff"])).unwrap_err();
        assert!(err.to_string().contains("configuration error:"));
    }

    #[test]
    fn registry_from_config_requires_colors_for_custom_selection() {
        let config = Config {
            palette: "custom".to_string(),
            ..Config::default()
        };
        assert!(PaletteRegistry::from_config(&config).is_err());

        let config = Config {
            palette: "custom".to_string(),
            custom_palette: Some(strings(&["#fff", "#000"])),
            ..Config::default()
        };
        let registry = PaletteRegistry::from_config(&config).unwrap();
        let color = registry.color_for("custom", "tony").unwrap();
        assert!([Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)].contains(&color));
    }

    #[test]
    fn rgb_formats_for_rasterizer_and_cache_layout() {
        let c = Rgb::new(226, 95, 81);
        assert_eq!(c.to_string(), "rgb(226,95,81)");
        assert_eq!(c.path_segment(), "226_95_81");
    }
}
