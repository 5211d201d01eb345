use crate::error::{NameplateError, NameplateResult};
use crate::palette::{PaletteRegistry, Rgb};

/// Derived avatar identity: one or two uppercase initials plus a background
/// color. Immutable once built; cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub letters: String,
    pub color: Rgb,
}

impl Identity {
    /// Derive an identity from a username.
    ///
    /// Initials come from the trimmed username split on whitespace runs: two
    /// or more tokens yield the first character of the first two tokens, a
    /// single token yields its first character, both uppercased. The color
    /// lookup hashes the ORIGINAL untrimmed username so hash-based palettes
    /// keep their historical assignments.
    ///
    /// Pure and safe to call concurrently from any number of threads.
    pub fn from_username(
        username: &str,
        palettes: &PaletteRegistry,
        palette_id: &str,
    ) -> NameplateResult<Self> {
        let letters = derive_letters(username)?;
        let color = palettes.color_for(palette_id, username)?;
        Ok(Self { letters, color })
    }
}

fn derive_letters(username: &str) -> NameplateResult<String> {
    let mut tokens = username.split_whitespace();
    let first = tokens.next().ok_or_else(|| {
        NameplateError::configuration("username must contain at least one visible character")
    })?;

    let mut letters = String::new();
    letters.extend(first.chars().next().into_iter().flat_map(char::to_uppercase));
    if let Some(second) = tokens.next() {
        letters.extend(
            second
                .chars()
                .next()
                .into_iter()
                .flat_map(char::to_uppercase),
        );
    }
    Ok(letters)
}
