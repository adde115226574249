/// Player avatar.
///
/// The avatar is a single glyph read from a small text file (first
/// non-whitespace character). A missing or empty file falls back to the
/// built-in yellow disc.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::color::{self, Rgb};

const FALLBACK_GLYPH: char = '●';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Avatar {
    pub glyph: char,
    pub color: Rgb,
}

impl Default for Avatar {
    fn default() -> Self {
        Avatar { glyph: FALLBACK_GLYPH, color: color::YELLOW }
    }
}

impl Avatar {
    /// Load from an already-resolved path; `None` means the file was not found.
    pub fn load(path: Option<&Path>) -> Avatar {
        let path = match path {
            Some(p) => p,
            None => {
                info!("no avatar file, using fallback glyph");
                return Avatar::default();
            }
        };
        match std::fs::read_to_string(path) {
            Ok(text) => Avatar::from_text(&text).unwrap_or_else(|| {
                warn!(path = %path.display(), "avatar file is empty, using fallback glyph");
                Avatar::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read avatar, using fallback glyph");
                Avatar::default()
            }
        }
    }

    fn from_text(text: &str) -> Option<Avatar> {
        let glyph = text.chars().find(|c| !c.is_whitespace())?;
        Some(Avatar { glyph, ..Avatar::default() })
    }
}
