//! Caption font families and the font files that back them.
//!
//! Slides name a family by key (`inter`, `playfair`, ...). Older decks use the
//! stylesheet class names (`font-inter`, `font-roboto`, ...), which map onto
//! the same families. Anything unrecognized renders as Inter.
//!
//! No font data is compiled in. Files come from the `[fonts]` config table;
//! a family without a usable file falls back to Inter, and if Inter is
//! missing too the caption is skipped.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Caption typeface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFamily {
    #[default]
    Inter,
    Playfair,
    RobotoMono,
    Merriweather,
    Oswald,
}

impl FontFamily {
    pub const ALL: [FontFamily; 5] = [
        FontFamily::Inter,
        FontFamily::Playfair,
        FontFamily::RobotoMono,
        FontFamily::Merriweather,
        FontFamily::Oswald,
    ];

    /// Config and deck key.
    pub fn key(self) -> &'static str {
        match self {
            FontFamily::Inter => "inter",
            FontFamily::Playfair => "playfair",
            FontFamily::RobotoMono => "roboto-mono",
            FontFamily::Merriweather => "merriweather",
            FontFamily::Oswald => "oswald",
        }
    }

    /// Display name of the typeface.
    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::Playfair => "Playfair Display",
            FontFamily::RobotoMono => "Roboto Mono",
            FontFamily::Merriweather => "Merriweather",
            FontFamily::Oswald => "Oswald",
        }
    }

    /// Look up a key, legacy class name or display name.
    pub fn parse(value: &str) -> Option<FontFamily> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        let key = normalized.strip_prefix("font-").unwrap_or(&normalized);
        match key {
            "inter" => Some(FontFamily::Inter),
            "playfair" | "playfair-display" => Some(FontFamily::Playfair),
            "roboto" | "roboto-mono" | "mono" => Some(FontFamily::RobotoMono),
            "merriweather" => Some(FontFamily::Merriweather),
            "oswald" => Some(FontFamily::Oswald),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse), but unknown names become Inter.
    pub fn resolve(value: &str) -> FontFamily {
        FontFamily::parse(value).unwrap_or_else(|| {
            tracing::warn!(font = value, "unknown font family, using Inter");
            FontFamily::Inter
        })
    }
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Font files by family, loaded lazily and cached.
///
/// `Sync`, so one book can be shared with the export worker.
#[derive(Debug, Default)]
pub struct FontBook {
    paths: BTreeMap<FontFamily, PathBuf>,
    loaded: Mutex<HashMap<FontFamily, Option<FontArc>>>,
}

impl FontBook {
    /// A book with no fonts: every caption is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from the `[fonts]` config table. Unknown keys are ignored with a
    /// warning.
    pub fn from_config(fonts: &BTreeMap<String, PathBuf>) -> Self {
        let mut paths = BTreeMap::new();
        for (key, path) in fonts {
            match FontFamily::parse(key) {
                Some(family) => {
                    paths.insert(family, path.clone());
                }
                None => tracing::warn!(key = %key, "ignoring font for unknown family"),
            }
        }
        Self {
            paths,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Register an already-loaded font.
    pub fn with_font(self, family: FontFamily, font: FontArc) -> Self {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(family, Some(font));
        self
    }

    /// Configured file for a family, if any.
    pub fn path(&self, family: FontFamily) -> Option<&Path> {
        self.paths.get(&family).map(PathBuf::as_path)
    }

    /// The font to draw `requested` with, falling back to Inter.
    ///
    /// Returns the family actually used, or `None` when neither is available.
    pub fn resolve(&self, requested: FontFamily) -> Option<(FontFamily, FontArc)> {
        if let Some(font) = self.load(requested) {
            return Some((requested, font));
        }
        if requested != FontFamily::Inter {
            if let Some(font) = self.load(FontFamily::Inter) {
                tracing::warn!(
                    requested = requested.key(),
                    "font unavailable, falling back to Inter"
                );
                return Some((FontFamily::Inter, font));
            }
        }
        None
    }

    /// Whether `family` has a loadable font of its own (no fallback).
    pub fn is_available(&self, family: FontFamily) -> bool {
        self.load(family).is_some()
    }

    fn load(&self, family: FontFamily) -> Option<FontArc> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = loaded.get(&family) {
            return cached.clone();
        }

        let font = self.paths.get(&family).and_then(|path| load_font_file(path));
        loaded.insert(family, font.clone());
        font
    }
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read font file");
            return None;
        }
    };
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            tracing::debug!(path = %path.display(), "loaded font");
            Some(font)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid font file");
            None
        }
    }
}

/// Pixel scale for an em size of `px` canvas pixels.
///
/// `PxScale` measures ascent-to-descent height, not the em square, so the
/// size is converted through the font's units per em.
pub fn px_scale(font: &FontArc, px: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(px * font.height_unscaled() / upem),
        _ => PxScale::from(px),
    }
}

/// Horizontal advance of `text` at `scale`, including kerning.
pub fn measure_line(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let gid = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, gid);
        }
        width += scaled.h_advance(gid);
        prev = Some(gid);
    }
    width
}
