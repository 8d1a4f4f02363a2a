//! The fixed table of slide aspect ratios.
//!
//! Every ratio is bound to an explicit export size. The live preview and the
//! exporter both key off the ratio string stored on the slide (`"4 / 5"`), so
//! this table is the only place the mapping lives.
//!
//! | Label | Ratio | Export size |
//! |---|---|---|
//! | Square | `1 / 1` | 1080×1080 |
//! | Portrait | `4 / 5` | 1080×1350 |
//! | Story | `9 / 16` | 1080×1920 |
//! | Landscape | `16 / 9` | 1920×1080 |
//!
//! Ratio strings are parsed numerically, so `"1/1"`, `"1:1"` and `"1 / 1"`
//! name the same entry. Anything unparseable, or a ratio not in the table,
//! falls back to [`AspectRatio::Square`] rather than failing the layout.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// One of the supported slide shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait,
    Story,
    Landscape,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Story,
        AspectRatio::Landscape,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "Square",
            AspectRatio::Portrait => "Portrait",
            AspectRatio::Story => "Story",
            AspectRatio::Landscape => "Landscape",
        }
    }

    /// Canonical ratio string, as stored on slides.
    pub fn as_ratio_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1 / 1",
            AspectRatio::Portrait => "4 / 5",
            AspectRatio::Story => "9 / 16",
            AspectRatio::Landscape => "16 / 9",
        }
    }

    /// `(width, height)` terms of the ratio.
    pub fn terms(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Portrait => (4, 5),
            AspectRatio::Story => (9, 16),
            AspectRatio::Landscape => (16, 9),
        }
    }

    /// Fixed export canvas size in pixels.
    pub fn export_size(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Portrait => (1080, 1350),
            AspectRatio::Story => (1080, 1920),
            AspectRatio::Landscape => (1920, 1080),
        }
    }

    /// Preview container for a given on-screen width; height follows the ratio.
    pub fn container_for_width(self, width: f64) -> Size {
        let (w, h) = self.terms();
        Size::new(width, width * h as f64 / w as f64)
    }

    /// Look up a ratio string, returning `None` if it is malformed or not in
    /// the table.
    pub fn parse(value: &str) -> Option<AspectRatio> {
        let (w, h) = parse_terms(value)?;
        AspectRatio::ALL.into_iter().find(|ratio| {
            let (rw, rh) = ratio.terms();
            // Cross-multiply so "2/2" and "8 / 10" match too
            (w * rh as f64 - h * rw as f64).abs() < 1e-9
        })
    }

    /// Resolve a ratio string, falling back to square geometry.
    pub fn resolve(value: &str) -> AspectRatio {
        AspectRatio::parse(value).unwrap_or_else(|| {
            tracing::warn!(ratio = value, "unknown aspect ratio, falling back to 1 / 1");
            AspectRatio::Square
        })
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ratio_str())
    }
}

/// Split `"w / h"`, `"w/h"` or `"w:h"` into positive finite terms.
fn parse_terms(value: &str) -> Option<(f64, f64)> {
    let (w, h) = value.split_once('/').or_else(|| value.split_once(':'))?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w, h))
}
