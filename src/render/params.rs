//! Parameter types for slide rasterization.
//!
//! A [`RenderPlan`] describes *what* the exported raster contains, fully
//! resolved to canvas pixels: where the image goes, how dark the shadow gets,
//! and which caption lines sit where. It is the interface between the pure
//! [`layout`](super::layout) math and the [`backend`](super::backend) that
//! pushes pixels, so operation logic can be tested against a mock backend
//! that only records plans.
//!
//! ## Types
//!
//! - [`Quality`] — JPEG quality (1–100, default 90). Clamped on construction.
//! - [`Rgba`] — Straight-alpha text color parsed from CSS hex.
//! - [`GradientOverlay`] — Bottom shadow: start row and peak opacity.
//! - [`CaptionPlan`] / [`CaptionLine`] — Wrapped, positioned caption text.
//! - [`RenderPlan`] — Everything above plus canvas size and image placement.

use super::fonts::FontFamily;
use crate::geometry::Placement;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(value: &str) -> Option<Rgba> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        let nibble = |s: &str| byte(s).map(|v| v * 17);

        match hex.len() {
            3 => Some(Rgba([
                nibble(&hex[0..1])?,
                nibble(&hex[1..2])?,
                nibble(&hex[2..3])?,
                255,
            ])),
            6 => Some(Rgba([
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                255,
            ])),
            8 => Some(Rgba([
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            ])),
            _ => None,
        }
    }

    /// Parse a slide color, falling back to white.
    pub fn from_hex_or_white(value: &str) -> Rgba {
        Rgba::from_hex(value).unwrap_or_else(|| {
            tracing::warn!(color = value, "unparseable text color, using white");
            Rgba::WHITE
        })
    }
}

/// Bottom shadow: transparent at `start_y`, `max_alpha` black at the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientOverlay {
    pub start_y: f64,
    pub max_alpha: f32,
}

/// One wrapped caption line, positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    /// Left edge of the line's advance box.
    pub x: f32,
    /// Bottom of the line box (text baseline sits `descent` above it).
    pub bottom: f32,
    /// Measured advance width.
    pub width: f32,
}

/// Caption text ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionPlan {
    /// Family the lines were measured with (after fallback).
    pub family: FontFamily,
    /// Font size in canvas pixels (em size).
    pub px: f32,
    pub line_height: f32,
    pub color: Rgba,
    pub lines: Vec<CaptionLine>,
}

/// Fully resolved description of one exported slide.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    /// Canvas `(width, height)` in pixels.
    pub canvas: (u32, u32),
    /// Image rectangle in canvas pixels.
    pub placement: Placement,
    pub gradient: GradientOverlay,
    pub caption: Option<CaptionPlan>,
    pub quality: Quality,
}
