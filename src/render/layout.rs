//! Pure layout calculations for the export canvas.
//!
//! No pixels and no fonts here: text measurement is passed in as a closure,
//! so wrapping and anchoring can be tested with a fixed-width "font".

use super::params::{CaptionLine, GradientOverlay};
use crate::config::{CaptionConfig, OverlayConfig};
use crate::types::Alignment;

/// Caption metrics resolved for one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionMetrics {
    /// Em size in canvas pixels.
    pub px: f32,
    /// Distance between consecutive line bottoms.
    pub line_height: f32,
    /// Side and bottom margin.
    pub margin: f32,
}

impl CaptionMetrics {
    /// Metrics for a slide font size on a canvas of `canvas_width` pixels.
    ///
    /// The font size is clamped to the configured range, then multiplied by
    /// `font_scale`. The margin scales with the canvas width relative to
    /// `reference_width`, so a 1080-wide canvas gets exactly `margin`.
    pub fn new(font_size: f32, canvas_width: u32, config: &CaptionConfig) -> Self {
        let size = if font_size.is_finite() {
            font_size.clamp(config.min_font_size, config.max_font_size)
        } else {
            config.min_font_size
        };
        let px = size * config.font_scale;
        Self {
            px,
            line_height: px * config.line_height,
            margin: config.margin * canvas_width as f32 / config.reference_width,
        }
    }

    /// Widest a line may be before it wraps.
    pub fn max_line_width(&self, canvas_width: u32) -> f32 {
        (canvas_width as f32 - 2.0 * self.margin).max(0.0)
    }
}

/// Greedy word wrap.
///
/// Words are separated by whitespace; a newline always starts a new line.
/// A word is appended to the current line if the result fits `max_width`,
/// otherwise it starts the next line. A single word wider than `max_width`
/// occupies its own line and is never split. A caption with no visible text
/// yields no lines.
pub fn wrap_caption(caption: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in caption.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }

    if lines.iter().all(String::is_empty) {
        return Vec::new();
    }
    // Blank paragraphs in the middle keep their vertical space; trailing ones don't
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Anchor wrapped lines to the canvas.
///
/// The block is bottom-anchored: the last line's bottom sits `margin` above
/// the bottom edge and earlier lines stack upward by `line_height`.
/// Horizontally each line is placed independently: left lines start at
/// `margin`, right lines end at `width - margin`, centered lines are centered
/// on the canvas.
pub fn position_lines(
    lines: Vec<String>,
    canvas: (u32, u32),
    alignment: Alignment,
    metrics: &CaptionMetrics,
    measure: impl Fn(&str) -> f32,
) -> Vec<CaptionLine> {
    let (width, height) = (canvas.0 as f32, canvas.1 as f32);
    let last_bottom = height - metrics.margin;
    let count = lines.len();

    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let line_width = measure(&text);
            let x = match alignment {
                Alignment::Left => metrics.margin,
                Alignment::Center => width / 2.0 - line_width / 2.0,
                Alignment::Right => width - metrics.margin - line_width,
            };
            let bottom = last_bottom - (count - 1 - i) as f32 * metrics.line_height;
            CaptionLine {
                text,
                x,
                bottom,
                width: line_width,
            }
        })
        .collect()
}

/// Bottom shadow for a canvas of `height` pixels.
///
/// `intensity` is clamped to 0–1 (non-finite becomes 0).
pub fn gradient_overlay(intensity: f32, height: u32, config: &OverlayConfig) -> GradientOverlay {
    let max_alpha = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    GradientOverlay {
        start_y: (height as f32 * config.gradient_start.clamp(0.0, 1.0)) as f64,
        max_alpha,
    }
}

/// Black opacity of canvas row `row`, sampled at the pixel center.
///
/// Zero above `start_y`, rising linearly to `max_alpha` at the bottom edge.
pub fn gradient_alpha(overlay: &GradientOverlay, height: u32, row: u32) -> f32 {
    let span = height as f64 - overlay.start_y;
    if span <= 0.0 {
        return 0.0;
    }
    let t = ((row as f64 + 0.5 - overlay.start_y) / span).clamp(0.0, 1.0);
    overlay.max_alpha * t as f32
}
