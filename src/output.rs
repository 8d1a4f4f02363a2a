//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every slide is shown by its positional index and id first, with the
//! source path and geometry as indented context lines. The same header is
//! used by `list`, `check` and the edit commands, so a slide reads the same
//! everywhere.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Slides (2)
//! 001 3f2a9c01b7de (active)
//!     Source: /photos/dawn.jpg
//!     Aspect: Portrait 4 / 5 → 1080×1350
//!     Image: 4032×3024, cover 166.7% × 100.0%
//!     Transform: scale 1.00, position (0.0, 0.0), bounds ±33.3% × ±0.0%
//!     Caption: "Write your caption here..." (inter, 18px, center, #FFFFFF)
//! 002 91cc04e1a2b3
//!     ...
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 3f2a9c01b7de ok
//! 002 91cc04e1a2b3
//!     position (40.0, 0.0) outside bounds ±33.3% × ±0.0%, will be clamped
//!
//! 1 of 2 slides have issues
//! ```
//!
//! ## Export
//!
//! ```text
//! 3f2a9c01b7de → exports/slide-3f2a9c01b7de.jpg (1080×1350)
//! 91cc04e1a2b3 failed: Failed to decode /photos/x.jpg: ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the binary needs it, a `print_*` wrapper that
//! writes to stdout. Format functions are pure: no I/O, no side effects.

use crate::check::SlideCheck;
use crate::deck::Deck;
use crate::export_worker::ExportEvent;
use crate::render::{CaptionStatus, SlideGeometry};
use crate::types::Slide;

// ============================================================================
// Shared slide display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Slide header: positional index + id, marking the active slide.
///
/// ```text
/// 001 3f2a9c01b7de (active)
/// 002 91cc04e1a2b3
/// ```
fn slide_header(index: usize, slide: &Slide, active: bool) -> String {
    if active {
        format!("{} {} (active)", format_index(index), slide.id)
    } else {
        format!("{} {}", format_index(index), slide.id)
    }
}

/// Truncate a caption for display, appending "..." if truncated.
fn truncate_caption(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let truncated: String = flat.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

/// Context lines for one slide.
fn slide_details(slide: &Slide, geometry: Option<&SlideGeometry>) -> Vec<String> {
    let aspect = slide.aspect();
    let (w, h) = aspect.export_size();
    let mut lines = vec![
        format!("    Source: {}", slide.image_source),
        format!("    Aspect: {} {} → {}×{}", aspect.label(), aspect, w, h),
    ];

    let position = slide.effective_position();
    match geometry {
        Some(g) => {
            lines.push(format!(
                "    Image: {}×{}, cover {:.1}% × {:.1}%",
                g.image.width, g.image.height, g.cover.width, g.cover.height
            ));
            lines.push(format!(
                "    Transform: scale {:.2}, position ({:.1}, {:.1}), bounds ±{:.1}% × ±{:.1}%",
                slide.effective_scale(),
                position.x,
                position.y,
                g.bounds.x,
                g.bounds.y
            ));
        }
        None => {
            lines.push("    Image: unreadable".to_string());
            lines.push(format!(
                "    Transform: scale {:.2}, position ({:.1}, {:.1})",
                slide.effective_scale(),
                position.x,
                position.y
            ));
        }
    }

    if slide.caption.trim().is_empty() {
        lines.push("    Caption: (none)".to_string());
    } else {
        lines.push(format!(
            "    Caption: \"{}\" ({}, {}px, {}, {})",
            truncate_caption(&slide.caption, 40),
            slide.font_family,
            slide.font_size,
            slide.alignment,
            slide.text_color
        ));
    }
    lines
}

// ============================================================================
// list
// ============================================================================

/// Format the whole deck. `geometries` is index-aligned with `deck.slides`;
/// `None` marks an unreadable image.
pub fn format_deck(deck: &Deck, geometries: &[Option<SlideGeometry>]) -> Vec<String> {
    if deck.is_empty() {
        return vec!["No slides".to_string()];
    }

    let mut lines = vec![format!("Slides ({})", deck.len())];
    for (i, slide) in deck.slides.iter().enumerate() {
        let active = deck.active.as_deref() == Some(slide.id.as_str());
        lines.push(slide_header(i + 1, slide, active));
        lines.extend(slide_details(slide, geometries.get(i).copied().flatten().as_ref()));
    }
    lines
}

pub fn print_deck(deck: &Deck, geometries: &[Option<SlideGeometry>]) {
    for line in format_deck(deck, geometries) {
        println!("{}", line);
    }
}

/// Format one slide after an edit.
pub fn format_slide(deck: &Deck, slide: &Slide, geometry: Option<&SlideGeometry>) -> Vec<String> {
    let index = deck
        .slides
        .iter()
        .position(|s| s.id == slide.id)
        .map_or(0, |i| i + 1);
    let active = deck.active.as_deref() == Some(slide.id.as_str());
    let mut lines = vec![slide_header(index, slide, active)];
    lines.extend(slide_details(slide, geometry));
    lines
}

// ============================================================================
// check
// ============================================================================

/// Format check results with a summary line.
pub fn format_check(deck: &Deck, results: &[SlideCheck]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        let Some(slide) = deck.get(&result.id) else {
            continue;
        };
        let active = deck.active.as_deref() == Some(slide.id.as_str());
        if result.is_ok() {
            lines.push(format!("{} ok", slide_header(i + 1, slide, active)));
        } else {
            lines.push(slide_header(i + 1, slide, active));
            lines.extend(result.issues.iter().map(|issue| format!("    {}", issue)));
        }
    }

    let failing = results.iter().filter(|r| !r.is_ok()).count();
    lines.push(String::new());
    if failing == 0 {
        lines.push(format!("All {} slides ok", results.len()));
    } else {
        lines.push(format!(
            "{} of {} slides have issues",
            failing,
            results.len()
        ));
    }
    lines
}

pub fn print_check(deck: &Deck, results: &[SlideCheck]) {
    for line in format_check(deck, results) {
        println!("{}", line);
    }
}

// ============================================================================
// export
// ============================================================================

/// Format a single export result.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Finished(outcome) => {
            let (w, h) = outcome.canvas;
            let mut lines = vec![format!(
                "{} → {} ({}×{})",
                outcome.id,
                outcome.path.display(),
                w,
                h
            )];
            if let CaptionStatus::NoFont { requested } = outcome.caption {
                lines.push(format!("    caption skipped: no font for {}", requested));
            }
            lines
        }
        ExportEvent::Failed { id, message } => vec![format!("{} failed: {}", id, message)],
    }
}
