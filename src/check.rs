//! Deck validation without exporting.
//!
//! Reports, per slide, anything that would make an export differ from what
//! the stored slide suggests: an unreadable image, a stored position outside
//! the export bounds (it will be clamped), a ratio string not in the table
//! (it will render 1:1), a font that will fall back or be skipped, and a
//! color that will render white.

use crate::aspect::AspectRatio;
use crate::deck::Deck;
use crate::render::{FontBook, FontFamily, RenderBackend, Rgba, inspect_slide};
use crate::types::Slide;

/// One problem found on a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    /// The image could not be identified.
    Unreadable(String),
    /// Stored position exceeds the export bounds.
    OutOfBounds { x: f64, y: f64, max_x: f64, max_y: f64 },
    /// Ratio string not in the table.
    UnknownAspect(String),
    /// Font family name not recognized.
    UnknownFont(String),
    /// No font file for the family; Inter will be used.
    FontFallback(FontFamily),
    /// No font file for the family or for Inter; the caption will be skipped.
    NoFont(FontFamily),
    /// Text color is not valid hex.
    BadColor(String),
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::Unreadable(e) => write!(f, "image unreadable: {e}"),
            Issue::OutOfBounds { x, y, max_x, max_y } => write!(
                f,
                "position ({x:.1}, {y:.1}) outside bounds ±{max_x:.1} × ±{max_y:.1}, will be clamped"
            ),
            Issue::UnknownAspect(r) => write!(f, "aspect ratio '{r}' unknown, renders as 1 / 1"),
            Issue::UnknownFont(name) => write!(f, "font '{name}' unknown, renders as inter"),
            Issue::FontFallback(family) => {
                write!(f, "no font file for {family}, falls back to inter")
            }
            Issue::NoFont(family) => {
                write!(f, "no font file for {family} or inter, caption will be skipped")
            }
            Issue::BadColor(c) => write!(f, "text color '{c}' invalid, renders white"),
        }
    }
}

/// Issues for one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideCheck {
    pub id: String,
    pub issues: Vec<Issue>,
}

impl SlideCheck {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Returned by [`ensure_clean`] when any slide has issues.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{failing} of {total} slides have issues")]
pub struct CheckFailed {
    pub failing: usize,
    pub total: usize,
}

/// `Err` if any slide reported an issue, so `check` can gate scripts.
pub fn ensure_clean(results: &[SlideCheck]) -> Result<(), CheckFailed> {
    let failing = results.iter().filter(|r| !r.is_ok()).count();
    if failing == 0 {
        Ok(())
    } else {
        Err(CheckFailed {
            failing,
            total: results.len(),
        })
    }
}

/// Check every slide in deck order.
pub fn check_deck(deck: &Deck, backend: &impl RenderBackend, fonts: &FontBook) -> Vec<SlideCheck> {
    deck.slides
        .iter()
        .map(|slide| SlideCheck {
            id: slide.id.clone(),
            issues: check_slide(slide, backend, fonts),
        })
        .collect()
}

pub fn check_slide(slide: &Slide, backend: &impl RenderBackend, fonts: &FontBook) -> Vec<Issue> {
    let mut issues = Vec::new();

    match inspect_slide(backend, slide) {
        Ok(geometry) if !geometry.in_bounds => {
            let p = slide.effective_position();
            issues.push(Issue::OutOfBounds {
                x: p.x,
                y: p.y,
                max_x: geometry.bounds.x,
                max_y: geometry.bounds.y,
            });
        }
        Ok(_) => {}
        Err(e) => issues.push(Issue::Unreadable(e.to_string())),
    }

    if AspectRatio::parse(&slide.aspect_ratio).is_none() {
        issues.push(Issue::UnknownAspect(slide.aspect_ratio.clone()));
    }

    if !slide.caption.trim().is_empty() {
        let family = match FontFamily::parse(&slide.font_family) {
            Some(family) => family,
            None => {
                issues.push(Issue::UnknownFont(slide.font_family.clone()));
                FontFamily::Inter
            }
        };
        if !fonts.is_available(family) {
            if family != FontFamily::Inter && fonts.is_available(FontFamily::Inter) {
                issues.push(Issue::FontFallback(family));
            } else {
                issues.push(Issue::NoFont(family));
            }
        }
        if Rgba::from_hex(&slide.text_color).is_none() {
            issues.push(Issue::BadColor(slide.text_color.clone()));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlideDefaults;
    use crate::geometry::Position;
    use crate::render::backend::tests::MockBackend;
    use std::path::Path;

    fn deck() -> Deck {
        let mut deck = Deck::new();
        deck.add_image(Path::new("/p/a.jpg"), &SlideDefaults::default());
        deck
    }

    #[test]
    fn clean_slide_without_caption_has_no_issues() {
        let mut deck = deck();
        deck.slides[0].caption.clear();
        let results = check_deck(&deck, &MockBackend::new(), &FontBook::empty());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok(), "{:?}", results[0].issues);
    }

    #[test]
    fn caption_without_fonts_is_reported() {
        let issues = check_slide(&deck().slides[0], &MockBackend::new(), &FontBook::empty());
        assert_eq!(issues, vec![Issue::NoFont(FontFamily::Inter)]);
    }

    #[test]
    fn out_of_bounds_position_is_reported() {
        let mut slide = deck().slides[0].clone();
        slide.caption.clear();
        slide.image_position = Position::new(0.0, 30.0);
        // 400×300 on a square canvas only pans horizontally
        let issues = check_slide(&slide, &MockBackend::new(), &FontBook::empty());
        assert!(matches!(issues[0], Issue::OutOfBounds { max_y, .. } if max_y == 0.0));
    }

    #[test]
    fn unreadable_image_and_bad_fields_are_reported() {
        let mut slide = deck().slides[0].clone();
        slide.image_source = "/p/broken.jpg".into();
        slide.aspect_ratio = "3 / 2".into();
        slide.font_family = "comic-sans".into();
        slide.text_color = "teal".into();
        let backend = MockBackend::new().failing_on("broken.jpg");

        let issues = check_slide(&slide, &backend, &FontBook::empty());
        assert!(matches!(issues[0], Issue::Unreadable(_)));
        assert!(issues.contains(&Issue::UnknownAspect("3 / 2".into())));
        assert!(issues.contains(&Issue::UnknownFont("comic-sans".into())));
        assert!(issues.contains(&Issue::BadColor("teal".into())));
    }

    #[test]
    fn ensure_clean_fails_when_any_slide_has_issues() {
        let mut deck = deck();
        deck.add_image(Path::new("/p/b.jpg"), &SlideDefaults::default());
        deck.slides[0].caption.clear();
        let results = check_deck(&deck, &MockBackend::new(), &FontBook::empty());

        let err = ensure_clean(&results).unwrap_err();
        assert_eq!(err, CheckFailed { failing: 1, total: 2 });
        assert_eq!(err.to_string(), "1 of 2 slides have issues");
    }

    #[test]
    fn ensure_clean_passes_a_clean_deck() {
        let mut deck = deck();
        deck.slides[0].caption.clear();
        let results = check_deck(&deck, &MockBackend::new(), &FontBook::empty());
        assert_eq!(ensure_clean(&results), Ok(()));
    }

    #[test]
    fn issues_display_as_sentences() {
        let text = Issue::UnknownAspect("3 / 2".into()).to_string();
        assert_eq!(text, "aspect ratio '3 / 2' unknown, renders as 1 / 1");
    }
}
