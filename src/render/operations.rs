//! High-level export operations.
//!
//! These functions combine the layout calculations with backend execution:
//! decode the source, resolve the slide into a [`RenderPlan`] for its export
//! canvas, rasterize, and write the JPEG.

use super::backend::{Dimensions, RenderBackend, RenderError};
use super::fonts::{FontBook, FontFamily, measure_line, px_scale};
use super::layout::{CaptionMetrics, gradient_overlay, position_lines, wrap_caption};
use super::params::{CaptionPlan, Quality, RenderPlan, Rgba};
use crate::config::StudioConfig;
use crate::geometry::{self, Bounds, CoverDimensions, Size};
use crate::types::Slide;
use ab_glyph::FontArc;
use image::GenericImageView;
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// What happened to a slide's caption during rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStatus {
    /// Drawn with `family` (which may be the Inter fallback).
    Rendered { lines: usize, family: FontFamily },
    /// The caption has no visible text.
    Empty,
    /// No font file for the requested family or for Inter.
    NoFont { requested: FontFamily },
}

impl CaptionStatus {
    pub fn is_rendered(self) -> bool {
        matches!(self, CaptionStatus::Rendered { .. })
    }
}

/// A resolved plan plus the font its caption was measured with.
#[derive(Debug, Clone)]
pub struct SlidePlan {
    pub plan: RenderPlan,
    pub font: Option<FontArc>,
    pub caption: CaptionStatus,
}

/// Encoded raster for one slide.
#[derive(Debug, Clone)]
pub struct RenderedSlide {
    pub bytes: Vec<u8>,
    pub plan: RenderPlan,
    pub caption: CaptionStatus,
}

/// A slide written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub id: String,
    pub path: PathBuf,
    pub canvas: (u32, u32),
    pub caption: CaptionStatus,
}

/// Geometry of a slide on its export canvas, without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideGeometry {
    pub image: Dimensions,
    pub canvas: (u32, u32),
    pub cover: CoverDimensions,
    pub bounds: Bounds,
    /// Whether the stored position is within `bounds`.
    pub in_bounds: bool,
}

/// File name for a slide's export: `slide-<id>.jpg`.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced so the name is always a
/// single path component.
pub fn export_filename(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("slide-{safe}.jpg")
}

/// Resolve a slide into a plan for a canvas of the given size.
///
/// The stored position is clamped against the canvas bounds before use, so
/// a stale position can never expose an edge. A non-empty caption without
/// any usable font is left out of the plan and reported as
/// [`CaptionStatus::NoFont`].
pub fn plan_slide(
    slide: &Slide,
    image: Dimensions,
    canvas: (u32, u32),
    config: &StudioConfig,
    fonts: &FontBook,
) -> Result<SlidePlan> {
    let (width, height) = canvas;
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyCanvas { width, height });
    }

    let image_size = Size::from((image.width, image.height));
    let frame = Size::from(canvas);
    let scale = slide.effective_scale();
    let bounds = geometry::bounds_for(image_size, frame, scale).unwrap_or(Bounds::LOCKED);
    let position = geometry::clamp(slide.effective_position(), bounds);
    if position != slide.image_position {
        tracing::debug!(
            slide = %slide.id,
            stored_x = slide.image_position.x,
            stored_y = slide.image_position.y,
            x = position.x,
            y = position.y,
            "clamped position for export"
        );
    }

    let (caption, font, status) = plan_caption(slide, canvas, config, fonts);

    Ok(SlidePlan {
        plan: RenderPlan {
            canvas,
            placement: geometry::place(image_size, frame, position, scale),
            gradient: gradient_overlay(slide.gradient_intensity, height, &config.overlay),
            caption,
            quality: Quality::new(config.export.quality),
        },
        font,
        caption: status,
    })
}

fn plan_caption(
    slide: &Slide,
    canvas: (u32, u32),
    config: &StudioConfig,
    fonts: &FontBook,
) -> (Option<CaptionPlan>, Option<FontArc>, CaptionStatus) {
    if slide.caption.trim().is_empty() {
        return (None, None, CaptionStatus::Empty);
    }

    let requested = FontFamily::resolve(&slide.font_family);
    let Some((family, font)) = fonts.resolve(requested) else {
        tracing::warn!(
            slide = %slide.id,
            font = requested.key(),
            "no font available, exporting without caption"
        );
        return (None, None, CaptionStatus::NoFont { requested });
    };

    let metrics = CaptionMetrics::new(slide.font_size, canvas.0, &config.caption);
    let scale = px_scale(&font, metrics.px);
    let measure = |text: &str| measure_line(&font, scale, text);

    let wrapped = wrap_caption(&slide.caption, metrics.max_line_width(canvas.0), measure);
    let lines = position_lines(wrapped, canvas, slide.alignment, &metrics, measure);
    let status = CaptionStatus::Rendered {
        lines: lines.len(),
        family,
    };

    let plan = CaptionPlan {
        family,
        px: metrics.px,
        line_height: metrics.line_height,
        color: Rgba::from_hex_or_white(&slide.text_color),
        lines,
    };
    (Some(plan), Some(font), status)
}

/// Decode a slide's image and rasterize it at its export size.
pub fn render_slide(
    backend: &impl RenderBackend,
    slide: &Slide,
    config: &StudioConfig,
    fonts: &FontBook,
) -> Result<RenderedSlide> {
    let image = backend.decode(Path::new(&slide.image_source))?;
    let (width, height) = image.dimensions();
    let canvas = slide.aspect().export_size();

    let SlidePlan {
        plan,
        font,
        caption,
    } = plan_slide(slide, Dimensions { width, height }, canvas, config, fonts)?;
    let bytes = backend.rasterize(&image, &plan, font.as_ref())?;

    Ok(RenderedSlide {
        bytes,
        plan,
        caption,
    })
}

/// Render a slide and write it to `output_dir` as `slide-<id>.jpg`.
///
/// The JPEG is written to a hidden temporary file and renamed into place,
/// so a failed export never leaves a partial file under the final name.
pub fn export_slide(
    backend: &impl RenderBackend,
    slide: &Slide,
    config: &StudioConfig,
    fonts: &FontBook,
    output_dir: &Path,
) -> Result<ExportOutcome> {
    let rendered = render_slide(backend, slide, config, fonts)?;

    fs::create_dir_all(output_dir)?;
    let filename = export_filename(&slide.id);
    let path = output_dir.join(&filename);
    let partial = output_dir.join(format!(".{filename}.part"));

    if let Err(e) = fs::write(&partial, &rendered.bytes).and_then(|()| fs::rename(&partial, &path))
    {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    tracing::info!(
        slide = %slide.id,
        path = %path.display(),
        bytes = rendered.bytes.len(),
        "exported slide"
    );

    Ok(ExportOutcome {
        id: slide.id.clone(),
        path,
        canvas: rendered.plan.canvas,
        caption: rendered.caption,
    })
}

/// Identify a slide's image and compute its export-canvas geometry.
pub fn inspect_slide(backend: &impl RenderBackend, slide: &Slide) -> Result<SlideGeometry> {
    let image = backend.identify(Path::new(&slide.image_source))?;
    let canvas = slide.aspect().export_size();
    let image_size = Size::from((image.width, image.height));
    let cover = geometry::cover_dimensions(image_size, Size::from(canvas));
    let bounds = geometry::bounds(cover, slide.effective_scale());

    Ok(SlideGeometry {
        image,
        canvas,
        cover,
        bounds,
        in_bounds: bounds.contains(slide.effective_position()),
    })
}
