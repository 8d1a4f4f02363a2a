//! Pure Rust rasterization backend.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Crop + scale the visible region | `DynamicImage::crop_imm` + `resize_exact` with `Lanczos3` |
//! | Composite onto the canvas | `image::imageops::overlay` |
//! | Bottom shadow | per-row blend toward black |
//! | Caption glyphs | `ab_glyph` outlines, coverage-blended |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! The canvas starts opaque black, so any area the image does not cover
//! (which the geometry rules out) would show as black rather than garbage.

use super::backend::{Dimensions, RenderBackend, RenderError};
use super::fonts::px_scale;
use super::layout::gradient_alpha;
use super::params::{CaptionPlan, GradientOverlay, RenderPlan};
use crate::geometry::Placement;
use ab_glyph::{Font, FontArc, ScaleFont, point};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True if `path` has an extension in [`supported_input_extensions`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let e = e.to_ascii_lowercase();
            supported_input_extensions().contains(&e.as_str())
        })
}

/// Pure Rust backend using the `image` and `ab_glyph` crates.
///
/// See the [module docs](self) for the crate-to-step mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> RenderError {
    RenderError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, RenderError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Draw the visible part of `image` into `canvas` at `placement`.
///
/// Only the whole source pixels that land on the canvas are resampled, so a
/// 4× zoom on a large photo does not scale the whole photo. The crop is
/// resized to the size those pixels have in `placement` and drawn where they
/// sit in it, which keeps the sub-pixel offset of the pan.
fn draw_image(canvas: &mut RgbaImage, image: &DynamicImage, placement: &Placement) {
    let (cw, ch) = canvas.dimensions();
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 || placement.width <= 0.0 || placement.height <= 0.0 {
        return;
    }

    // Destination pixels per source pixel
    let kx = placement.width / iw as f64;
    let ky = placement.height / ih as f64;
    let Some((crop_x, crop_w)) = visible_span(placement.x, kx, iw, cw) else {
        return;
    };
    let Some((crop_y, crop_h)) = visible_span(placement.y, ky, ih, ch) else {
        return;
    };

    let left = (placement.x + crop_x as f64 * kx).round();
    let right = (placement.x + (crop_x + crop_w) as f64 * kx).round();
    let top = (placement.y + crop_y as f64 * ky).round();
    let bottom = (placement.y + (crop_y + crop_h) as f64 * ky).round();
    let width = (right - left).max(1.0) as u32;
    let height = (bottom - top).max(1.0) as u32;

    let visible = image
        .crop_imm(crop_x, crop_y, crop_w, crop_h)
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();
    imageops::overlay(canvas, &visible, left as i64, top as i64);
}

/// Source pixels `(start, len)` along one axis that cover any of the
/// `extent` destination pixels, for an image starting at `origin` with `k`
/// destination pixels per source pixel.
fn visible_span(origin: f64, k: f64, source: u32, extent: u32) -> Option<(u32, u32)> {
    let start = (-origin / k).floor().clamp(0.0, source as f64);
    let end = ((extent as f64 - origin) / k).ceil().clamp(0.0, source as f64);
    (end > start).then(|| (start as u32, (end - start) as u32))
}

/// Darken rows toward black following the overlay ramp.
fn draw_gradient(canvas: &mut RgbaImage, gradient: &GradientOverlay) {
    let height = canvas.height();
    for (row, pixels) in canvas.enumerate_rows_mut() {
        let alpha = gradient_alpha(gradient, height, row);
        if alpha <= 0.0 {
            continue;
        }
        let keep = 1.0 - alpha;
        for (_, _, px) in pixels {
            for channel in &mut px.0[..3] {
                *channel = (*channel as f32 * keep).round() as u8;
            }
        }
    }
}

fn draw_caption(canvas: &mut RgbaImage, caption: &CaptionPlan, font: &FontArc) {
    let (cw, ch) = canvas.dimensions();
    let scale = px_scale(font, caption.px);
    let scaled = font.as_scaled(scale);
    let [r, g, b, a] = caption.color.0;
    let opacity = a as f32 / 255.0;

    for line in &caption.lines {
        // Lines are laid out by their bottom edge; descent is negative
        let baseline = line.bottom + scaled.descent();
        let mut caret = line.x;
        let mut prev = None;

        for c in line.text.chars() {
            let gid = font.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, gid);
            }
            let glyph = gid.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(gid);
            prev = Some(gid);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                if x < 0 || y < 0 || x >= cw as i64 || y >= ch as i64 {
                    return;
                }
                let alpha = coverage.clamp(0.0, 1.0) * opacity;
                let px = canvas.get_pixel_mut(x as u32, y as u32);
                for (dst, src) in px.0[..3].iter_mut().zip([r, g, b]) {
                    *dst = (*dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8;
                }
            });
        }
    }
}

fn encode_jpeg(canvas: RgbaImage, quality: u8) -> Result<Vec<u8>, RenderError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8());
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

impl RenderBackend for RustBackend {
    fn identify(&self, source: &Path) -> Result<Dimensions, RenderError> {
        let (width, height) =
            image::image_dimensions(source).map_err(|e| decode_error(source, e))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, source: &Path) -> Result<DynamicImage, RenderError> {
        load_image(source)
    }

    fn rasterize(
        &self,
        image: &DynamicImage,
        plan: &RenderPlan,
        font: Option<&FontArc>,
    ) -> Result<Vec<u8>, RenderError> {
        let (width, height) = plan.canvas;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyCanvas { width, height });
        }

        let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        draw_image(&mut canvas, image, &plan.placement);
        draw_gradient(&mut canvas, &plan.gradient);
        if let (Some(caption), Some(font)) = (&plan.caption, font) {
            draw_caption(&mut canvas, caption, font);
        }
        encode_jpeg(canvas, plan.quality.value())
    }
}
