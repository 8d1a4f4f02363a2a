//! Rasterization backend trait and shared types.
//!
//! The [`RenderBackend`] trait covers the three steps every export needs:
//! identify (dimensions only), decode, and rasterize a [`RenderPlan`] into
//! encoded JPEG bytes. Everything above it is backend-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `ab_glyph` crates.

use super::params::RenderPlan;
use ab_glyph::FontArc;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Canvas has no area ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for rasterization backends.
pub trait RenderBackend: Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, source: &Path) -> Result<Dimensions, RenderError>;

    /// Decode the full source image.
    fn decode(&self, source: &Path) -> Result<DynamicImage, RenderError>;

    /// Draw `image` according to `plan` and encode the canvas as JPEG.
    ///
    /// `font` is the face the caption lines were measured with; it is `None`
    /// exactly when `plan.caption` is `None`.
    fn rasterize(
        &self,
        image: &DynamicImage,
        plan: &RenderPlan,
        font: Option<&FontArc>,
    ) -> Result<Vec<u8>, RenderError>;
}
