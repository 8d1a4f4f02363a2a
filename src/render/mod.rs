//! Slide rasterization: pure Rust, no system libraries.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, WebP) |
//! | **Compose** | cover placement + `resize_exact` (Lanczos3) + `overlay` |
//! | **Caption** | `ab_glyph` outlines from configured font files |
//! | **Encode** | `JpegEncoder` at the configured quality (default 90) |
//!
//! The module is split into:
//! - **Layout**: Pure functions for caption wrapping, anchoring and the shadow ramp
//! - **Parameters**: [`RenderPlan`] and the types it is built from
//! - **Fonts**: [`FontFamily`] keys and the [`FontBook`] that loads them
//! - **Backend**: [`RenderBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining layout + backend

pub mod backend;
pub mod fonts;
pub mod layout;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, RenderBackend, RenderError};
pub use fonts::{FontBook, FontFamily};
pub use operations::{
    CaptionStatus, ExportOutcome, SlideGeometry, export_filename, export_slide, inspect_slide,
    plan_slide, render_slide,
};
pub use params::{CaptionLine, CaptionPlan, GradientOverlay, Quality, RenderPlan, Rgba};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
