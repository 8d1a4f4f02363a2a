//! # Carousel Studio
//!
//! Photo carousel slides for social feeds. Each slide pairs one photo with a
//! styled caption, is cropped to a fixed aspect ratio by panning and zooming,
//! and exports as a JPEG at the platform's native size.
//!
//! # Architecture: One Composition Law
//!
//! The live preview and the exported raster must show the same crop. Both go
//! through [`geometry::place`], which composes three steps in a fixed order:
//!
//! ```text
//! 1. Cover fit   image + frame          →  overflow % per axis  (≥ 100, one side = 100)
//! 2. Pan         position (% of frame)  →  translated center
//! 3. Scale       scale ≥ 1              →  enlarged about that center
//! ```
//!
//! Positions are stored in percent of the frame, never in pixels, so a crop
//! chosen in a 540 px preview lands on the same content in a 1080 px export.
//! [`geometry::bounds`] limits the pan so no edge of the frame is ever
//! uncovered, and every state change that shrinks those bounds re-clamps the
//! position immediately ([`controller::TransformController`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Cover fit, pan bounds, clamping, and pixel placement |
//! | [`aspect`] | The fixed aspect ratio table and ratio-string parsing |
//! | [`types`] | [`Slide`](types::Slide) record and partial [`SlideUpdate`](types::SlideUpdate)s |
//! | [`controller`] | Idle/Dragging pan-and-zoom state machine with re-clamping |
//! | [`render`] | Caption layout, fonts, rasterization backend, JPEG export |
//! | [`export_worker`] | Background export thread, one job per slide at a time |
//! | [`deck`] | Ordered slide collection persisted as JSON |
//! | [`check`] | Deck validation without exporting |
//! | [`config`] | `studio.toml` loading, merging, and validation |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Updates, Not Replacements
//!
//! The controller never mutates a slide. It returns a
//! [`SlideUpdate`](types::SlideUpdate) carrying only the fields that changed,
//! and whoever owns the slide merges it. This keeps the controller free of
//! storage concerns and lets the CLI, a GUI, or a test drive it identically.
//!
//! ## Pure-Rust Rasterization
//!
//! Decoding, resampling, and JPEG encoding use the `image` crate; captions are
//! drawn from TTF/OTF outlines with `ab_glyph`. No system libraries are needed
//! and no font data is compiled in: font files are named in `studio.toml`.

pub mod aspect;
pub mod check;
pub mod config;
pub mod controller;
pub mod deck;
pub mod export_worker;
pub mod geometry;
pub mod logging;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
