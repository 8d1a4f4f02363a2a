//! Shared test utilities.
//!
//! Synthetic JPEG fixtures for backend tests. Images are generated on the
//! fly into a caller-owned `TempDir` so tests stay isolated.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("split.jpg");
//! create_split_jpeg(&path, 400, 200); // red left half, blue right half
//! ```

use ab_glyph::FontArc;
use image::{ImageEncoder, RgbImage};
use std::path::Path;

// =========================================================================
// Fixture images
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    write_jpeg(&img, path);
}

/// Create a JPEG whose left half is pure red and right half pure blue.
///
/// The seam sits at `width / 2`, which makes horizontal placement visible in
/// rendered output.
pub fn create_split_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        }
    });
    write_jpeg(&img, path);
}

// =========================================================================
// Fonts
// =========================================================================

/// Common install locations of DejaVu Sans.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

/// A real TTF from the host, or `None` when none is installed.
///
/// Tests that need real glyph metrics return early on `None`.
pub fn system_font() -> Option<FontArc> {
    SYSTEM_FONTS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .and_then(|p| std::fs::read(p).ok())
        .and_then(|bytes| FontArc::try_from_vec(bytes).ok())
}

fn write_jpeg(img: &RgbImage, path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}
