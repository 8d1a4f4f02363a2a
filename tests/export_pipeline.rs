//! End-to-end export through the pure-Rust backend.
//!
//! Each test writes a synthetic JPEG, exports it with real decoding,
//! resampling, and encoding, then decodes the result and samples pixels.
//! The source image for placement tests is a red/blue split, so the seam's
//! position on the canvas shows exactly where the crop landed.

use carousel_studio::config::{self, StudioConfig};
use carousel_studio::export_worker::{ExportEvent, Exporter, Submission};
use carousel_studio::geometry::Position;
use carousel_studio::render::{
    CaptionStatus, FontBook, FontFamily, RustBackend, export_slide, inspect_slide,
};
use carousel_studio::types::Slide;
use image::{GenericImageView, ImageEncoder, RgbImage, Rgba};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn stock_config(tmp: &Path) -> StudioConfig {
    config::load_config(&tmp.join("absent.toml")).unwrap()
}

fn write_jpeg(img: &RgbImage, path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new_with_quality(std::io::BufWriter::new(file), 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Red left half, blue right half.
fn split_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        }
    });
    write_jpeg(&img, path);
}

fn plain_jpeg(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    write_jpeg(&RgbImage::from_pixel(width, height, image::Rgb(rgb)), path);
}

fn slide(source: &Path, config: &StudioConfig) -> Slide {
    let mut slide = Slide::new("s1", source.to_string_lossy(), &config.defaults);
    slide.caption.clear();
    slide.gradient_intensity = 0.0;
    slide
}

fn is_red(px: Rgba<u8>) -> bool {
    px[0] > 200 && px[2] < 60
}

fn is_blue(px: Rgba<u8>) -> bool {
    px[2] > 200 && px[0] < 60
}

// =========================================================================
// Placement
// =========================================================================

#[test]
fn centered_wide_image_puts_seam_at_canvas_center() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("split.jpg");
    split_jpeg(&source, 2160, 1080);
    let slide = slide(&source, &config);

    let out = tmp.path().join("out");
    let outcome = export_slide(&RustBackend::new(), &slide, &config, &FontBook::empty(), &out)
        .unwrap();

    assert_eq!(outcome.canvas, (1080, 1080));
    let img = image::open(&outcome.path).unwrap();
    assert_eq!(img.dimensions(), (1080, 1080));
    assert!(is_red(img.get_pixel(530, 540)));
    assert!(is_blue(img.get_pixel(550, 540)));
}

#[test]
fn panned_to_left_edge_shows_only_the_left_half() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("split.jpg");
    split_jpeg(&source, 2160, 1080);
    let mut slide = slide(&source, &config);
    slide.image_position = Position::new(50.0, 0.0);

    let outcome = export_slide(
        &RustBackend::new(),
        &slide,
        &config,
        &FontBook::empty(),
        tmp.path(),
    )
    .unwrap();

    let img = image::open(&outcome.path).unwrap();
    for x in [5, 540, 1000] {
        assert!(is_red(img.get_pixel(x, 540)), "x={x} should be red");
    }
}

#[test]
fn out_of_bounds_position_is_clamped_before_drawing() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("split.jpg");
    split_jpeg(&source, 2160, 1080);
    let mut slide = slide(&source, &config);
    slide.image_position = Position::new(-400.0, 0.0);

    let outcome = export_slide(
        &RustBackend::new(),
        &slide,
        &config,
        &FontBook::empty(),
        tmp.path(),
    )
    .unwrap();

    // Clamped to -50: the right half fills the frame, no black border
    let img = image::open(&outcome.path).unwrap();
    assert!(is_blue(img.get_pixel(5, 540)));
    assert!(is_blue(img.get_pixel(1075, 540)));
}

#[test]
fn each_aspect_ratio_exports_at_its_native_size() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("photo.jpg");
    plain_jpeg(&source, 640, 480, [90, 140, 60]);

    for (ratio, expected) in [
        ("1 / 1", (1080, 1080)),
        ("4 / 5", (1080, 1350)),
        ("9 / 16", (1080, 1920)),
        ("16 / 9", (1920, 1080)),
    ] {
        let mut slide = slide(&source, &config);
        slide.aspect_ratio = ratio.to_string();
        let outcome = export_slide(
            &RustBackend::new(),
            &slide,
            &config,
            &FontBook::empty(),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(outcome.canvas, expected, "{ratio}");
        assert_eq!(image::open(&outcome.path).unwrap().dimensions(), expected);
    }
}

#[test]
fn inspect_agrees_with_export_canvas() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("photo.jpg");
    plain_jpeg(&source, 640, 480, [200, 200, 200]);
    let mut slide = slide(&source, &config);
    slide.aspect_ratio = "4 / 5".to_string();

    let geometry = inspect_slide(&RustBackend::new(), &slide).unwrap();
    assert_eq!(geometry.image.width, 640);
    assert_eq!(geometry.canvas, (1080, 1350));
    assert!(geometry.in_bounds);
}

// =========================================================================
// Overlay and caption
// =========================================================================

#[test]
fn gradient_darkens_bottom_and_leaves_top_untouched() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("white.jpg");
    plain_jpeg(&source, 1080, 1080, [255, 255, 255]);
    let mut slide = slide(&source, &config);
    slide.gradient_intensity = 0.7;

    let outcome = export_slide(
        &RustBackend::new(),
        &slide,
        &config,
        &FontBook::empty(),
        tmp.path(),
    )
    .unwrap();

    let img = image::open(&outcome.path).unwrap();
    let top = img.get_pixel(540, 100);
    let bottom = img.get_pixel(540, 1075);
    assert!(top[0] > 245, "top row should stay white: {top:?}");
    assert!(bottom[0] < 110, "bottom row should be darkened: {bottom:?}");
}

#[test]
fn caption_without_font_still_exports_image() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("photo.jpg");
    plain_jpeg(&source, 800, 800, [30, 30, 30]);
    let mut slide = slide(&source, &config);
    slide.caption = "Golden hour".to_string();

    let outcome = export_slide(
        &RustBackend::new(),
        &slide,
        &config,
        &FontBook::empty(),
        tmp.path(),
    )
    .unwrap();

    assert_eq!(
        outcome.caption,
        CaptionStatus::NoFont {
            requested: FontFamily::Inter
        }
    );
    assert!(outcome.path.exists());
}

/// DejaVu Sans from the host, if installed.
fn system_font_path() -> Option<&'static Path> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    ]
    .into_iter()
    .map(Path::new)
    .find(|p| p.exists())
}

#[test]
fn caption_is_drawn_when_a_system_font_is_available() {
    let Some(font_path) = system_font_path() else {
        eprintln!("no system font found, skipping caption raster test");
        return;
    };

    let tmp = TempDir::new().unwrap();
    let mut config = stock_config(tmp.path());
    config
        .fonts
        .insert("inter".to_string(), font_path.to_path_buf());
    let fonts = FontBook::from_config(&config.fonts);

    let source = tmp.path().join("black.jpg");
    plain_jpeg(&source, 1080, 1080, [0, 0, 0]);
    let mut slide = slide(&source, &config);
    slide.caption = "HELLO WORLD".to_string();
    slide.font_size = 32.0;

    let outcome =
        export_slide(&RustBackend::new(), &slide, &config, &fonts, tmp.path()).unwrap();
    assert!(matches!(
        outcome.caption,
        CaptionStatus::Rendered { lines: 1, .. }
    ));

    // White text on black: some pixel in the bottom band must be bright
    let img = image::open(&outcome.path).unwrap().to_rgb8();
    let bright = img
        .enumerate_pixels()
        .filter(|(_, y, _)| *y > 800)
        .any(|(_, _, px)| px[0] > 200);
    assert!(bright);
}

#[test]
fn long_caption_wraps_onto_several_lines() {
    let Some(font_path) = system_font_path() else {
        eprintln!("no system font found, skipping caption wrap test");
        return;
    };

    let tmp = TempDir::new().unwrap();
    let mut config = stock_config(tmp.path());
    config
        .fonts
        .insert("inter".to_string(), font_path.to_path_buf());
    let fonts = FontBook::from_config(&config.fonts);

    let source = tmp.path().join("grey.jpg");
    plain_jpeg(&source, 1080, 1080, [60, 60, 60]);
    let mut slide = slide(&source, &config);
    slide.caption =
        "Morning light over the harbor as the fishing boats head out past the breakwater"
            .to_string();

    let outcome =
        export_slide(&RustBackend::new(), &slide, &config, &fonts, tmp.path()).unwrap();
    match outcome.caption {
        CaptionStatus::Rendered { lines, .. } => assert!(lines >= 2, "{lines} line(s)"),
        other => panic!("caption not rendered: {other:?}"),
    }
}

// =========================================================================
// Failure handling
// =========================================================================

#[test]
fn corrupt_source_fails_without_writing_output() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let source = tmp.path().join("broken.jpg");
    std::fs::write(&source, b"definitely not a jpeg").unwrap();
    let slide = slide(&source, &config);

    let out = tmp.path().join("out");
    let result = export_slide(&RustBackend::new(), &slide, &config, &FontBook::empty(), &out);

    assert!(result.is_err());
    let written = std::fs::read_dir(&out).map(|d| d.count()).unwrap_or(0);
    assert_eq!(written, 0);
}

// =========================================================================
// Background worker
// =========================================================================

#[test]
fn exporter_reports_success_and_failure_per_slide() {
    let tmp = TempDir::new().unwrap();
    let config = stock_config(tmp.path());
    let good = tmp.path().join("good.jpg");
    plain_jpeg(&good, 400, 300, [10, 120, 10]);
    let missing = tmp.path().join("missing.jpg");

    let mut ok = slide(&good, &config);
    ok.id = "good".to_string();
    let mut bad = slide(&missing, &config);
    bad.id = "bad".to_string();

    let out = tmp.path().join("exports");
    let (exporter, events) = Exporter::spawn(
        RustBackend::new(),
        config,
        Arc::new(FontBook::empty()),
        out.clone(),
    );
    assert_eq!(exporter.submit(&ok), Submission::Queued);
    assert_eq!(exporter.submit(&bad), Submission::Queued);

    let received: Vec<ExportEvent> = events.iter().take(2).collect();
    exporter.finish();

    assert_eq!(received[0].slide_id(), "good");
    assert!(matches!(&received[0], ExportEvent::Finished(o) if o.path == out.join("slide-good.jpg")));
    assert!(matches!(&received[1], ExportEvent::Failed { id, .. } if id == "bad"));
    assert!(out.join("slide-good.jpg").exists());
}
