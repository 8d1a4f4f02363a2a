//! Cover-fit, pan bounds and placement math shared by preview and export.
//!
//! Every function here is pure: plain numbers in, plain numbers out, no
//! images and no I/O. The live [`TransformController`](crate::controller::TransformController)
//! evaluates them against the on-screen container, the
//! [`render`](crate::render) pipeline evaluates them against the export
//! canvas. Because both sides call the same functions, a slide exported at
//! 1080×1350 lands exactly where the 432×540 preview showed it, up to
//! rounding.
//!
//! ## Units
//!
//! | Quantity | Unit |
//! |---|---|
//! | [`CoverDimensions`] | percent of the frame (100 = exactly the frame) |
//! | [`Bounds`], [`Position`] | percent of the frame, deviation from center |
//! | [`Placement`] | pixels of whatever frame was passed to [`place`] |
//!
//! ## Composition law
//!
//! ```text
//! center = frame / 2 + position / 100 * frame
//! size   = cover / 100 * frame * scale
//! ```
//!
//! With `position` inside [`bounds`], the placed rectangle always contains the
//! whole frame: no gap is ever exposed.

use serde::{Deserialize, Serialize};

/// Bounds below this many percent are treated as zero.
///
/// An exact cover fit can come out as `1e-13` after the ratio division; that
/// must not make a locked image draggable.
pub const BOUNDS_EPSILON: f64 = 0.1;

/// Width and height of a frame or an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive.
    ///
    /// Images report `0×0` until decoded and containers until laid out;
    /// geometry must not be computed from such sizes.
    pub fn is_known(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// Pan offset as percent of the frame, `(0, 0)` = centered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const CENTER: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Replace non-finite components with 0.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self::new(finite(self.x), finite(self.y))
    }
}

/// Rendered image size as percent of the frame under cover fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverDimensions {
    pub width: f64,
    pub height: f64,
}

impl CoverDimensions {
    /// The degenerate result used while dimensions are unknown.
    pub const FULL: CoverDimensions = CoverDimensions {
        width: 100.0,
        height: 100.0,
    };
}

/// Maximum pan deviation from center, in percent of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
}

impl Bounds {
    pub const LOCKED: Bounds = Bounds { x: 0.0, y: 0.0 };

    /// True when the image can move along at least one axis.
    pub fn is_pannable(&self) -> bool {
        self.x > 0.0 || self.y > 0.0
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x.abs() <= self.x && position.y.abs() <= self.y
    }
}

/// Image rectangle in frame pixels (top-left corner plus size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle covers `[0, frame]` on both axes.
    ///
    /// A small tolerance absorbs floating point error at the edges.
    pub fn covers(&self, frame: Size) -> bool {
        const TOLERANCE: f64 = 1e-6;
        self.x <= TOLERANCE
            && self.y <= TOLERANCE
            && self.right() >= frame.width - TOLERANCE
            && self.bottom() >= frame.height - TOLERANCE
    }
}

/// Compute the cover-fit size of an image inside a container.
///
/// The relatively wider side of the image overflows; the other side matches
/// the container exactly.
///
/// # Arguments
/// * `image` - Natural image size in pixels
/// * `container` - Container (or canvas) size in pixels
///
/// # Returns
/// * Width and height as percent of the container. Both are `>= 100` and at
///   least one is exactly `100`. `{100, 100}` when either size is unknown;
///   callers re-invoke once real dimensions arrive.
///
/// # Examples
/// ```
/// # use carousel_studio::geometry::{cover_dimensions, Size};
/// // 2:1 image in a square container: height limits, width overflows 2×
/// let cover = cover_dimensions(Size::new(2000.0, 1000.0), Size::new(500.0, 500.0));
/// assert_eq!((cover.width, cover.height), (200.0, 100.0));
/// ```
pub fn cover_dimensions(image: Size, container: Size) -> CoverDimensions {
    if !image.is_known() || !container.is_known() {
        return CoverDimensions::FULL;
    }

    let img_ratio = image.ratio();
    let container_ratio = container.ratio();

    if img_ratio > container_ratio {
        // Image is relatively wider: height limits
        CoverDimensions {
            width: img_ratio / container_ratio * 100.0,
            height: 100.0,
        }
    } else {
        // Image is relatively taller (or identical): width limits
        CoverDimensions {
            width: 100.0,
            height: container_ratio / img_ratio * 100.0,
        }
    }
}

/// Compute how far the image may pan from center before exposing an edge.
///
/// Each axis allows half of the overflow beyond 100%. Values under
/// [`BOUNDS_EPSILON`] snap to zero. A non-finite or sub-1 `scale` is treated
/// as 1.
pub fn bounds(cover: CoverDimensions, scale: f64) -> Bounds {
    let scale = sanitize_scale(scale);
    let axis = |cover_percent: f64| {
        let slack = ((cover_percent * scale - 100.0) / 2.0).max(0.0);
        if slack < BOUNDS_EPSILON { 0.0 } else { slack }
    };

    Bounds {
        x: axis(cover.width),
        y: axis(cover.height),
    }
}

/// Clamp a position into `[-bounds, bounds]` on both axes.
///
/// Idempotent: `clamp(clamp(p, b), b) == clamp(p, b)`.
pub fn clamp(position: Position, bounds: Bounds) -> Position {
    let position = position.sanitized();
    Position {
        x: position.x.clamp(-bounds.x, bounds.x),
        y: position.y.clamp(-bounds.y, bounds.y),
    }
}

/// Bounds for an image shown in a frame at the given scale.
///
/// Returns `None` while either size is unknown, so callers skip the clamp
/// instead of pinning the position against bogus bounds.
pub fn bounds_for(image: Size, frame: Size, scale: f64) -> Option<Bounds> {
    if !image.is_known() || !frame.is_known() {
        return None;
    }
    Some(bounds(cover_dimensions(image, frame), scale))
}

/// Place an image inside a frame: cover fit, then pan, then scale about the
/// panned center.
///
/// This is the single composition law used by both the live preview and the
/// exported raster.
pub fn place(image: Size, frame: Size, position: Position, scale: f64) -> Placement {
    let cover = cover_dimensions(image, frame);
    let scale = sanitize_scale(scale);
    let position = position.sanitized();

    let width = cover.width / 100.0 * frame.width * scale;
    let height = cover.height / 100.0 * frame.height * scale;
    let center_x = frame.width / 2.0 + position.x / 100.0 * frame.width;
    let center_y = frame.height / 2.0 + position.y / 100.0 * frame.height;

    Placement {
        x: center_x - width / 2.0,
        y: center_y - height / 2.0,
        width,
        height,
    }
}

/// Treat missing, non-finite and sub-1 scales as 1.
pub fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale >= 1.0 {
        scale
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // =========================================================================
    // cover_dimensions tests
    // =========================================================================

    #[test]
    fn cover_wide_image_in_square_container() {
        let cover = cover_dimensions(Size::new(1600.0, 900.0), Size::new(500.0, 500.0));
        assert_close(cover.width, 1600.0 / 900.0 * 100.0);
        assert_eq!(cover.height, 100.0);
    }

    #[test]
    fn cover_tall_image_in_landscape_container() {
        // 3:4 image in 16:9 container → width limits
        let cover = cover_dimensions(Size::new(600.0, 800.0), Size::new(1920.0, 1080.0));
        assert_eq!(cover.width, 100.0);
        assert_close(cover.height, (16.0 / 9.0) / 0.75 * 100.0);
    }

    #[test]
    fn cover_same_ratio_is_exact() {
        let cover = cover_dimensions(Size::new(800.0, 1000.0), Size::new(1080.0, 1350.0));
        assert_eq!(cover, CoverDimensions::FULL);
    }

    #[test]
    fn cover_never_leaves_gaps() {
        let images = [(1.0, 1.0), (4000.0, 3000.0), (3000.0, 4000.0), (1.0, 9.0), (37.0, 11.0)];
        let containers = [(1080.0, 1080.0), (1080.0, 1350.0), (1080.0, 1920.0), (1920.0, 1080.0)];
        for (iw, ih) in images {
            for (cw, ch) in containers {
                let cover = cover_dimensions(Size::new(iw, ih), Size::new(cw, ch));
                assert!(cover.width >= 100.0 && cover.height >= 100.0);
                assert!(
                    cover.width == 100.0 || cover.height == 100.0,
                    "one side must be limiting for {iw}x{ih} in {cw}x{ch}: {cover:?}"
                );
            }
        }
    }

    #[test]
    fn cover_degenerates_for_unknown_sizes() {
        let zero = Size::new(0.0, 0.0);
        let real = Size::new(800.0, 600.0);
        assert_eq!(cover_dimensions(zero, real), CoverDimensions::FULL);
        assert_eq!(cover_dimensions(real, zero), CoverDimensions::FULL);
        assert_eq!(
            cover_dimensions(Size::new(f64::NAN, 10.0), real),
            CoverDimensions::FULL
        );
    }

    // =========================================================================
    // bounds tests
    // =========================================================================

    #[test]
    fn bounds_locked_at_exact_fit() {
        assert_eq!(bounds(CoverDimensions::FULL, 1.0), Bounds::LOCKED);
        assert!(!bounds(CoverDimensions::FULL, 1.0).is_pannable());
    }

    #[test]
    fn bounds_half_of_overflow() {
        let cover = CoverDimensions {
            width: 150.0,
            height: 100.0,
        };
        assert_eq!(bounds(cover, 1.0), Bounds { x: 25.0, y: 0.0 });
        // 150 * 2 = 300 → 100; 100 * 2 = 200 → 50
        assert_eq!(bounds(cover, 2.0), Bounds { x: 100.0, y: 50.0 });
    }

    #[test]
    fn bounds_snap_noise_to_zero() {
        let cover = CoverDimensions {
            width: 100.0 + 1e-12,
            height: 100.15,
        };
        let b = bounds(cover, 1.0);
        assert_eq!(b.x, 0.0);
        // 0.075 < 0.1 → snapped
        assert_eq!(b.y, 0.0);
    }

    #[test]
    fn bounds_monotonic_in_scale() {
        let cover = CoverDimensions {
            width: 133.3,
            height: 100.0,
        };
        let mut previous = bounds(cover, 1.0);
        for step in 1..=40 {
            let current = bounds(cover, 1.0 + step as f64 * 0.1);
            assert!(current.x >= previous.x && current.y >= previous.y);
            previous = current;
        }
    }

    #[test]
    fn bounds_ignore_invalid_scale() {
        let cover = CoverDimensions {
            width: 120.0,
            height: 100.0,
        };
        assert_eq!(bounds(cover, 0.5), bounds(cover, 1.0));
        assert_eq!(bounds(cover, f64::NAN), bounds(cover, 1.0));
    }

    #[test]
    fn bounds_for_unknown_sizes_is_none() {
        assert!(bounds_for(Size::new(0.0, 0.0), Size::new(500.0, 500.0), 2.0).is_none());
        assert!(bounds_for(Size::new(800.0, 600.0), Size::new(500.0, 0.0), 2.0).is_none());
        assert!(bounds_for(Size::new(800.0, 600.0), Size::new(500.0, 500.0), 1.0).is_some());
    }

    // =========================================================================
    // clamp tests
    // =========================================================================

    #[test]
    fn clamp_limits_both_axes() {
        let b = Bounds { x: 10.0, y: 5.0 };
        assert_eq!(clamp(Position::new(50.0, -50.0), b), Position::new(10.0, -5.0));
        assert_eq!(clamp(Position::new(-3.0, 2.0), b), Position::new(-3.0, 2.0));
    }

    #[test]
    fn clamp_is_idempotent_and_in_range() {
        let b = Bounds { x: 12.5, y: 0.0 };
        for (x, y) in [(100.0, 100.0), (-7.0, 3.0), (12.5, -0.0), (-1e9, 1e-9)] {
            let once = clamp(Position::new(x, y), b);
            assert_eq!(clamp(once, b), once);
            assert!(b.contains(once));
        }
    }

    #[test]
    fn clamp_replaces_nan_with_center() {
        let b = Bounds { x: 10.0, y: 10.0 };
        assert_eq!(clamp(Position::new(f64::NAN, 4.0), b), Position::new(0.0, 4.0));
    }

    // =========================================================================
    // place tests
    // =========================================================================

    #[test]
    fn place_square_round_trip_centers_image() {
        let frame = Size::new(1080.0, 1080.0);
        let p = place(Size::new(2000.0, 1000.0), frame, Position::CENTER, 1.0);
        assert_eq!(p.center(), (540.0, 540.0));
        assert_eq!((p.width, p.height), (2160.0, 1080.0));
        assert!(p.covers(frame));
    }

    #[test]
    fn place_applies_pan_then_scale_about_pan_center() {
        let frame = Size::new(1000.0, 500.0);
        let p = place(Size::new(1000.0, 500.0), frame, Position::new(10.0, -20.0), 2.0);
        assert_eq!(p.center(), (600.0, 150.0));
        assert_eq!((p.width, p.height), (2000.0, 1000.0));
    }

    #[test]
    fn place_preview_and_export_agree_in_relative_terms() {
        let image = Size::new(4032.0, 3024.0);
        let preview = Size::new(432.0, 540.0);
        let export = Size::new(1080.0, 1350.0);
        let position = Position::new(-7.5, 0.0);

        let a = place(image, preview, position, 1.3);
        let b = place(image, export, position, 1.3);
        assert_close(a.x / preview.width, b.x / export.width);
        assert_close(a.y / preview.height, b.y / export.height);
        assert_close(a.width / preview.width, b.width / export.width);
        assert_close(a.height / preview.height, b.height / export.height);
    }

    #[test]
    fn place_within_bounds_always_covers_frame() {
        let image = Size::new(3000.0, 2000.0);
        let frame = Size::new(1080.0, 1920.0);
        for scale in [1.0, 1.25, 2.0, 3.5] {
            let b = bounds_for(image, frame, scale).unwrap();
            for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
                let corner = Position::new(b.x * sx, b.y * sy);
                assert!(place(image, frame, corner, scale).covers(frame));
            }
        }
    }
}
