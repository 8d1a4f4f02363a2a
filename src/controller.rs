//! Live pan/zoom state for the slide being edited.
//!
//! The controller owns what the slide record does not: the preview container
//! size, the decoded image's natural size, and the drag session. It never
//! mutates a [`Slide`] itself. Every operation reads the current slide and
//! returns a [`SlideUpdate`] for the collection manager to merge.
//!
//! ## States
//!
//! ```text
//!            pointer_down
//!   Idle ─────────────────────▶ Dragging ──┐ pointer_move
//!    ▲                              │  ◀───┘ (clamped position update)
//!    └──────── pointer_up / pointer_leave
//! ```
//!
//! ## Re-clamping
//!
//! Changing the scale or aspect ratio, resizing the container, or learning the
//! image's natural size can shrink the bounds under a position that used to be
//! valid. Those operations re-clamp synchronously and fold the correction into
//! the returned update. While a drag is active they do not: every move already
//! clamps, and correcting underneath the pointer would fight the user.
//!
//! Until both the container and the image size are known, bounds-dependent
//! operations return no position change.

use crate::aspect::AspectRatio;
use crate::geometry::{self, Bounds, Placement, Position, Size};
use crate::types::{Slide, SlideUpdate};

/// Where a drag started: pointer in screen px, image position in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub pointer: (f64, f64),
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragOrigin),
}

/// Pan/zoom controller for one slide surface.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    container: Option<Size>,
    image: Option<Size>,
    state: DragState,
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with both sizes already known (e.g. a CLI simulation).
    pub fn with_sizes(container: Size, image: Size) -> Self {
        Self {
            container: container.is_known().then_some(container),
            image: image.is_known().then_some(image),
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn container(&self) -> Option<Size> {
        self.container
    }

    /// Current pan bounds, or `None` while a size is still unknown.
    pub fn bounds(&self, slide: &Slide) -> Option<Bounds> {
        geometry::bounds_for(self.image?, self.container?, slide.effective_scale())
    }

    /// Whether the surface should advertise dragging.
    ///
    /// False for an exact cover fit (bounds `{0, 0}`) and while sizes are
    /// unknown. Pointer handlers still work; they just cannot move anything.
    pub fn is_pannable(&self, slide: &Slide) -> bool {
        self.bounds(slide).is_some_and(|b| b.is_pannable())
    }

    /// Image rectangle in container pixels, for drawing the preview.
    pub fn preview_placement(&self, slide: &Slide) -> Option<Placement> {
        Some(geometry::place(
            self.image?,
            self.container?,
            slide.effective_position(),
            slide.effective_scale(),
        ))
    }

    // =========================================================================
    // Pointer events
    // =========================================================================

    /// Start a drag at the given screen coordinates.
    pub fn pointer_down(&mut self, x: f64, y: f64, slide: &Slide) {
        self.state = DragState::Dragging(DragOrigin {
            pointer: (x, y),
            position: slide.effective_position(),
        });
        tracing::trace!(slide = %slide.id, x, y, "drag started");
    }

    /// Move the pointer during a drag.
    ///
    /// Returns the clamped position update for every move while dragging, and
    /// `None` when idle or while sizes are unknown.
    pub fn pointer_move(&mut self, x: f64, y: f64, slide: &Slide) -> Option<SlideUpdate> {
        let DragState::Dragging(origin) = self.state else {
            return None;
        };
        let container = self.container?;
        let bounds = self.bounds(slide)?;

        let delta_x = (x - origin.pointer.0) / container.width * 100.0;
        let delta_y = (y - origin.pointer.1) / container.height * 100.0;
        let target = Position::new(origin.position.x + delta_x, origin.position.y + delta_y);

        Some(SlideUpdate::position(geometry::clamp(target, bounds)))
    }

    /// End the drag (pointer released).
    pub fn pointer_up(&mut self) {
        if self.is_dragging() {
            tracing::trace!("drag ended");
        }
        self.state = DragState::Idle;
    }

    /// End the drag (pointer left the surface). Same as [`pointer_up`](Self::pointer_up).
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    // =========================================================================
    // Parameter changes
    // =========================================================================

    /// Change the zoom factor. Values below 1 (or non-finite) become 1.
    pub fn set_scale(&mut self, slide: &Slide, scale: f64) -> SlideUpdate {
        let scale = geometry::sanitize_scale(scale);
        let mut next = slide.clone();
        next.scale = scale;
        let update = SlideUpdate {
            scale: Some(scale),
            ..SlideUpdate::default()
        };
        update.merge(self.reclamp(&next).unwrap_or_default())
    }

    /// Change the aspect ratio. The preview container keeps its width and takes
    /// the new ratio's height.
    pub fn set_aspect_ratio(&mut self, slide: &Slide, ratio: AspectRatio) -> SlideUpdate {
        if let Some(container) = self.container {
            self.container = Some(ratio.container_for_width(container.width));
        }
        let mut next = slide.clone();
        next.aspect_ratio = ratio.as_ratio_str().to_string();
        let update = SlideUpdate {
            aspect_ratio: Some(next.aspect_ratio.clone()),
            ..SlideUpdate::default()
        };
        update.merge(self.reclamp(&next).unwrap_or_default())
    }

    /// The preview container was laid out or resized.
    pub fn resize_container(
        &mut self,
        width: f64,
        height: f64,
        slide: &Slide,
    ) -> Option<SlideUpdate> {
        let size = Size::new(width, height);
        self.container = size.is_known().then_some(size);
        self.reclamp(slide)
    }

    /// The image finished decoding and reports its natural size.
    pub fn set_image_size(
        &mut self,
        width: f64,
        height: f64,
        slide: &Slide,
    ) -> Option<SlideUpdate> {
        let size = Size::new(width, height);
        self.image = size.is_known().then_some(size);
        self.reclamp(slide)
    }

    /// Position correction for the current parameters, if one is needed.
    ///
    /// `None` while dragging, while sizes are unknown, or when the position is
    /// already inside the bounds.
    pub fn reclamp(&self, slide: &Slide) -> Option<SlideUpdate> {
        if self.is_dragging() {
            return None;
        }
        let bounds = self.bounds(slide)?;
        let current = slide.image_position;
        let clamped = geometry::clamp(current, bounds);
        if clamped == current {
            return None;
        }
        tracing::debug!(
            slide = %slide.id,
            from_x = current.x,
            from_y = current.y,
            to_x = clamped.x,
            to_y = clamped.y,
            "position re-clamped"
        );
        Some(SlideUpdate::position(clamped))
    }
}
