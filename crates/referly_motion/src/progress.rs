//! Progress sources
//!
//! Raw, unsmoothed input signals sampled from layout and pointer state:
//!
//! - [`ScrollProgress`]: how far a scroll region has been traversed, in [0, 1]
//! - [`page_progress`]: the whole document's scroll fraction
//! - [`PointerTracker`]: pointer offset from an element's center, in [-1, 1]
//! - [`VisibilityTrigger`]: a latch that flips once an element is in view
//! - [`TimeSource`]: a looping phase for ambient animations
//!
//! Sources take the element's rect as `Option<Rect>`; `None` means the
//! element is not mounted, and the source yields nothing rather than failing.

use referly_core::events::{event_types, EventType};
use referly_core::{Point, Rect, Viewport};

/// Widths and heights below this are treated as zero
const GEOMETRY_EPSILON: f32 = 1e-3;

/// A position along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Start,
    Center,
    End,
    /// 0.0 = start, 1.0 = end
    Fraction(f32),
}

impl Anchor {
    pub fn fraction(&self) -> f32 {
        match *self {
            Anchor::Start => 0.0,
            Anchor::Center => 0.5,
            Anchor::End => 1.0,
            Anchor::Fraction(f) => f,
        }
    }
}

/// "When this point of the element meets this point of the viewport"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl Edge {
    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }
}

/// The scroll interval mapped onto [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollOffset {
    pub start: Edge,
    pub end: Edge,
}

impl ScrollOffset {
    /// From the element's top entering at the bottom of the viewport to its
    /// bottom leaving at the top
    pub const fn enter_to_exit() -> Self {
        Self {
            start: Edge::new(Anchor::Start, Anchor::End),
            end: Edge::new(Anchor::End, Anchor::Start),
        }
    }

    /// While a tall element is pinned: its top at the viewport top through
    /// its bottom at the viewport bottom
    pub const fn contained() -> Self {
        Self {
            start: Edge::new(Anchor::Start, Anchor::Start),
            end: Edge::new(Anchor::End, Anchor::End),
        }
    }

    /// From the element entering until its center reaches the viewport center
    pub const fn enter_to_center() -> Self {
        Self {
            start: Edge::new(Anchor::Start, Anchor::End),
            end: Edge::new(Anchor::Center, Anchor::Center),
        }
    }
}

impl Default for ScrollOffset {
    fn default() -> Self {
        Self::enter_to_exit()
    }
}

/// Scroll progress through a region defined by an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollProgress {
    pub offset: ScrollOffset,
}

impl ScrollProgress {
    pub fn new(offset: ScrollOffset) -> Self {
        Self { offset }
    }

    /// Sample progress for an element rect in document coordinates.
    ///
    /// Returns `None` if the element is missing or the geometry is not
    /// finite. A zero-length interval behaves as a step at its start.
    pub fn sample(&self, target: Option<Rect>, viewport: &Viewport) -> Option<f32> {
        let rect = target?;
        let scroll_at = |edge: &Edge| {
            rect.top() + edge.element.fraction() * rect.height
                - edge.viewport.fraction() * viewport.height
        };
        let start = scroll_at(&self.offset.start);
        let end = scroll_at(&self.offset.end);
        let position = viewport.scroll_y;

        if !(start.is_finite() && end.is_finite() && position.is_finite()) {
            return None;
        }

        let span = end - start;
        if span.abs() < GEOMETRY_EPSILON {
            return Some(if position >= start { 1.0 } else { 0.0 });
        }
        Some(((position - start) / span).clamp(0.0, 1.0))
    }
}

/// Fraction of the document scrolled, in [0, 1].
///
/// A document that fits in the viewport reports 0.
pub fn page_progress(document_height: f32, viewport: &Viewport) -> Option<f32> {
    let scrollable = document_height - viewport.height;
    if !scrollable.is_finite() || !viewport.scroll_y.is_finite() {
        return None;
    }
    if scrollable < GEOMETRY_EPSILON {
        return Some(0.0);
    }
    Some((viewport.scroll_y / scrollable).clamp(0.0, 1.0))
}

/// Pointer offset from an element's center
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTracker {
    /// Report neutral while the pointer is outside the element
    pub require_inside: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            require_inside: true,
        }
    }
}

impl PointerTracker {
    /// Track the pointer anywhere on the page, clamped to the element's extent
    pub fn anywhere() -> Self {
        Self {
            require_inside: false,
        }
    }

    /// Offset in [-1, 1] per axis; (0, 0) when the element or pointer is
    /// missing, the element is degenerate, or the pointer is out of bounds.
    pub fn sample(&self, target: Option<Rect>, pointer: Option<Point>) -> Point {
        let (Some(rect), Some(pointer)) = (target, pointer) else {
            return Point::ZERO;
        };
        if rect.is_empty() || !pointer.is_finite() {
            return Point::ZERO;
        }
        if self.require_inside && !rect.contains(pointer) {
            return Point::ZERO;
        }
        let center = rect.center();
        Point::new(
            ((pointer.x - center.x) / (rect.width * 0.5)).clamp(-1.0, 1.0),
            ((pointer.y - center.y) / (rect.height * 0.5)).clamp(-1.0, 1.0),
        )
    }
}

/// Flips to visible when the element intersects the (margin-adjusted) viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityTrigger {
    /// Root margin in pixels; negative shrinks the viewport so the element
    /// must travel further in before it counts
    pub margin: f32,
    /// Latch: never flip back to hidden
    pub once: bool,
    visible: bool,
}

impl VisibilityTrigger {
    pub fn new(margin: f32, once: bool) -> Self {
        Self {
            margin: if margin.is_finite() { margin } else { 0.0 },
            once,
            visible: false,
        }
    }

    /// Play-once trigger, the site's default for section reveals
    pub fn once(margin: f32) -> Self {
        Self::new(margin, true)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Update from the current layout and return visibility.
    /// A missing element leaves the state unchanged.
    pub fn observe(&mut self, target: Option<Rect>, viewport: &Viewport) -> bool {
        if self.once && self.visible {
            return true;
        }
        let Some(rect) = target else {
            return self.visible;
        };
        if rect.is_empty() {
            return self.visible;
        }
        let in_view = rect.intersects(&viewport.rect().inflate(self.margin));
        if in_view != self.visible {
            tracing::trace!(in_view, "visibility changed");
        }
        self.visible = in_view;
        self.visible
    }
}

/// Looping phase in [0, 1) for time-driven animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSource {
    pub period_secs: f32,
    phase: f32,
}

impl TimeSource {
    pub fn new(period_secs: f32) -> Self {
        Self {
            period_secs,
            phase: 0.0,
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `dt` seconds. A non-positive or non-finite period freezes the phase.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if !(self.period_secs.is_finite() && self.period_secs > 0.0) || !dt.is_finite() {
            return self.phase;
        }
        self.phase = (self.phase + dt.max(0.0) / self.period_secs).fract();
        self.phase
    }
}

/// Where a pipeline's raw signal comes from
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressSource {
    Scroll(ScrollProgress),
    /// Whole-document scroll fraction
    Page,
    Pointer(PointerTracker),
    Visibility(VisibilityTrigger),
    Time(TimeSource),
}

impl ProgressSource {
    /// Event types this source needs listeners for
    pub fn event_types(&self) -> &'static [EventType] {
        match self {
            ProgressSource::Scroll(_) | ProgressSource::Page | ProgressSource::Visibility(_) => {
                &[event_types::SCROLL, event_types::RESIZE]
            }
            ProgressSource::Pointer(_) => &[event_types::POINTER_MOVE, event_types::POINTER_LEAVE],
            ProgressSource::Time(_) => &[],
        }
    }

    /// Value the signal rests at before the first sample
    pub fn neutral(&self) -> Point {
        Point::ZERO
    }
}
