//! Viewport predicate
//!
//! Is an element currently on screen? Evaluated fresh on every call since
//! the scroll position moves between calls.

use footnote_dom::{DOMRect, WindowHost};

/// Visible region of a window, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Current viewport of `window`
    pub fn of<W: WindowHost + ?Sized>(window: &W) -> Self {
        Self {
            width: window.inner_width(),
            height: window.inner_height(),
        }
    }

    pub fn rect(&self) -> DOMRect {
        DOMRect::from_xywh(0.0, 0.0, self.width, self.height)
    }

    /// Check if a client rect shares any area with the viewport
    #[inline]
    pub fn intersects(&self, rect: &DOMRect) -> bool {
        rect.intersects(&self.rect())
    }
}

/// True iff some part of `element`'s box lies inside the window's viewport
pub fn is_visible<W: WindowHost + ?Sized>(window: &W, element: &W::Node) -> bool {
    Viewport::of(window).intersects(&window.bounding_client_rect(element))
}
