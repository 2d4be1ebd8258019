//! Window capability
//!
//! The slice of the browser window the fixed-footnotes engine consumes:
//! document queries and mutation, box geometry, scroll/resize events,
//! timers and animation frames. Methods take `&self` the way browser
//! bindings do; implementations use interior mutability and must not hold
//! internal borrows while invoking callbacks.

mod event_loop;
mod memory;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::{DOMRect, DomResult};

pub use memory::MemoryWindow;

/// Timer handle returned by `set_timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Animation frame handle returned by `request_animation_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Window events the engine listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Scroll,
    Resize,
}

impl EventType {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Scroll => "scroll",
            EventType::Resize => "resize",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event handler; registration and removal go by `Rc` identity
pub type EventHandler = Rc<dyn Fn()>;

/// One-shot timers
pub trait Timers {
    /// Run `callback` once after `delay`
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> TimerId;

    /// Cancel a pending timer; unknown or fired IDs are ignored
    fn clear_timeout(&self, id: TimerId);
}

/// Window + document capability
pub trait WindowHost: Timers + 'static {
    /// Node handle
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// URL of the current document
    fn document_url(&self) -> String;

    /// First element matching `selectors`
    fn query_selector(&self, selectors: &str) -> DomResult<Option<Self::Node>>;

    /// All elements matching `selectors`, in document order
    fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<Self::Node>>;

    /// Element with the given id
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Create a detached element
    fn create_element(&self, local_name: &str) -> DomResult<Self::Node>;

    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> DomResult<()>;

    fn remove_attribute(&self, node: &Self::Node, name: &str) -> DomResult<()>;

    /// classList.add
    fn add_class(&self, node: &Self::Node, class: &str) -> DomResult<()>;

    /// classList.toggle with a forced state
    fn toggle_class(&self, node: &Self::Node, class: &str, force: bool) -> DomResult<()>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    /// Fails with `NotAChild` when `child` is not a child of `parent`
    fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    /// Parent node, if attached
    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// All child nodes, text included
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    /// Detached copy of a node
    fn clone_node(&self, node: &Self::Node, deep: bool) -> DomResult<Self::Node>;

    /// Free a detached subtree; its handles must not be used afterwards
    fn release_node(&self, node: &Self::Node) -> DomResult<()>;

    /// Box of the node relative to the viewport
    fn bounding_client_rect(&self, node: &Self::Node) -> DOMRect;

    fn inner_width(&self) -> f64;

    fn inner_height(&self) -> f64;

    fn add_event_listener(&self, event: EventType, handler: EventHandler);

    /// Remove a handler previously added for `event`
    fn remove_event_listener(&self, event: EventType, handler: &EventHandler);

    /// Whether `request_animation_frame` is available
    fn supports_animation_frames(&self) -> bool;

    /// Run `callback` before the next paint
    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> FrameId;

    fn cancel_animation_frame(&self, id: FrameId);
}
