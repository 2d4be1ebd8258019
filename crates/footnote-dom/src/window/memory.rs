//! In-memory window
//!
//! A deterministic stand-in for a browser window: a `Document` with layout
//! boxes, a scrollable viewport, scroll/resize listeners, and a virtual
//! clock that drives timers and animation frames.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use super::event_loop::EventLoop;
use super::{EventHandler, EventType, FrameId, TimerId, Timers, WindowHost};
use crate::{DOMRect, Document, DomResult, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewportState {
    scroll_x: f64,
    scroll_y: f64,
    width: f64,
    height: f64,
}

/// In-memory window
pub struct MemoryWindow {
    document: RefCell<Document>,
    viewport: Cell<ViewportState>,
    listeners: RefCell<Vec<(EventType, EventHandler)>>,
    event_loop: RefCell<EventLoop>,
    animation_frames: bool,
}

impl MemoryWindow {
    /// Create a window of `width` x `height` showing `document` scrolled to the top
    pub fn new(document: Document, width: f64, height: f64) -> Self {
        Self {
            document: RefCell::new(document),
            viewport: Cell::new(ViewportState {
                scroll_x: 0.0,
                scroll_y: 0.0,
                width,
                height,
            }),
            listeners: RefCell::new(Vec::new()),
            event_loop: RefCell::new(EventLoop::default()),
            animation_frames: true,
        }
    }

    /// Behave like an environment without `requestAnimationFrame`
    pub fn without_animation_frames(mut self) -> Self {
        self.animation_frames = false;
        self
    }

    /// Borrow the document
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Borrow the document mutably
    ///
    /// The borrow must be released before the window runs callbacks.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    /// Current (scrollX, scrollY)
    pub fn scroll_position(&self) -> (f64, f64) {
        let v = self.viewport.get();
        (v.scroll_x, v.scroll_y)
    }

    /// Scroll to an absolute position and dispatch `scroll`
    pub fn scroll_to(&self, x: f64, y: f64) {
        let mut v = self.viewport.get();
        v.scroll_x = x.max(0.0);
        v.scroll_y = y.max(0.0);
        self.viewport.set(v);
        self.dispatch(EventType::Scroll);
    }

    /// Scroll relative to the current position and dispatch `scroll`
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let (x, y) = self.scroll_position();
        self.scroll_to(x + dx, y + dy);
    }

    /// Change the viewport size and dispatch `resize`
    pub fn resize(&self, width: f64, height: f64) {
        let mut v = self.viewport.get();
        v.width = width;
        v.height = height;
        self.viewport.set(v);
        self.dispatch(EventType::Resize);
    }

    /// Invoke the handlers registered for `event`, in registration order
    pub fn dispatch(&self, event: EventType) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(ty, _)| *ty == event)
            .map(|(_, handler)| handler.clone())
            .collect();
        tracing::trace!("Dispatching {} to {} handlers", event, handlers.len());
        for handler in handlers {
            handler();
        }
    }

    /// Number of handlers registered for `event`
    pub fn listener_count(&self, event: EventType) -> usize {
        self.listeners.borrow().iter().filter(|(ty, _)| *ty == event).count()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.event_loop.borrow().now()
    }

    /// Move the clock forward, firing due timers, then paint one frame
    ///
    /// Timers scheduled while advancing fire too when they fall due inside
    /// the window. Returns the number of timers fired.
    pub fn advance(&self, delta: Duration) -> usize {
        let deadline = self.now() + delta;
        let mut fired = 0;
        loop {
            let next = self.event_loop.borrow_mut().pop_due(deadline);
            let Some(callback) = next else { break };
            callback();
            fired += 1;
        }
        self.event_loop.borrow_mut().set_time(deadline);
        self.run_animation_frame();
        fired
    }

    /// Run the callbacks queued for the next frame; returns how many ran
    ///
    /// Callbacks requested while running wait for the following frame.
    pub fn run_animation_frame(&self) -> usize {
        let callbacks = self.event_loop.borrow_mut().take_frames();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    pub fn pending_timers(&self) -> usize {
        self.event_loop.borrow().pending_timers()
    }

    pub fn pending_animation_frames(&self) -> usize {
        self.event_loop.borrow().pending_frames()
    }
}

impl Timers for MemoryWindow {
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> TimerId {
        self.event_loop.borrow_mut().set_timeout(callback, delay)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.event_loop.borrow_mut().clear_timer(id);
    }
}

impl WindowHost for MemoryWindow {
    type Node = NodeId;

    fn document_url(&self) -> String {
        self.document.borrow().url().to_string()
    }

    fn query_selector(&self, selectors: &str) -> DomResult<Option<NodeId>> {
        self.document.borrow().query_selector(selectors)
    }

    fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<NodeId>> {
        self.document.borrow().query_selector_all(selectors)
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document.borrow().get_element_by_id(id)
    }

    fn create_element(&self, local_name: &str) -> DomResult<NodeId> {
        Ok(self.document.borrow_mut().tree_mut().create_element(local_name))
    }

    fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.document.borrow().tree().get_attribute(*node, name).map(str::to_string)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> DomResult<()> {
        self.document.borrow_mut().tree_mut().set_attribute(*node, name, value)
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) -> DomResult<()> {
        self.document.borrow_mut().tree_mut().remove_attribute(*node, name)
    }

    fn add_class(&self, node: &NodeId, class: &str) -> DomResult<()> {
        self.document.borrow_mut().tree_mut().add_class(*node, class)
    }

    fn toggle_class(&self, node: &NodeId, class: &str, force: bool) -> DomResult<()> {
        self.document
            .borrow_mut()
            .tree_mut()
            .toggle_class(*node, class, Some(force))
            .map(|_| ())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        self.document.borrow_mut().tree_mut().append_child(*parent, *child)
    }

    fn remove_child(&self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        self.document.borrow_mut().tree_mut().remove_child(*parent, *child)
    }

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.document.borrow().tree().parent(*node)
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.document.borrow().tree().child_ids(*node)
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.document.borrow().tree().element(*node).is_some()
    }

    fn clone_node(&self, node: &NodeId, deep: bool) -> DomResult<NodeId> {
        self.document.borrow_mut().tree_mut().clone_node(*node, deep)
    }

    fn release_node(&self, node: &NodeId) -> DomResult<()> {
        self.document.borrow_mut().release_node(*node)
    }

    fn bounding_client_rect(&self, node: &NodeId) -> DOMRect {
        let document = self.document.borrow();
        if !document.tree().is_connected(*node) {
            return DOMRect::new();
        }
        let v = self.viewport.get();
        document.layout_rect(*node).translate(-v.scroll_x, -v.scroll_y)
    }

    fn inner_width(&self) -> f64 {
        self.viewport.get().width
    }

    fn inner_height(&self) -> f64 {
        self.viewport.get().height
    }

    fn add_event_listener(&self, event: EventType, handler: EventHandler) {
        self.listeners.borrow_mut().push((event, handler));
    }

    fn remove_event_listener(&self, event: EventType, handler: &EventHandler) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(index) = listeners
            .iter()
            .position(|(ty, h)| *ty == event && Rc::ptr_eq(h, handler))
        {
            listeners.remove(index);
        }
    }

    fn supports_animation_frames(&self) -> bool {
        self.animation_frames
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> FrameId {
        self.event_loop.borrow_mut().request_frame(callback)
    }

    fn cancel_animation_frame(&self, id: FrameId) {
        self.event_loop.borrow_mut().cancel_frame(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_html;

    fn window() -> MemoryWindow {
        let mut doc = parse_html("<p id=\"a\">x</p>", "https://example.com/");
        let p = doc.get_element_by_id("a").unwrap();
        doc.set_layout_rect(p, DOMRect::from_xywh(0.0, 900.0, 100.0, 20.0));
        MemoryWindow::new(doc, 800.0, 600.0)
    }

    #[test]
    fn test_client_rect_follows_scroll() {
        let w = window();
        let p = w.get_element_by_id("a").unwrap();
        assert_eq!(w.bounding_client_rect(&p).y, 900.0);
        w.scroll_to(0.0, 600.0);
        assert_eq!(w.bounding_client_rect(&p).y, 300.0);
        w.scroll_by(0.0, -1000.0);
        assert_eq!(w.scroll_position(), (0.0, 0.0));
    }

    #[test]
    fn test_detached_nodes_have_empty_rect() {
        let w = window();
        let p = w.get_element_by_id("a").unwrap();
        let body = w.query_selector("body").unwrap().unwrap();
        w.remove_child(&body, &p).unwrap();
        assert!(w.bounding_client_rect(&p).is_empty());
    }

    #[test]
    fn test_listeners_by_identity() {
        let w = Rc::new(window());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handler: EventHandler = Rc::new(move || counter.set(counter.get() + 1));
        let other: EventHandler = Rc::new(|| {});

        w.add_event_listener(EventType::Scroll, handler.clone());
        w.add_event_listener(EventType::Resize, handler.clone());
        w.scroll_to(0.0, 10.0);
        w.resize(640.0, 480.0);
        assert_eq!(hits.get(), 2);

        w.remove_event_listener(EventType::Scroll, &other);
        assert_eq!(w.listener_count(EventType::Scroll), 1);
        w.remove_event_listener(EventType::Scroll, &handler);
        assert_eq!(w.listener_count(EventType::Scroll), 0);
        assert_eq!(w.listener_count(EventType::Resize), 1);
    }

    #[test]
    fn test_callbacks_may_reenter_window() {
        let w = Rc::new(window());
        let inner = w.clone();
        w.set_timeout(
            Box::new(move || {
                let body = inner.query_selector("body").unwrap().unwrap();
                let div = inner.create_element("div").unwrap();
                inner.append_child(&body, &div).unwrap();
                let again = inner.clone();
                inner.set_timeout(Box::new(move || again.scroll_to(0.0, 5.0)), Duration::from_millis(5));
            }),
            Duration::from_millis(10),
        );

        assert_eq!(w.advance(Duration::from_millis(20)), 2);
        assert_eq!(w.scroll_position(), (0.0, 5.0));
        assert_eq!(w.now(), Duration::from_millis(20));
        assert_eq!(w.query_selector_all("div").unwrap().len(), 1);
    }

    #[test]
    fn test_advance_paints_frame() {
        let w = window();
        let painted = Rc::new(Cell::new(false));
        let flag = painted.clone();
        w.request_animation_frame(Box::new(move || flag.set(true)));
        assert_eq!(w.pending_animation_frames(), 1);
        w.advance(Duration::ZERO);
        assert!(painted.get());
    }
}
