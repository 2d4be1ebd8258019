//! Synchronization engine
//!
//! Owns the overlay container and keeps it in step with the viewport:
//! every refresh empties the list, re-checks each reference marker and
//! appends a displayed note for markers that are on screen while their
//! note is not. Scroll and resize go through a trailing-edge throttle.
//! Listeners run on the next animation frame (or a short timer when frames
//! are unavailable) with the list of listeners captured when the refresh
//! scheduled them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use footnote_dom::{DomError, EventHandler, EventType, FrameId, TimerId, WindowHost};

use crate::config::{Config, EMPTY_CLASS, Options};
use crate::error::{FixedFootnotesError, Result};
use crate::listeners::{RefreshListener, RefreshListeners};
use crate::note::{build_displayed_note, empty_element, resolve_note};
use crate::throttle::Throttle;
use crate::viewport::is_visible;

#[derive(Debug, Clone, Copy)]
enum DispatchHandle {
    Frame(FrameId),
    Timer(TimerId),
}

#[derive(Debug, Clone, Copy)]
struct PendingDispatch {
    token: u64,
    handle: DispatchHandle,
}

struct Inner<W: WindowHost> {
    this: Weak<Inner<W>>,
    window: Rc<W>,
    options: Options<W>,
    container: W::Node,
    content: W::Node,
    listeners: RefCell<RefreshListeners>,
    throttle: Throttle<W>,
    handler: EventHandler,
    pending: RefCell<Vec<PendingDispatch>>,
    next_token: Cell<u64>,
    displayed: Cell<usize>,
}

/// Running fixed-footnotes instance
///
/// Dropping the handle without calling [`stop`](Self::stop) leaves the
/// overlay in the document; later window events no longer reach it.
pub struct FixedFootnotes<W: WindowHost> {
    inner: Rc<Inner<W>>,
}

impl<W: WindowHost> FixedFootnotes<W> {
    /// Attach the overlay under the configured host, hook scroll and resize,
    /// and run the first refresh
    pub fn new(options: Options<W>, window: Rc<W>) -> Result<Self> {
        let config = options.config();
        let host = window
            .query_selector(&config.fixed_container_location)?
            .ok_or_else(|| {
                FixedFootnotesError::HostNotFound(config.fixed_container_location.clone())
            })?;

        let container = window.create_element("section")?;
        if !config.fixed_container_id.is_empty() {
            window.set_attribute(&container, "id", &config.fixed_container_id)?;
        }
        window.add_class(&container, &config.fixed_container_class)?;
        let content = window.create_element("ul")?;
        window.append_child(&container, &content)?;
        window.append_child(&host, &container)?;

        let interval = config.throttle_interval();
        let inner = Rc::new_cyclic(|this: &Weak<Inner<W>>| {
            let target = this.clone();
            let throttle = Throttle::new(&window, interval, move || {
                if let Some(inner) = target.upgrade() {
                    inner.refresh_from_event();
                }
            });
            let gate = throttle.clone();
            let handler: EventHandler = Rc::new(move || gate.call());

            Inner {
                this: this.clone(),
                window: window.clone(),
                options,
                container,
                content,
                listeners: RefCell::new(RefreshListeners::new()),
                throttle,
                handler,
                pending: RefCell::new(Vec::new()),
                next_token: Cell::new(0),
                displayed: Cell::new(0),
            }
        });

        window.add_event_listener(EventType::Scroll, inner.handler.clone());
        window.add_event_listener(EventType::Resize, inner.handler.clone());

        tracing::info!(
            "Fixed footnotes attached under '{}' for '{}'",
            inner.options.config().fixed_container_location,
            inner.options.config().references_selector
        );

        if let Err(err) = inner.refresh() {
            if let Err(teardown) = inner.teardown() {
                tracing::warn!("Teardown after failed start: {}", teardown);
            }
            return Err(err);
        }
        Ok(Self { inner })
    }

    /// Rebuild the overlay now, bypassing the throttle. Returns the number
    /// of displayed notes.
    pub fn refresh(&self) -> Result<usize> {
        self.inner.refresh()
    }

    /// Run `listener` after every refresh has been painted
    pub fn add_refresh_listener(&self, listener: RefreshListener) {
        self.inner.listeners.borrow_mut().add(listener);
    }

    /// Remove the first registration of `listener`
    ///
    /// Unknown listeners are logged and ignored; returns whether one was
    /// removed.
    pub fn remove_refresh_listener(&self, listener: &RefreshListener) -> bool {
        let removed = self.inner.listeners.borrow_mut().remove(listener);
        if !removed {
            tracing::warn!("remove_refresh_listener: listener was never added");
        }
        removed
    }

    /// Detach the overlay and stop reacting to the window
    ///
    /// Cancels the pending throttled refresh and any listener dispatch still
    /// waiting for its frame.
    pub fn stop(self) -> Result<()> {
        self.inner.teardown()?;
        tracing::info!("Fixed footnotes stopped");
        Ok(())
    }

    /// The overlay `<section>`
    pub fn container(&self) -> &W::Node {
        &self.inner.container
    }

    /// The `<ul>` holding displayed notes
    pub fn content(&self) -> &W::Node {
        &self.inner.content
    }

    /// Displayed notes after the last refresh
    pub fn displayed_count(&self) -> usize {
        self.inner.displayed.get()
    }

    pub fn is_empty(&self) -> bool {
        self.displayed_count() == 0
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Listener dispatches scheduled but not yet run
    pub fn pending_dispatches(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    pub fn config(&self) -> &Config {
        self.inner.options.config()
    }

    pub fn window(&self) -> &Rc<W> {
        &self.inner.window
    }
}

impl<W: WindowHost> fmt::Debug for FixedFootnotes<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedFootnotes")
            .field("container", &self.inner.container)
            .field("displayed", &self.inner.displayed.get())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<W: WindowHost> Inner<W> {
    fn refresh(&self) -> Result<usize> {
        let window = &*self.window;
        let config = self.options.config();

        empty_element(window, &self.content)?;

        let markers = window.query_selector_all(&config.references_selector)?;
        let mut displayed = 0;
        for marker in &markers {
            let Some(note) = resolve_note(window, marker) else {
                continue;
            };
            if !is_visible(window, marker) || is_visible(window, &note) {
                continue;
            }
            let item = build_displayed_note(window, &note, &self.options)?;
            window.append_child(&self.content, &item)?;
            displayed += 1;
        }

        window.toggle_class(&self.container, EMPTY_CLASS, displayed == 0)?;
        self.displayed.set(displayed);
        tracing::debug!("Refreshed: {} markers, {} notes displayed", markers.len(), displayed);

        self.schedule_dispatch();
        Ok(displayed)
    }

    fn refresh_from_event(&self) {
        if let Err(err) = self.refresh() {
            tracing::error!("Refresh after window event failed: {}", err);
        }
    }

    fn schedule_dispatch(&self) {
        let listeners = self.listeners.borrow().snapshot();
        if listeners.is_empty() {
            return;
        }

        let token = self.next_token.get() + 1;
        self.next_token.set(token);

        let this = self.this.clone();
        let callback: Box<dyn FnOnce()> = Box::new(move || {
            let Some(inner) = this.upgrade() else {
                return;
            };
            inner.pending.borrow_mut().retain(|p| p.token != token);
            for listener in listeners {
                listener();
            }
        });

        let handle = if self.window.supports_animation_frames() {
            DispatchHandle::Frame(self.window.request_animation_frame(callback))
        } else {
            let delay = self.options.config().frame_fallback_delay();
            DispatchHandle::Timer(self.window.set_timeout(callback, delay))
        };
        self.pending.borrow_mut().push(PendingDispatch { token, handle });
    }

    fn teardown(&self) -> Result<()> {
        let window = &*self.window;

        self.throttle.cancel();
        for dispatch in self.pending.take() {
            match dispatch.handle {
                DispatchHandle::Frame(id) => window.cancel_animation_frame(id),
                DispatchHandle::Timer(id) => window.clear_timeout(id),
            }
        }

        window.remove_event_listener(EventType::Scroll, &self.handler);
        window.remove_event_listener(EventType::Resize, &self.handler);

        let parent = window.parent_node(&self.container).ok_or(DomError::NotAChild)?;
        window.remove_child(&parent, &self.container)?;
        Ok(())
    }
}
