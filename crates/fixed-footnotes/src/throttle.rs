//! Trailing-edge throttle
//!
//! The first call arms a timer for the interval; calls made while the
//! timer is pending are dropped. The callback runs once when the timer
//! fires, so a burst of events produces one invocation at the end of the
//! window.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use footnote_dom::{TimerId, Timers};

struct ThrottleState<T: Timers + 'static> {
    timers: Weak<T>,
    interval: Duration,
    pending: Cell<Option<TimerId>>,
    callback: Box<dyn Fn()>,
}

/// Throttled callback bound to a timer source
///
/// Holds the timer source weakly; once it is dropped, calls are no-ops.
pub struct Throttle<T: Timers + 'static> {
    state: Rc<ThrottleState<T>>,
}

impl<T: Timers + 'static> Throttle<T> {
    pub fn new<F>(timers: &Rc<T>, interval: Duration, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            state: Rc::new(ThrottleState {
                timers: Rc::downgrade(timers),
                interval,
                pending: Cell::new(None),
                callback: Box::new(callback),
            }),
        }
    }

    /// Request an invocation at the end of the current window
    pub fn call(&self) {
        if self.state.pending.get().is_some() {
            return;
        }
        let Some(timers) = self.state.timers.upgrade() else {
            return;
        };

        let weak_state = Rc::downgrade(&self.state);
        let id = timers.set_timeout(
            Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    state.pending.set(None);
                    (state.callback)();
                }
            }),
            self.state.interval,
        );
        self.state.pending.set(Some(id));
    }

    /// Drop the pending invocation, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let Some(id) = self.state.pending.take() else {
            return false;
        };
        if let Some(timers) = self.state.timers.upgrade() {
            timers.clear_timeout(id);
        }
        true
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    pub fn interval(&self) -> Duration {
        self.state.interval
    }
}

impl<T: Timers + 'static> Clone for Throttle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Timers + 'static> fmt::Debug for Throttle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("interval", &self.state.interval)
            .field("pending", &self.state.pending.get())
            .finish()
    }
}
