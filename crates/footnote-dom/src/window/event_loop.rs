//! Event Loop
//!
//! Virtual-clock timer and animation frame queues. Time only moves when the
//! owner advances it, which keeps scheduling deterministic.

use std::time::Duration;

use super::{FrameId, TimerId};

struct Timer {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

struct FrameCallback {
    id: FrameId,
    callback: Box<dyn FnOnce()>,
}

/// Timer and frame queues
#[derive(Default)]
pub(crate) struct EventLoop {
    /// Current virtual time
    current_time: Duration,
    /// Pending timers
    timers: Vec<Timer>,
    /// Callbacks waiting for the next frame
    frames: Vec<FrameCallback>,
    /// Shared ID counter for timers and frames
    next_id: u64,
}

impl EventLoop {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn now(&self) -> Duration {
        self.current_time
    }

    /// Set a timeout
    pub(crate) fn set_timeout(&mut self, callback: Box<dyn FnOnce()>, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.push(Timer {
            id,
            due: self.current_time + delay,
            callback,
        });
        id
    }

    /// Clear a timeout
    pub(crate) fn clear_timer(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Remove the earliest timer due at or before `deadline` and move the
    /// clock to its due time. Ties fire in scheduling order.
    pub(crate) fn pop_due(&mut self, deadline: Duration) -> Option<Box<dyn FnOnce()>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        let timer = self.timers.remove(index);
        self.current_time = self.current_time.max(timer.due);
        Some(timer.callback)
    }

    /// Move the clock forward without running anything
    pub(crate) fn set_time(&mut self, time: Duration) {
        self.current_time = self.current_time.max(time);
    }

    pub(crate) fn request_frame(&mut self, callback: Box<dyn FnOnce()>) -> FrameId {
        let id = FrameId(self.next_id());
        self.frames.push(FrameCallback { id, callback });
        id
    }

    pub(crate) fn cancel_frame(&mut self, id: FrameId) {
        self.frames.retain(|f| f.id != id);
    }

    /// Take every callback queued for the next frame
    pub(crate) fn take_frames(&mut self) -> Vec<Box<dyn FnOnce()>> {
        std::mem::take(&mut self.frames)
            .into_iter()
            .map(|f| f.callback)
            .collect()
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.frames.len()
    }
}
