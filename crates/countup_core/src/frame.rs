//! Frame clock contract
//!
//! Counters never measure time themselves. They ask a [`FrameClock`] for a
//! callback on the next display refresh and receive a timestamp (in
//! milliseconds, monotonically non-decreasing) when it fires.
//!
//! [`ManualFrameClock`] is the in-process implementation: it queues callbacks
//! and delivers them when the host calls [`ManualFrameClock::tick`]. Hosts
//! with a real refresh loop (a window, a terminal) call `tick` once per
//! refresh; tests call it with synthetic timestamps.

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};

new_key_type! {
    /// Handle to a scheduled frame callback
    pub struct FrameHandle;
}

/// Callback invoked with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Source of per-refresh callbacks
///
/// Implementations must not invoke a callback from inside `request_frame`;
/// it runs on a later refresh, after the requester has returned.
pub trait FrameClock {
    /// Schedule `callback` for the next frame
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a scheduled callback
    ///
    /// Cancelling a handle that already fired or was already cancelled is a
    /// no-op.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// A frame clock driven explicitly by the host
///
/// Callbacks requested while a tick is being delivered run on the following
/// tick, so a callback that reschedules itself advances one frame per tick.
///
/// # Example
///
/// ```
/// use countup_core::{FrameClock, ManualFrameClock};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let clock = ManualFrameClock::new();
/// let seen = Rc::new(Cell::new(0.0));
/// let sink = seen.clone();
/// clock.request_frame(Box::new(move |t| sink.set(t)));
///
/// assert_eq!(clock.tick(16.0), 1);
/// assert_eq!(seen.get(), 16.0);
/// ```
#[derive(Default)]
pub struct ManualFrameClock {
    callbacks: RefCell<SlotMap<FrameHandle, FrameCallback>>,
    /// Request order; handles whose callback was cancelled are skipped
    queue: RefCell<Vec<FrameHandle>>,
    now: Cell<f64>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the most recent tick
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Number of callbacks waiting for the next tick
    pub fn pending_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Check if any callback is waiting for the next tick
    pub fn has_pending(&self) -> bool {
        !self.callbacks.borrow().is_empty()
    }

    /// Deliver one frame at `timestamp`
    ///
    /// Every callback pending when the tick begins is invoked in request
    /// order. A timestamp earlier than the previous tick is clamped to it.
    /// Returns the number of callbacks invoked.
    pub fn tick(&self, timestamp: f64) -> usize {
        let timestamp = if timestamp < self.now.get() {
            tracing::warn!(
                "ManualFrameClock: timestamp {} went backwards, clamping to {}",
                timestamp,
                self.now.get()
            );
            self.now.get()
        } else {
            timestamp
        };
        self.now.set(timestamp);

        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let mut delivered = 0;

        for handle in due {
            // Release the borrow before invoking: the callback may request or
            // cancel frames on this clock.
            let callback = self.callbacks.borrow_mut().remove(handle);
            if let Some(callback) = callback {
                callback(timestamp);
                delivered += 1;
            }
        }

        delivered
    }

    /// Deliver one frame `dt` milliseconds after the previous tick
    pub fn advance(&self, dt: f64) -> usize {
        self.tick(self.now.get() + dt)
    }

    /// Tick every `step` milliseconds until nothing is pending
    ///
    /// Stops after `max_frames` ticks. Returns the number of ticks delivered.
    pub fn run_until_idle(&self, step: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while self.has_pending() && frames < max_frames {
            self.advance(step);
            frames += 1;
        }
        frames
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.callbacks.borrow_mut().insert(callback);
        self.queue.borrow_mut().push(handle);
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if self.callbacks.borrow_mut().remove(handle).is_some() {
            self.queue.borrow_mut().retain(|h| *h != handle);
        }
    }
}
