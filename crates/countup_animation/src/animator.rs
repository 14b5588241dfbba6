//! Counter animator
//!
//! The [`Animator`] is a timed-progress state machine driven by a
//! [`FrameClock`]. It schedules one frame at a time, converts each frame's
//! timestamp into eased progress, renders the resulting value into its
//! [`DisplayTarget`] and reports lifecycle events through [`Notifications`].
//!
//! # Phases
//!
//! ```text
//!   Idle --start()--> Delayed --delay elapsed--> Running --progress 1--> Complete
//!                        |                          |
//!                        +--------pause()-----------+--> Paused --resume()--> Delayed/Running
//! ```
//!
//! `reset()` returns to `Idle` from anywhere; `start()` restarts from
//! anywhere.
//!
//! # Time accounting
//!
//! Pausing records how much of the delay and of the duration were consumed.
//! Resuming replays only what is left, measured from the first frame after
//! the resume, so a pause/resume pair never loses or gains animation time and
//! the displayed value continues from where it stopped.
//!
//! # Stale frames
//!
//! Every scheduled frame captures the run generation. `start`, `pause`,
//! `resume` and `reset` bump the generation, so a frame the clock delivers
//! after its run was interrupted is ignored.

use crate::config::AnimationConfig;
use crate::easing::Easing;
use crate::format::{format_value, read_displayed_number, NumberFormat, NumberLocale};
use crate::notify::{self, NotificationHook, Notifications};
use countup_core::{CountUpError, DisplayTarget, FrameClock, FrameHandle, Result};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Where an animator is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorPhase {
    /// Constructed or reset; showing the start value
    Idle,
    /// Running, waiting for the delay to pass
    Delayed,
    /// Running, progress advancing
    Running,
    /// Interrupted with partial progress retained
    Paused,
    /// Progress reached 1; showing the end value
    Complete,
}

impl AnimatorPhase {
    /// Whether a frame is (or should be) scheduled
    pub fn is_running(self) -> bool {
        matches!(self, AnimatorPhase::Delayed | AnimatorPhase::Running)
    }
}

/// Mutable run state
#[derive(Debug)]
struct AnimatorState {
    phase: AnimatorPhase,
    /// Frame time of the first frame in the current run segment
    start_timestamp: Option<f64>,
    /// Time since `start_timestamp`
    elapsed: f64,
    /// Post-delay length of the current run segment
    duration: f64,
    /// Post-delay time still to run when paused
    remaining: f64,
    /// Delay still to wait in the current run segment
    delay: f64,
    /// Post-delay time consumed by earlier segments of this run
    carried: f64,
    progress: f64,
    current_value: f64,
    pending: Option<FrameHandle>,
    generation: u64,
}

impl AnimatorState {
    fn new(config: &AnimationConfig, start_value: f64) -> Self {
        Self {
            phase: AnimatorPhase::Idle,
            start_timestamp: None,
            elapsed: 0.0,
            duration: config.duration,
            remaining: config.duration,
            delay: config.effective_delay(),
            carried: 0.0,
            progress: 0.0,
            current_value: start_value,
            pending: None,
            generation: 0,
        }
    }

    /// Rewind to the beginning of a run without touching phase or generation
    fn rewind(&mut self, config: &AnimationConfig, start_value: f64) {
        self.start_timestamp = None;
        self.elapsed = 0.0;
        self.duration = config.duration;
        self.remaining = config.duration;
        self.delay = config.effective_delay();
        self.carried = 0.0;
        self.progress = 0.0;
        self.current_value = start_value;
    }
}

/// Side effects of a frame, applied after the state borrow is released
#[derive(Debug, Clone, Copy)]
enum Effect {
    Render(f64),
    Notify(NotificationHook, f64),
}

struct AnimatorShared {
    target: Rc<dyn DisplayTarget>,
    clock: Rc<dyn FrameClock>,
    config: AnimationConfig,
    /// Resolved start value (explicit or read from the target)
    start_value: f64,
    state: RefCell<AnimatorState>,
    notifications: RefCell<Notifications>,
}

impl AnimatorShared {
    fn render(&self, value: f64) {
        let text = format_value(value, &self.config.format, &self.config.locale);
        self.target.set_text(&text);
    }

    fn cancel_pending(&self, state: &mut AnimatorState) {
        if let Some(handle) = state.pending.take() {
            self.clock.cancel_frame(handle);
        }
    }

    /// Request the next frame for the current generation
    fn schedule(self: &Rc<Self>, state: &mut AnimatorState) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let generation = state.generation;
        let handle = self.clock.request_frame(Box::new(move |timestamp| {
            if let Some(shared) = weak.upgrade() {
                shared.on_frame(generation, timestamp);
            }
        }));
        state.pending = Some(handle);
    }

    /// Progress of the whole run after `time_after_delay` ms of this segment
    fn progress_at(&self, state: &AnimatorState, time_after_delay: f64) -> f64 {
        if self.config.is_degenerate() {
            return 1.0;
        }
        let progress = (state.carried + time_after_delay) / self.config.duration;
        if progress.is_nan() {
            1.0
        } else {
            progress.clamp(0.0, 1.0)
        }
    }

    fn on_frame(self: &Rc<Self>, generation: u64, timestamp: f64) {
        let mut effects: SmallVec<[Effect; 4]> = SmallVec::new();

        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || !state.phase.is_running() {
                tracing::trace!(
                    "Animator: ignoring stale frame (generation {} != {})",
                    generation,
                    state.generation
                );
                return;
            }
            state.pending = None;

            let start = match state.start_timestamp {
                Some(start) => start,
                None => {
                    state.start_timestamp = Some(timestamp);
                    effects.push(Effect::Notify(NotificationHook::Start, self.start_value));
                    timestamp
                }
            };
            state.elapsed = timestamp - start;

            if state.elapsed < state.delay {
                state.phase = AnimatorPhase::Delayed;
                self.schedule(&mut state);
            } else {
                let time_after_delay = state.elapsed - state.delay;
                let progress = self.progress_at(&state, time_after_delay);
                let eased = self.config.easing.apply(progress);
                let value = self.start_value + (self.config.end_value - self.start_value) * eased;

                state.phase = AnimatorPhase::Running;
                state.progress = progress;
                state.current_value = value;
                effects.push(Effect::Render(value));
                effects.push(Effect::Notify(NotificationHook::Update, value));

                if progress < 1.0 {
                    self.schedule(&mut state);
                } else {
                    let end = self.config.end_value;
                    state.phase = AnimatorPhase::Complete;
                    state.current_value = end;
                    state.remaining = 0.0;
                    state.carried = self.config.duration.max(0.0);
                    tracing::debug!("Animator: complete at {}", end);
                    effects.push(Effect::Render(end));
                    effects.push(Effect::Notify(NotificationHook::Complete, end));
                }
            }
        }

        self.apply(generation, &effects);
    }

    /// Apply frame effects in order
    ///
    /// A notification may call back into the animator. If it interrupted the
    /// run (changed the generation), the rest of the frame is dropped.
    fn apply(&self, generation: u64, effects: &[Effect]) {
        for effect in effects {
            if self.state.borrow().generation != generation {
                tracing::debug!("Animator: run interrupted by a notification");
                return;
            }
            match *effect {
                Effect::Render(value) => self.render(value),
                Effect::Notify(hook, value) => {
                    // Run unborrowed: the callback may install hooks on this animator
                    let callback = self.notifications.borrow_mut().take(hook);
                    if let Some(mut callback) = callback {
                        // Failures are logged by `invoke`
                        let _ = notify::invoke(hook, &mut callback, value);
                        self.notifications.borrow_mut().restore(hook, callback);
                    }
                }
            }
        }
    }
}

impl Drop for AnimatorShared {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().pending.take() {
            self.clock.cancel_frame(handle);
        }
    }
}

/// A counter bound to one display target
///
/// Cloning yields another handle to the same counter. When the last handle is
/// dropped, any scheduled frame is cancelled.
///
/// # Example
///
/// ```
/// use countup_animation::Animator;
/// use countup_core::{DisplayTarget, ManualFrameClock, TextBuffer};
/// use std::rc::Rc;
///
/// let clock = Rc::new(ManualFrameClock::new());
/// let display = Rc::new(TextBuffer::new());
///
/// let counter = Animator::builder(display.clone())
///     .end_value(1000.0)
///     .duration(500.0)
///     .build(clock.clone())
///     .unwrap();
///
/// counter.start();
/// clock.run_until_idle(16.0, 1000);
/// assert_eq!(display.text(), "1,000");
/// ```
#[derive(Clone)]
pub struct Animator {
    shared: Rc<AnimatorShared>,
}

impl Animator {
    /// Start building a counter for `target`
    pub fn builder(target: Rc<dyn DisplayTarget>) -> AnimatorBuilder {
        AnimatorBuilder::new().target(target)
    }

    /// Create a counter with no notification hooks
    ///
    /// The target immediately displays the start value.
    pub fn new(
        target: Rc<dyn DisplayTarget>,
        config: AnimationConfig,
        clock: Rc<dyn FrameClock>,
    ) -> Self {
        Self::with_notifications(target, config, Notifications::default(), clock)
    }

    /// Create a counter with notification hooks
    pub fn with_notifications(
        target: Rc<dyn DisplayTarget>,
        config: AnimationConfig,
        notifications: Notifications,
        clock: Rc<dyn FrameClock>,
    ) -> Self {
        let start_value = config
            .start_value
            .unwrap_or_else(|| read_displayed_number(target.as_ref(), &config.locale));

        let shared = Rc::new(AnimatorShared {
            state: RefCell::new(AnimatorState::new(&config, start_value)),
            target,
            clock,
            config,
            start_value,
            notifications: RefCell::new(notifications),
        });
        shared.render(start_value);

        tracing::debug!(
            "Animator: created {} -> {} over {}ms (delay {}ms)",
            start_value,
            shared.config.end_value,
            shared.config.duration,
            shared.config.delay
        );

        Self { shared }
    }

    /// Begin a run from the start value
    ///
    /// Cancels any pending frame and restarts from the beginning, whatever
    /// the current phase.
    pub fn start(&self) {
        let shared = &self.shared;
        {
            let mut state = shared.state.borrow_mut();
            shared.cancel_pending(&mut state);
            state.generation += 1;
            state.rewind(&shared.config, shared.start_value);
            state.phase = if state.delay > 0.0 {
                AnimatorPhase::Delayed
            } else {
                AnimatorPhase::Running
            };
            shared.schedule(&mut state);
            tracing::debug!("Animator: start (generation {})", state.generation);
        }
        shared.render(shared.start_value);
    }

    /// Interrupt a running counter, keeping its progress
    ///
    /// No-op unless the counter is running.
    pub fn pause(&self) {
        let shared = &self.shared;
        let mut state = shared.state.borrow_mut();
        if !state.phase.is_running() || state.pending.is_none() {
            tracing::debug!("Animator: pause ignored in {:?}", state.phase);
            return;
        }

        shared.cancel_pending(&mut state);
        state.generation += 1;

        let consumed = (state.elapsed - state.delay).max(0.0);
        state.remaining = (state.duration - consumed).max(0.0);
        state.carried = (state.carried + consumed).min(shared.config.duration.max(0.0));
        state.delay = (state.delay - state.elapsed).max(0.0);
        state.phase = AnimatorPhase::Paused;

        tracing::debug!(
            "Animator: paused with {}ms remaining ({}ms delay)",
            state.remaining,
            state.delay
        );
    }

    /// Continue a paused counter for its remaining time
    ///
    /// In `Idle` this behaves like [`start`](Self::start). A completed or
    /// running counter is left alone.
    pub fn resume(&self) {
        let shared = &self.shared;
        let phase = shared.state.borrow().phase;
        match phase {
            AnimatorPhase::Paused => {}
            AnimatorPhase::Idle => return self.start(),
            _ => {
                tracing::debug!("Animator: resume ignored in {:?}", phase);
                return;
            }
        }

        let mut state = shared.state.borrow_mut();
        state.generation += 1;
        state.duration = state.remaining;
        state.start_timestamp = None;
        state.elapsed = 0.0;
        state.phase = if state.delay > 0.0 {
            AnimatorPhase::Delayed
        } else {
            AnimatorPhase::Running
        };
        shared.schedule(&mut state);
        tracing::debug!("Animator: resume with {}ms remaining", state.duration);
    }

    /// Stop and show the start value again
    pub fn reset(&self) {
        let shared = &self.shared;
        {
            let mut state = shared.state.borrow_mut();
            shared.cancel_pending(&mut state);
            state.generation += 1;
            state.rewind(&shared.config, shared.start_value);
            state.phase = AnimatorPhase::Idle;
            tracing::debug!("Animator: reset");
        }
        shared.render(shared.start_value);
    }

    /// Install the `on_start` hook
    pub fn on_start<F: FnMut(f64) + 'static>(&self, f: F) {
        self.set_hook(NotificationHook::Start, f);
    }

    /// Install the `on_update` hook
    pub fn on_update<F: FnMut(f64) + 'static>(&self, f: F) {
        self.set_hook(NotificationHook::Update, f);
    }

    /// Install the `on_complete` hook
    pub fn on_complete<F: FnMut(f64) + 'static>(&self, f: F) {
        self.set_hook(NotificationHook::Complete, f);
    }

    fn set_hook<F: FnMut(f64) + 'static>(&self, hook: NotificationHook, f: F) {
        self.shared
            .notifications
            .borrow_mut()
            .set(hook, Box::new(f));
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.shared.state.borrow().phase
    }

    /// Whether no frame is scheduled (idle, paused or complete)
    pub fn is_paused(&self) -> bool {
        !self.phase().is_running()
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == AnimatorPhase::Complete
    }

    /// Linear progress of the current run in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.shared.state.borrow().progress
    }

    /// Value most recently computed (full precision)
    pub fn current_value(&self) -> f64 {
        self.shared.state.borrow().current_value
    }

    /// Post-delay milliseconds left, as of the last pause
    pub fn remaining(&self) -> f64 {
        self.shared.state.borrow().remaining
    }

    /// Milliseconds since the first frame of the current run segment
    pub fn elapsed(&self) -> f64 {
        self.shared.state.borrow().elapsed
    }

    pub fn has_pending_frame(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }

    pub fn start_value(&self) -> f64 {
        self.shared.start_value
    }

    pub fn end_value(&self) -> f64 {
        self.shared.config.end_value
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.shared.config
    }
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("config", &self.shared.config)
            .field("start_value", &self.shared.start_value)
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

/// Builder for [`Animator`]
///
/// A target is required; everything else defaults as in
/// [`AnimationConfig::default`].
#[derive(Default)]
pub struct AnimatorBuilder {
    target: Option<Rc<dyn DisplayTarget>>,
    config: AnimationConfig,
    notifications: Notifications,
}

impl AnimatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: Rc<dyn DisplayTarget>) -> Self {
        self.target = Some(target);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: AnimationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn start_value(mut self, value: f64) -> Self {
        self.config.start_value = Some(value);
        self
    }

    pub fn end_value(mut self, value: f64) -> Self {
        self.config.end_value = value;
        self
    }

    /// Run time in milliseconds
    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.config.duration = duration_ms;
        self
    }

    /// Delay before counting, in milliseconds
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.config.delay = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.config.easing = easing;
        self
    }

    pub fn format(mut self, format: NumberFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn locale(mut self, locale: NumberLocale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn on_start<F: FnMut(f64) + 'static>(mut self, f: F) -> Self {
        self.notifications.set(NotificationHook::Start, Box::new(f));
        self
    }

    pub fn on_update<F: FnMut(f64) + 'static>(mut self, f: F) -> Self {
        self.notifications.set(NotificationHook::Update, Box::new(f));
        self
    }

    pub fn on_complete<F: FnMut(f64) + 'static>(mut self, f: F) -> Self {
        self.notifications.set(NotificationHook::Complete, Box::new(f));
        self
    }

    /// Create the animator
    ///
    /// Fails with [`CountUpError::MissingTarget`] if no target was set.
    pub fn build(self, clock: Rc<dyn FrameClock>) -> Result<Animator> {
        let target = self.target.ok_or(CountUpError::MissingTarget)?;
        Ok(Animator::with_notifications(
            target,
            self.config,
            self.notifications,
            clock,
        ))
    }
}
