//! Lifecycle notifications
//!
//! Each hook is optional; a missing hook is a no-op. Hooks run isolated: a
//! panic inside one is caught, logged as [`CountUpError::CallbackFailure`]
//! and does not interrupt the animation.

use countup_core::{CountUpError, Result};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Callback receiving the value associated with a lifecycle event
pub type NotifyCallback = Box<dyn FnMut(f64)>;

/// Which lifecycle event a hook observes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationHook {
    /// First processed frame of a run segment, with the start value
    Start,
    /// Every frame past the delay, with the displayed value
    Update,
    /// Progress reached 1, with the end value
    Complete,
}

impl NotificationHook {
    pub fn name(self) -> &'static str {
        match self {
            NotificationHook::Start => "on_start",
            NotificationHook::Update => "on_update",
            NotificationHook::Complete => "on_complete",
        }
    }
}

/// The three observation points of a counter
#[derive(Default)]
pub struct Notifications {
    on_start: Option<NotifyCallback>,
    on_update: Option<NotifyCallback>,
    on_complete: Option<NotifyCallback>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, hook: NotificationHook) -> &mut Option<NotifyCallback> {
        match hook {
            NotificationHook::Start => &mut self.on_start,
            NotificationHook::Update => &mut self.on_update,
            NotificationHook::Complete => &mut self.on_complete,
        }
    }

    pub fn set(&mut self, hook: NotificationHook, callback: NotifyCallback) {
        *self.slot_mut(hook) = Some(callback);
    }

    pub fn is_set(&self, hook: NotificationHook) -> bool {
        match hook {
            NotificationHook::Start => self.on_start.is_some(),
            NotificationHook::Update => self.on_update.is_some(),
            NotificationHook::Complete => self.on_complete.is_some(),
        }
    }

    /// Remove the callback for `hook` so it can run without `self` borrowed
    pub fn take(&mut self, hook: NotificationHook) -> Option<NotifyCallback> {
        self.slot_mut(hook).take()
    }

    /// Put back a callback removed with [`take`](Self::take)
    ///
    /// A callback installed for `hook` in the meantime wins and `callback`
    /// is dropped.
    pub fn restore(&mut self, hook: NotificationHook, callback: NotifyCallback) {
        let slot = self.slot_mut(hook);
        if slot.is_none() {
            *slot = Some(callback);
        }
    }

    /// Invoke `hook` with `value`
    ///
    /// Returns `CallbackFailure` if the callback panicked. The failure is
    /// already logged; callers may ignore it.
    pub fn fire(&mut self, hook: NotificationHook, value: f64) -> Result<()> {
        match self.slot_mut(hook) {
            Some(callback) => invoke(hook, callback, value),
            None => Ok(()),
        }
    }
}

/// Run one callback, catching and logging a panic
pub fn invoke(hook: NotificationHook, callback: &mut NotifyCallback, value: f64) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| callback(value))).map_err(|payload| {
        let err = CountUpError::CallbackFailure {
            hook: hook.name(),
            message: panic_message(payload.as_ref()),
        };
        tracing::warn!("{}", err);
        err
    })
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_missing_hook_is_noop() {
        let mut notifications = Notifications::new();
        assert!(notifications.fire(NotificationHook::Update, 1.0).is_ok());
    }

    #[test]
    fn test_fire_passes_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut notifications = Notifications::new();
        notifications.set(
            NotificationHook::Update,
            Box::new(move |v| sink.borrow_mut().push(v)),
        );

        notifications.fire(NotificationHook::Update, 1.5).unwrap();
        notifications.fire(NotificationHook::Start, 0.0).unwrap();
        assert_eq!(*seen.borrow(), vec![1.5]);
    }

    #[test]
    fn test_panicking_hook_is_isolated() {
        let mut notifications = Notifications::new();
        notifications.set(
            NotificationHook::Complete,
            Box::new(|_| panic!("display detached")),
        );

        let err = notifications
            .fire(NotificationHook::Complete, 100.0)
            .unwrap_err();
        assert_eq!(
            err,
            CountUpError::CallbackFailure {
                hook: "on_complete",
                message: "display detached".to_string(),
            }
        );

        // The hook stays installed and can fail again without poisoning anything
        assert!(notifications.fire(NotificationHook::Complete, 100.0).is_err());
    }

    #[test]
    fn test_restore_keeps_replacement() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (old, new) = (seen.clone(), seen.clone());

        let mut notifications = Notifications::new();
        notifications.set(
            NotificationHook::Start,
            Box::new(move |_| old.borrow_mut().push("old")),
        );

        let taken = notifications.take(NotificationHook::Start).unwrap();
        assert!(!notifications.is_set(NotificationHook::Start));
        notifications.set(
            NotificationHook::Start,
            Box::new(move |_| new.borrow_mut().push("new")),
        );
        notifications.restore(NotificationHook::Start, taken);

        notifications.fire(NotificationHook::Start, 0.0).unwrap();
        assert_eq!(*seen.borrow(), vec!["new"]);
    }

    #[test]
    fn test_restore_into_empty_slot() {
        let mut notifications = Notifications::new();
        notifications.set(NotificationHook::Update, Box::new(|_| {}));

        let mut taken = notifications.take(NotificationHook::Update).unwrap();
        invoke(NotificationHook::Update, &mut taken, 1.0).unwrap();
        notifications.restore(NotificationHook::Update, taken);
        assert!(notifications.is_set(NotificationHook::Update));
    }
}
