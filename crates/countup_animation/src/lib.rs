//! CountUp Animation Engine
//!
//! Animated numeric counters: a value moves from a start to an end number
//! over a duration, eased, and is rendered as formatted text on every frame.
//!
//! # Features
//!
//! - **Frame-driven**: one callback per refresh from any [`FrameClock`](countup_core::FrameClock)
//! - **Pausable**: pause/resume keeps progress and the remaining time
//! - **Easing**: ease-out-cubic by default, plus named curves and custom functions
//! - **Formatting**: grouped integers or two-decimal values, or a custom formatter
//! - **Notifications**: isolated `on_start` / `on_update` / `on_complete` hooks
//! - **Declarative**: attribute-driven counters started on first visibility

pub mod animator;
pub mod config;
pub mod declarative;
pub mod easing;
pub mod format;
pub mod notify;

pub use animator::{Animator, AnimatorBuilder, AnimatorPhase};
pub use config::{AnimationConfig, DEFAULT_DELAY_MS, DEFAULT_DURATION_MS};
pub use declarative::{
    parse_attributes, DeclarativeCountUp, DeclarativeElement, ElementId, TextElement,
    VISIBILITY_THRESHOLD,
};
pub use easing::{CustomEasing, Easing};
pub use format::{format_value, read_displayed_number, CustomFormat, NumberFormat, NumberLocale};
pub use notify::{NotificationHook, Notifications, NotifyCallback};
