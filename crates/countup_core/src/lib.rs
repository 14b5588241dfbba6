//! CountUp Core
//!
//! Boundary contracts shared by the counter engine and its hosts.
//!
//! # Architecture
//!
//! - [`FrameClock`] - delivers one timestamped callback per display refresh
//! - [`DisplayTarget`] - the text element a counter renders into
//! - [`CountUpError`] - configuration and callback failures
//!
//! [`ManualFrameClock`] and [`TextBuffer`] are in-process implementations of
//! the first two, used by the terminal host and by tests.

mod display;
mod error;
mod frame;
pub mod parse;

pub use display::{DisplayTarget, TextBuffer};
pub use error::{CountUpError, Result};
pub use frame::{FrameCallback, FrameClock, FrameHandle, ManualFrameClock};
pub use parse::{parse_float_prefix, parse_int_prefix};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::display::{DisplayTarget, TextBuffer};
    pub use crate::error::{CountUpError, Result};
    pub use crate::frame::{FrameCallback, FrameClock, FrameHandle, ManualFrameClock};
}
