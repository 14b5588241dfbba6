//! Counter configuration

use crate::easing::Easing;
use crate::format::{NumberFormat, NumberLocale};
use serde::{Deserialize, Serialize};

/// Default run time in milliseconds
pub const DEFAULT_DURATION_MS: f64 = 2000.0;

/// Default delay in milliseconds
pub const DEFAULT_DELAY_MS: f64 = 0.0;

/// Parameters of one counter
///
/// Fixed for the lifetime of an [`Animator`](crate::Animator); each
/// `start()` replays the same configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Value at progress 0; read from the target's text when `None`
    #[serde(rename = "start")]
    pub start_value: Option<f64>,
    /// Value at progress 1
    #[serde(rename = "end")]
    pub end_value: f64,
    /// Nominal run time in milliseconds, excluding the delay
    pub duration: f64,
    /// Milliseconds to wait before progress starts advancing
    pub delay: f64,
    pub easing: Easing,
    pub format: NumberFormat,
    pub locale: NumberLocale,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            start_value: None,
            end_value: 0.0,
            duration: DEFAULT_DURATION_MS,
            delay: DEFAULT_DELAY_MS,
            easing: Easing::default(),
            format: NumberFormat::default(),
            locale: NumberLocale::default(),
        }
    }
}

impl AnimationConfig {
    /// Count towards `end_value` with every other setting at its default
    pub fn to(end_value: f64) -> Self {
        Self {
            end_value,
            ..Self::default()
        }
    }

    /// Delay actually applied: negative or NaN delays count as none
    pub(crate) fn effective_delay(&self) -> f64 {
        if self.delay > 0.0 {
            self.delay
        } else {
            0.0
        }
    }

    /// Whether the duration is too small to divide by (zero, negative, NaN)
    pub(crate) fn is_degenerate(&self) -> bool {
        !(self.duration > 0.0)
    }
}
