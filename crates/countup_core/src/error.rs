//! CountUp error types

use thiserror::Error;

/// Errors raised while configuring or driving a counter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CountUpError {
    /// No display target was supplied at construction
    #[error("Display target must be provided")]
    MissingTarget,

    /// Configuration could not be interpreted (e.g. non-numeric end value)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A notification callback panicked; the run continues regardless
    #[error("Callback `{hook}` failed: {message}")]
    CallbackFailure {
        /// Which notification hook failed (`on_start`, `on_update`, `on_complete`)
        hook: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },
}

/// Result type for counter operations
pub type Result<T> = std::result::Result<T, CountUpError>;
