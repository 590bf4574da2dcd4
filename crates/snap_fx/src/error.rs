//! Error types for dissolve settings.

use thiserror::Error;

/// Settings that cannot produce a terminating animation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// Duration is zero, negative or not finite
    #[error("Animation duration must be positive, got {duration_ms}ms")]
    InvalidDuration {
        /// The rejected duration
        duration_ms: f64,
    },

    /// Fade threshold outside `[0, 1)`
    #[error("Opacity threshold must be in [0, 1), got {threshold}")]
    InvalidThreshold {
        /// The rejected threshold
        threshold: f32,
    },

    /// A scale parameter is negative or not finite
    #[error("Invalid {name}: {value}")]
    InvalidScale {
        /// Which setting was rejected
        name: &'static str,
        /// The rejected value
        value: f32,
    },
}
