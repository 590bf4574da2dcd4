//! Easing curves for the dissolve timeline.
//!
//! An easing maps linear progress `t` in `[0, 1]` to perceptual progress.
//! Inputs outside that range are clamped first, so every curve returns
//! exactly 0.0 at the start and exactly 1.0 at the end.

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No shaping, output equals input
    Linear,
    /// Fast start, slow finish
    CubicOut,
    /// Slow start and finish, symmetric around the midpoint
    #[default]
    CubicInOut,
}

impl Easing {
    /// Evaluate the curve at `t`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }

    /// Get the display name for this easing.
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::CubicOut => "cubic-out",
            Easing::CubicInOut => "cubic-in-out",
        }
    }
}
