//! Browser gate.
//!
//! The dissolve relies on `feDisplacementMap` with very large scale values,
//! which WebKit renders unreliably. Pages served to a WebKit-only browser
//! show a static warning instead of the widget. The decision is a pure
//! function of the user-agent string.

use serde::{Deserialize, Serialize};

/// How the gate decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Block the Safari family by user agent
    #[default]
    Denylist,
    /// Every browser is let through
    Disabled,
}

/// Outcome of the gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Supported,
    /// Widget must not be set up
    Unsupported,
}

impl GateVerdict {
    pub fn is_supported(&self) -> bool {
        *self == GateVerdict::Supported
    }
}

/// True for Safari. Chrome-based browsers and Android WebViews also carry
/// "Safari" in their user agent and are excluded.
pub fn is_incompatible_engine(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    ua.contains("safari") && !ua.contains("chrome") && !ua.contains("android")
}

/// Evaluate the gate for a user agent.
pub fn evaluate(mode: GateMode, user_agent: &str) -> GateVerdict {
    match mode {
        GateMode::Disabled => GateVerdict::Supported,
        GateMode::Denylist if is_incompatible_engine(user_agent) => GateVerdict::Unsupported,
        GateMode::Denylist => GateVerdict::Supported,
    }
}
