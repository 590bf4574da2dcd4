//! Configuration for the snap widget.
//!
//! A page can embed a JSON `WidgetConfig` in a
//! `<script type="application/json" id="snap-config">` element. Every field
//! is optional; anything left out takes the default, which is a same-origin
//! deployment with the cinematic dissolve.

use serde::{Deserialize, Serialize};
use snap_fx::{DissolveSettings, DissolveTimeline, FxError};

use crate::api::{CrossOrigin, Endpoints, RequestOptions};
use crate::constants::endpoints;
use crate::gate::GateMode;

/// Log level setting for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }

    /// Convert to log crate's Level.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Named dissolve parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPreset {
    /// 2s, cubic-in-out, fade from 60%
    #[default]
    Cinematic,
    /// 1s, cubic-out, linear fade from 50%
    Classic,
}

impl AnimationPreset {
    pub fn settings(&self) -> DissolveSettings {
        match self {
            AnimationPreset::Cinematic => DissolveSettings::cinematic(),
            AnimationPreset::Classic => DissolveSettings::classic(),
        }
    }
}

/// Current configuration format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Version of the configuration format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Dissolve preset, used unless `animation` is given
    #[serde(default)]
    pub preset: AnimationPreset,

    /// Explicit dissolve parameters, overriding the preset
    #[serde(default)]
    pub animation: Option<DissolveSettings>,

    /// Prefix for the storage service paths, empty for same-origin
    #[serde(default)]
    pub endpoint_base_url: String,

    /// Base used instead of `endpoint_base_url` when the page is not served
    /// from a local host
    #[serde(default)]
    pub remote_base_url: Option<String>,

    /// Path under which stored images are served
    #[serde(default = "default_uploads_path")]
    pub uploads_path: String,

    /// Extra request settings for cross-origin deployments
    #[serde(default)]
    pub cross_origin: Option<CrossOrigin>,

    /// Browser gate behavior
    #[serde(default)]
    pub gate: GateMode,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_uploads_path() -> String {
    endpoints::DEFAULT_UPLOADS_PATH.to_string()
}

/// Whether `hostname` is a development host.
pub fn is_local_host(hostname: &str) -> bool {
    hostname == "localhost" || hostname.contains("127.0.0.1")
}

impl WidgetConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preset: AnimationPreset::default(),
            animation: None,
            endpoint_base_url: String::new(),
            remote_base_url: None,
            uploads_path: default_uploads_path(),
            cross_origin: None,
            gate: GateMode::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.dissolve_settings().validate()?;
        Ok(config)
    }

    /// Effective dissolve parameters.
    pub fn dissolve_settings(&self) -> DissolveSettings {
        self.animation.unwrap_or_else(|| self.preset.settings())
    }

    pub fn timeline(&self) -> Result<DissolveTimeline, ConfigError> {
        Ok(DissolveTimeline::new(self.dissolve_settings())?)
    }

    /// Base URL for a page served from `hostname`.
    pub fn resolve_base_url(&self, hostname: &str) -> &str {
        match &self.remote_base_url {
            Some(remote) if !is_local_host(hostname) => remote,
            _ => &self.endpoint_base_url,
        }
    }

    pub fn endpoints(&self, hostname: &str) -> Endpoints {
        Endpoints::new(self.resolve_base_url(hostname), self.uploads_path.as_str())
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::for_deployment(self.cross_origin.as_ref())
    }

    /// Load configuration from the page's config element (WASM only).
    /// Falls back to defaults when the element is missing or invalid.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_page() -> Self {
        use crate::constants::dom::CONFIG_SCRIPT_ID;

        let Some(text) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CONFIG_SCRIPT_ID))
            .and_then(|element| element.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                // The logger is not installed yet, report straight to the console.
                web_sys::console::warn_1(
                    &format!("Ignoring #{} ({}), using defaults", CONFIG_SCRIPT_ID, e).into(),
                );
                Self::default()
            }
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Dissolve parameters cannot produce a finite animation
    #[error("Invalid animation: {0}")]
    Animation(#[from] FxError),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}
