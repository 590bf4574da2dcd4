//! Dark/light theme preference.
//!
//! The choice is applied as `data-theme` on the root element and persisted in
//! localStorage, so it survives reloads.

#[cfg(target_arch = "wasm32")]
use crate::config::ConfigError;
#[cfg(target_arch = "wasm32")]
use crate::constants::THEME_STORAGE_KEY;

/// Theme choice - dark or light mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

impl ThemeChoice {
    /// Value stored in localStorage and in `data-theme`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeChoice::Dark => "dark",
            ThemeChoice::Light => "light",
        }
    }

    /// Parse a stored value. Anything unrecognized means dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => ThemeChoice::Light,
            _ => ThemeChoice::Dark,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::Dark,
        }
    }

    /// Icon class of the toggle button: it shows the theme you would switch to.
    pub fn icon_class(&self) -> &'static str {
        match self {
            ThemeChoice::Dark => "fas fa-sun",
            ThemeChoice::Light => "fas fa-moon",
        }
    }

    /// Try to load the preference from localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Self {
        let stored = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .and_then(|storage| match storage.get_item(THEME_STORAGE_KEY) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Failed to read theme from localStorage: {:?}", e);
                    None
                }
            });
        Self::from_stored(stored.as_deref())
    }

    /// Save the preference to localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        storage
            .set_item(THEME_STORAGE_KEY, self.as_str())
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::debug!("Saved theme '{}' to localStorage", self.as_str());
        Ok(())
    }
}

/// Apply the stored theme and wire the toggle button (WASM only).
///
/// The toggle is optional markup; without it the stored theme is still
/// applied.
#[cfg(target_arch = "wasm32")]
pub fn install_theme_toggle() {
    use gloo::events::EventListener;
    use wasm_bindgen::JsCast;

    use crate::constants::dom::THEME_TOGGLE_ID;

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Some(root) = document.document_element() else {
        return;
    };

    let icon = document
        .get_element_by_id(THEME_TOGGLE_ID)
        .and_then(|toggle| toggle.query_selector("i").ok().flatten());

    let apply = move |root: &web_sys::Element, icon: Option<&web_sys::Element>, theme: ThemeChoice| {
        if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
            log::warn!("Failed to set data-theme: {:?}", e);
        }
        if let Some(icon) = icon {
            icon.set_class_name(theme.icon_class());
        }
    };

    let initial = ThemeChoice::load_from_local_storage();
    apply(&root, icon.as_ref(), initial);
    log::debug!("Theme '{}' applied", initial.as_str());

    let Some(toggle) = document.get_element_by_id(THEME_TOGGLE_ID) else {
        log::debug!("No #{} element, theme toggle disabled", THEME_TOGGLE_ID);
        return;
    };
    let Ok(toggle) = toggle.dyn_into::<web_sys::HtmlElement>() else {
        return;
    };

    EventListener::new(&toggle, "click", move |_event| {
        let current = ThemeChoice::from_stored(root.get_attribute("data-theme").as_deref());
        let next = current.toggled();
        apply(&root, icon.as_ref(), next);
        if let Err(e) = next.save_to_local_storage() {
            log::warn!("{}", e);
        }
    })
    .forget(); // Lives as long as the page
}
