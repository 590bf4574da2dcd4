use gloo::events::EventListener;
use wasm_bindgen::prelude::*;

use crate::config::WidgetConfig;
use crate::theme::install_theme_toggle;
use crate::widget;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = WidgetConfig::load_from_page();
    if console_log::init_with_level(config.log_level.to_level()).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Snap widget starting (log level {:?})", config.log_level);

    when_document_ready(move || run_widget(&config));
}

/// Run `f` once the document has been parsed.
fn when_document_ready(f: impl FnOnce() + 'static) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        log::error!("No document, widget not started");
        return;
    };

    if document.ready_state() != "loading" {
        f();
        return;
    }
    EventListener::once(&document, "DOMContentLoaded", move |_event| f()).forget();
}

fn run_widget(config: &WidgetConfig) {
    install_theme_toggle();

    match widget::passes_gate(config) {
        Ok(true) => {}
        Ok(false) => {
            log::warn!("Browser not supported, widget disabled");
            return;
        }
        Err(e) => {
            log::error!("Browser gate failed: {}", e);
            return;
        }
    }

    if let Err(e) = widget::mount(config) {
        log::error!("Failed to mount snap widget: {}", e);
    }
}
