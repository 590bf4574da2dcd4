//! Browser binding of the upload/delete controller.
//!
//! Finds the page elements, attaches the drag/drop and click listeners,
//! drives the dissolve from `requestAnimationFrame` and performs the two
//! requests. Every decision is made by [`Controller`]; this module only
//! translates DOM events into controller calls and carries out the
//! [`Effect`]s that come back.
//!
//! The controller sits in a `RefCell`. Each borrow ends with the statement
//! that calls into it, before any effect runs or any request is awaited.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::net::http::{Request, RequestBuilder};
use gloo::render::{request_animation_frame, AnimationFrame};
use snap_fx::VisualParams;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, DragEvent, Element, Event, File, FileList, FormData, HtmlElement, HtmlImageElement,
    HtmlInputElement, RequestCredentials,
};
use web_time::Instant;

use crate::api::{self, RequestOptions, UploadedImage};
use crate::config::WidgetConfig;
use crate::constants::{dom, endpoints, PICKER_ACCEPT};
use crate::controller::{Controller, Effect};
use crate::error::{MountError, SnapError};
use crate::gate;
use crate::selection::{DragPhase, SelectedFile, SelectionSource};
use crate::status::Status;

thread_local! {
    /// The mounted widget. Kept here so its listeners live as long as the page.
    static WIDGET: RefCell<Option<Rc<SnapWidget>>> = const { RefCell::new(None) };
}

// ============================================================================
// Gate
// ============================================================================

/// Run the browser gate. On an unsupported browser the widget container is
/// swapped for the static warning and `Ok(false)` is returned.
pub fn passes_gate(config: &WidgetConfig) -> Result<bool, MountError> {
    let window = web_sys::window().ok_or(MountError::NoGlobal("window"))?;
    let user_agent = window.navigator().user_agent().unwrap_or_default();

    if gate::evaluate(config.gate, &user_agent).is_supported() {
        return Ok(true);
    }

    log::warn!("Unsupported browser: {}", user_agent);
    let document = window.document().ok_or(MountError::NoGlobal("document"))?;
    let container = query(&document, dom::MAIN_CONTAINER_SELECTOR)?;
    let warning = query(&document, dom::BROWSER_WARNING_SELECTOR)?;
    container
        .class_list()
        .add_1(dom::HIDDEN_CLASS)
        .map_err(dom_error)?;
    warning
        .class_list()
        .remove_1(dom::HIDDEN_CLASS)
        .map_err(dom_error)?;
    Ok(false)
}

// ============================================================================
// Elements
// ============================================================================

struct Elements {
    upload_container: HtmlElement,
    status: HtmlElement,
    image: HtmlImageElement,
    delete_button: HtmlElement,
    displacement_map: Element,
    noise: Element,
}

impl Elements {
    fn find(document: &Document) -> Result<Self, MountError> {
        let filter: Element = by_id(document, dom::DISSOLVE_FILTER_ID)?;
        Ok(Self {
            upload_container: by_id(document, dom::UPLOAD_CONTAINER_ID)?,
            status: by_id(document, dom::UPLOAD_STATUS_ID)?,
            image: by_id(document, dom::DISPLAYED_IMAGE_ID)?,
            delete_button: by_id(document, dom::DELETE_BUTTON_ID)?,
            displacement_map: query_in(&filter, dom::DISPLACEMENT_MAP_SELECTOR)?,
            noise: query_in(&filter, dom::NOISE_SELECTOR)?,
        })
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, MountError> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
        .ok_or_else(|| MountError::MissingElement {
            selector: format!("#{}", id),
        })
}

fn query(document: &Document, selector: &str) -> Result<Element, MountError> {
    document
        .query_selector(selector)
        .map_err(dom_error)?
        .ok_or_else(|| MountError::MissingElement {
            selector: selector.to_string(),
        })
}

fn query_in(parent: &Element, selector: &str) -> Result<Element, MountError> {
    parent
        .query_selector(selector)
        .map_err(dom_error)?
        .ok_or_else(|| MountError::MissingElement {
            selector: selector.to_string(),
        })
}

fn dom_error(e: JsValue) -> MountError {
    MountError::Dom(format!("{:?}", e))
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::warn!("Failed to set {} on #{}: {:?}", property, element.id(), e);
    }
}

fn set_class(element: &Element, class: &str, present: bool) {
    let classes = element.class_list();
    let result = if present {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    if let Err(e) = result {
        log::warn!("Failed to toggle class '{}': {:?}", class, e);
    }
}

fn set_attribute(element: &Element, name: &str, value: &str) {
    if let Err(e) = element.set_attribute(name, value) {
        log::warn!("Failed to set attribute '{}': {:?}", name, e);
    }
}

fn selected_files(files: Option<FileList>) -> Vec<SelectedFile<File>> {
    let Some(files) = files else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(|file| SelectedFile::new(file.name(), file.type_(), file.size() as u64, file))
        .collect()
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_default()
}

fn transport_error(e: gloo::net::Error) -> SnapError {
    SnapError::Transport(e.to_string())
}

fn js_transport_error(e: JsValue) -> SnapError {
    SnapError::Transport(
        e.as_string()
            .unwrap_or_else(|| format!("{:?}", e)),
    )
}

// ============================================================================
// Widget
// ============================================================================

/// The mounted widget.
pub struct SnapWidget {
    controller: RefCell<Controller<File>>,
    elements: Elements,
    request_options: RequestOptions,
    listeners: RefCell<Vec<EventListener>>,
    /// Change listener of the most recent file picker
    picker_listener: RefCell<Option<EventListener>>,
    /// Pending animation frame, cancelled on drop
    frame: RefCell<Option<AnimationFrame>>,
}

/// Bind the widget to the page. Call only after the gate passed.
pub fn mount(config: &WidgetConfig) -> Result<(), MountError> {
    let window = web_sys::window().ok_or(MountError::NoGlobal("window"))?;
    let document = window.document().ok_or(MountError::NoGlobal("document"))?;
    let hostname = window.location().hostname().unwrap_or_default();

    let endpoints = config.endpoints(&hostname);
    log::info!(
        "Storage service at '{}'",
        if endpoints.base_url().is_empty() {
            "same origin"
        } else {
            endpoints.base_url()
        }
    );

    let widget = Rc::new(SnapWidget {
        controller: RefCell::new(Controller::new(endpoints, config.timeline()?)),
        elements: Elements::find(&document)?,
        request_options: config.request_options(),
        listeners: RefCell::new(Vec::new()),
        picker_listener: RefCell::new(None),
        frame: RefCell::new(None),
    });
    widget.install_listeners();

    WIDGET.with(|slot| *slot.borrow_mut() = Some(widget));
    log::info!("Snap widget mounted");
    Ok(())
}

impl SnapWidget {
    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();
        let container = &self.elements.upload_container;

        // The browser would open a dropped file in the tab unless every drag
        // event on the target is cancelled.
        for phase in DragPhase::ALL {
            let widget = Rc::clone(self);
            listeners.push(EventListener::new_with_options(
                container,
                phase.event_type(),
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| {
                    event.prevent_default();
                    event.stop_propagation();
                    widget.on_drag(phase, event);
                },
            ));
        }

        let widget = Rc::clone(self);
        listeners.push(EventListener::new(container, "click", move |_event| {
            widget.open_picker();
        }));

        let widget = Rc::clone(self);
        listeners.push(EventListener::new(
            &self.elements.delete_button,
            "click",
            move |event| {
                // The button may sit inside the drop target; keep the picker closed.
                event.stop_propagation();
                let effects = widget
                    .controller
                    .borrow_mut()
                    .on_delete_clicked(now_ms(), js_sys::Math::random());
                widget.run(effects);
            },
        ));

        *self.listeners.borrow_mut() = listeners;
    }

    fn on_drag(self: &Rc<Self>, phase: DragPhase, event: &Event) {
        let effects = self.controller.borrow().on_drag(phase);
        self.run(effects);

        if phase != DragPhase::Drop {
            return;
        }
        let files = event
            .dyn_ref::<DragEvent>()
            .and_then(|event| event.data_transfer())
            .and_then(|transfer| transfer.files());
        self.select(SelectionSource::Drop, selected_files(files));
    }

    /// Open a transient file input, like clicking a hidden `<input type=file>`.
    fn open_picker(self: &Rc<Self>) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let input = match document
            .create_element("input")
            .map(|element| element.dyn_into::<HtmlInputElement>())
        {
            Ok(Ok(input)) => input,
            _ => {
                log::error!("Failed to create file input");
                return;
            }
        };
        input.set_type("file");
        input.set_accept(PICKER_ACCEPT);

        let widget = Rc::clone(self);
        let listener = EventListener::new(&input, "change", move |event: &Event| {
            let files = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                .and_then(|input| input.files());
            widget.select(SelectionSource::Picker, selected_files(files));
        });
        // Replacing drops the previous picker's listener.
        *self.picker_listener.borrow_mut() = Some(listener);

        input.click();
    }

    fn select(self: &Rc<Self>, source: SelectionSource, files: Vec<SelectedFile<File>>) {
        let effects = self.controller.borrow_mut().on_files(source, files);
        self.run(effects);
    }

    fn schedule_frame(self: &Rc<Self>) {
        let widget = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| {
            widget.frame.borrow_mut().take();
            let effects = widget.controller.borrow_mut().on_animation_frame(timestamp);
            widget.run(effects);
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    // ------------------------------------------------------------------------
    // Effects
    // ------------------------------------------------------------------------

    fn run(self: &Rc<Self>, effects: Vec<Effect<File>>) {
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(self: &Rc<Self>, effect: Effect<File>) {
        let el = &self.elements;
        match effect {
            Effect::SetStatus(status) => self.show_status(&status),
            Effect::Highlight(on) => set_class(el.upload_container.as_ref(), dom::DRAG_OVER_CLASS, on),
            Effect::SendUpload { url, file } => self.spawn_upload(url, file),
            Effect::ShowImage { src } => {
                el.image.set_src(&src);
                set_style(el.image.as_ref(), "display", "block");
            }
            Effect::HideImage => set_style(el.image.as_ref(), "display", "none"),
            Effect::ShowDeleteButton => set_class(el.delete_button.as_ref(), dom::HIDDEN_CLASS, false),
            Effect::HideDeleteButton => set_class(el.delete_button.as_ref(), dom::HIDDEN_CLASS, true),
            Effect::SetNoiseSeed(seed) => set_attribute(&el.noise, "seed", &seed.to_string()),
            Effect::ApplyVisuals(params) => self.apply_visuals(params),
            Effect::RequestFrame => self.schedule_frame(),
            Effect::SendDelete { url, filename } => self.spawn_delete(url, filename),
        }
    }

    fn show_status(&self, status: &Status) {
        let element = &self.elements.status;
        element.set_text_content(Some(&status.text));
        element.set_class_name(status.kind.class_name());
    }

    fn apply_visuals(&self, params: VisualParams) {
        let image: &HtmlElement = self.elements.image.as_ref();
        set_attribute(
            &self.elements.displacement_map,
            "scale",
            &params.displacement_attr(),
        );
        set_style(image, "transform", &params.transform_css());
        set_style(image, "opacity", &params.opacity_css());
    }

    // ------------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------------

    fn with_options(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = self
            .request_options
            .headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        if self.request_options.include_credentials {
            builder.credentials(RequestCredentials::Include)
        } else {
            builder
        }
    }

    fn spawn_upload(self: &Rc<Self>, url: String, file: File) {
        let widget = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let started = Instant::now();
            let result = widget.send_upload(&url, &file).await;
            log::debug!("POST {} settled after {:?}", url, started.elapsed());
            let effects = widget.controller.borrow_mut().on_upload_finished(result);
            widget.run(effects);
        });
    }

    async fn send_upload(&self, url: &str, file: &File) -> Result<UploadedImage, SnapError> {
        let form = FormData::new().map_err(js_transport_error)?;
        form.append_with_blob(endpoints::UPLOAD_FIELD, file)
            .map_err(js_transport_error)?;

        let response = self
            .with_options(Request::post(url))
            .body(form)
            .map_err(transport_error)?
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        let endpoints = self.controller.borrow().endpoints().clone();
        api::interpret_upload(&endpoints, status, &body)
    }

    fn spawn_delete(self: &Rc<Self>, url: String, filename: String) {
        let widget = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let started = Instant::now();
            let result = widget.send_delete(&url).await;
            log::debug!(
                "DELETE of '{}' settled after {:?}",
                filename,
                started.elapsed()
            );
            let effects = widget.controller.borrow_mut().on_delete_finished(result);
            widget.run(effects);
        });
    }

    async fn send_delete(&self, url: &str) -> Result<(), SnapError> {
        let response = self
            .with_options(Request::delete(url))
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        api::interpret_delete(status, &body)
    }
}
