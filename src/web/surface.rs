use std::collections::HashMap;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlElement};

use crate::danmaku::{ItemId, ItemLayout, ItemSpec, OverlaySurface};

type Listener = Closure<dyn FnMut(Event)>;

struct DomItem {
    el: HtmlElement,
    // Dropped together with the element so per-item closures are not leaked.
    _listeners: Vec<Listener>,
}

/// Overlay surface backed by `#danmakuContainer`. Items are
/// `<div class="danmaku-item">` children whose horizontal motion is a CSS
/// animation; the engine only sets its duration, delay and top offset.
pub struct DomSurface {
    document: Document,
    container: HtmlElement,
    items: HashMap<ItemId, DomItem>,
    cta_target: String,
}

impl DomSurface {
    pub fn new(document: Document, container: HtmlElement, cta_target: &str) -> Self {
        Self { document, container, items: HashMap::new(), cta_target: cta_target.to_string() }
    }

    fn create(&self, id: ItemId, spec: &ItemSpec<'_>) -> Result<DomItem, JsValue> {
        let el: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        let mut class = String::from("danmaku-item");
        if spec.user {
            class.push_str(" danmaku-user");
        }
        if spec.clickable {
            class.push_str(" danmaku-cta");
        }
        el.set_class_name(&class);
        el.set_text_content(Some(spec.text));
        el.style().set_property("visibility", "hidden")?;

        let mut listeners = Vec::new();
        if spec.clickable {
            el.style().set_property("cursor", "pointer")?;
            let target = self.cta_target.clone();
            let on_click = Closure::wrap(Box::new(move |_evt: Event| {
                open_target(&target);
            }) as Box<dyn FnMut(Event)>);
            el.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            listeners.push(on_click);
        }

        let on_end = Closure::wrap(Box::new(move |_evt: Event| {
            super::travel_complete(id);
        }) as Box<dyn FnMut(Event)>);
        el.add_event_listener_with_callback("animationend", on_end.as_ref().unchecked_ref())?;
        listeners.push(on_end);

        self.container.append_child(&el)?;
        Ok(DomItem { el, _listeners: listeners })
    }
}

fn open_target(id: &str) {
    let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        warn!(id, "call-to-action target not found");
        return;
    };
    let _ = el.style().set_property("display", "flex");
}

impl OverlaySurface for DomSurface {
    fn viewport_width(&self) -> f64 {
        match self.container.client_width() {
            w if w > 0 => w as f64,
            _ => window_dimension(|w| w.inner_width()),
        }
    }

    fn viewport_height(&self) -> f64 {
        match self.container.client_height() {
            h if h > 0 => h as f64,
            _ => window_dimension(|w| w.inner_height()),
        }
    }

    fn insert(&mut self, id: ItemId, spec: &ItemSpec<'_>) {
        match self.create(id, spec) {
            Ok(item) => {
                self.items.insert(id, item);
            }
            Err(err) => warn!(?err, "failed to insert danmaku item"),
        }
    }

    fn measure_width(&self, id: ItemId) -> Option<f64> {
        let w = self.items.get(&id)?.el.offset_width();
        (w > 0).then_some(w as f64)
    }

    fn layout(&mut self, id: ItemId, layout: &ItemLayout) {
        let Some(item) = self.items.get(&id) else { return };
        let style = item.el.style();
        let _ = style.set_property("top", &format!("{}px", layout.top_px));
        let _ = style.set_property("animation-duration", &format!("{}s", layout.travel_duration_s));
        let _ = style.set_property("animation-delay", &format!("{}s", layout.enter_delay_s));
    }

    fn reveal(&mut self, id: ItemId) {
        if let Some(item) = self.items.get(&id) {
            let _ = item.el.style().set_property("visibility", "visible");
        }
    }

    fn remove(&mut self, id: ItemId) {
        if let Some(item) = self.items.remove(&id) {
            item.el.remove();
        }
    }

    fn clear(&mut self) {
        self.container.set_inner_html("");
        self.items.clear();
    }
}

fn window_dimension(read: impl Fn(&web_sys::Window) -> Result<JsValue, JsValue>) -> f64 {
    web_sys::window()
        .and_then(|w| read(&w).ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}
