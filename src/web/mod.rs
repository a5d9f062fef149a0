//! Browser bindings for the danmaku engine.
//!
//! The engine instance lives in a thread-local cell and is only touched from
//! the animation-frame callback and DOM event handlers, which never run
//! concurrently on the page's single thread.

mod console;
mod storage;
mod surface;

pub use console::{ConsoleWriter, MakeConsoleWriter};
pub use storage::LocalStorageStore;
pub use surface::DomSurface;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::danmaku::{Danmaku, DanmakuConfig, ItemId};

pub const CONTAINER_ID: &str = "danmakuContainer";
pub const TOGGLE_ID: &str = "danmakuToggle";
pub const INPUT_ID: &str = "danmakuInput";

#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid danmaku config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("page has no window/document")]
    NoDocument,
    #[error("required element #{0} not found")]
    MissingElement(&'static str),
    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for StartError {
    fn from(value: JsValue) -> Self {
        StartError::Js(format!("{value:?}"))
    }
}

impl From<StartError> for JsValue {
    fn from(err: StartError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

thread_local! {
    static DANMAKU: RefCell<Option<Danmaku<DomSurface>>> = const { RefCell::new(None) };
    // `animationend` fires from inside an item's own listener, which must not
    // drop itself; completions are applied on the next frame instead.
    static FINISHED: RefCell<Vec<ItemId>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` against the live engine. Returns `None` before start, or when the
/// engine is already borrowed further up the stack.
fn with_engine<R>(f: impl FnOnce(&mut Danmaku<DomSurface>) -> R) -> Option<R> {
    DANMAKU.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub(crate) fn start(config: Option<&str>) -> Result<(), StartError> {
    let cfg = match config {
        Some(raw) if !raw.trim().is_empty() => DanmakuConfig::from_json(raw)?,
        _ => DanmakuConfig::default(),
    };
    console::init(&cfg.log_level);

    let doc = window().and_then(|w| w.document()).ok_or(StartError::NoDocument)?;
    let container: HtmlElement = element(&doc, CONTAINER_ID)?
        .dyn_into()
        .map_err(|_| StartError::MissingElement(CONTAINER_ID))?;

    let surface = DomSurface::new(doc.clone(), container, &cfg.call_to_action_target);
    let mut engine = Danmaku::with_site_slogans(surface, Box::new(LocalStorageStore::open()), cfg);
    let now = now_ms();
    engine.prepare_initial(now);
    engine.advance(now);
    DANMAKU.with(|cell| cell.replace(Some(engine)));

    wire_toggle(&doc)?;
    wire_input(&doc)?;
    wire_resize()?;
    start_frame_loop();
    info!("danmaku started");
    Ok(())
}

fn element(doc: &Document, id: &'static str) -> Result<Element, StartError> {
    doc.get_element_by_id(id).ok_or(StartError::MissingElement(id))
}

pub(crate) fn toggle() -> bool {
    let enabled = with_engine(|e| e.toggle()).unwrap_or(false);
    if let Some(doc) = window().and_then(|w| w.document()) {
        sync_controls(&doc, enabled);
    }
    enabled
}

pub(crate) fn submit(text: &str) -> bool {
    let now = now_ms();
    with_engine(|e| e.submit(text, now)).flatten().is_some()
}

pub(crate) fn resize() {
    with_engine(|e| e.resize());
}

pub(crate) fn travel_complete(id: ItemId) {
    FINISHED.with(|f| f.borrow_mut().push(id));
}

fn frame(ts: f64) {
    let finished = FINISHED.with(|f| std::mem::take(&mut *f.borrow_mut()));
    with_engine(|e| {
        for id in finished {
            e.travel_complete(id);
        }
        e.advance(ts);
    });
}

/// Reflect the on/off state in the toggle label and input visibility.
fn sync_controls(doc: &Document, enabled: bool) {
    if let Some(toggle) = doc.get_element_by_id(TOGGLE_ID) {
        if let Ok(Some(label)) = toggle.query_selector(".toggle-btn") {
            label.set_text_content(Some(if enabled { "弹幕 ON" } else { "弹幕 OFF" }));
        }
    }
    if let Some(input) = doc
        .get_element_by_id(INPUT_ID)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    {
        let _ = input.style().set_property("display", if enabled { "block" } else { "none" });
    }
}

fn wire_toggle(doc: &Document) -> Result<(), StartError> {
    let toggle_el = element(doc, TOGGLE_ID)?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        toggle();
    }) as Box<dyn FnMut(_)>);
    toggle_el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    sync_controls(doc, true);
    Ok(())
}

fn wire_input(doc: &Document) -> Result<(), StartError> {
    let field: HtmlInputElement = element(doc, INPUT_ID)?
        .query_selector("input")?
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        .ok_or(StartError::MissingElement(INPUT_ID))?;
    let field_cb = field.clone();
    let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        if evt.key() != "Enter" {
            return;
        }
        let value = field_cb.value();
        if value.trim().is_empty() {
            return;
        }
        if !submit(&value) {
            warn!("submission not shown");
        }
        field_cb.set_value("");
    }) as Box<dyn FnMut(_)>);
    field.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn wire_resize() -> Result<(), StartError> {
    let win = window().ok_or(StartError::NoDocument)?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        resize();
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        frame(ts);
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
