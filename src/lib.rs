//! NODE404 danmaku overlay crate.
//!
//! The headless engine lives in [`danmaku`] and is plain Rust, testable on the
//! host. The [`web`] module binds it to the page: a DOM-backed surface,
//! `localStorage` persistence, and a requestAnimationFrame driver. JS only
//! calls `start_danmaku()` once and optionally the small control exports below.

use wasm_bindgen::prelude::*;

pub mod danmaku;
pub mod web;

use danmaku::SloganSets;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Slogan datasets
// Core slogans are rotated in order; the filler pool (which repeats the core
// set) is sampled at random alongside cached user messages.
// -----------------------------------------------------------------------------

pub const CORE_SLOGANS: &[&str] = &[
    "404 NOT FOUND → GENESIS",
    "Reality is our off-chain testnet",
    "Not found. Not yet.",
    "代码即对话",
    "让疯狂想法重新上线",
    "边建设，边定义",
    "思想碰撞 > 闭门造车",
    "量子对话启动",
    "去中心化实验",
    "AI + Web3 + 现实",
];

pub const FILLER_SLOGANS: &[&str] = &[
    "404 NOT FOUND → GENESIS",
    "Reality is our off-chain testnet",
    "Not found. Not yet.",
    "代码即对话",
    "让疯狂想法重新上线",
    "边建设，边定义",
    "思想碰撞 > 闭门造车",
    "量子对话启动",
    "去中心化实验",
    "AI + Web3 + 现实",
    "极客精神：动手解决问题",
    "Build > Talk",
    "Open Source Collective",
    "Web3 + AI + IRL",
    "Hack the future",
    "Demo or it didn't happen",
    "Trust, but verify",
    "Experiment on",
    "Find the unfound",
];

/// Clickable items that open the donation dialog.
pub const CALL_TO_ACTION_SLOGANS: &[&str] = &[
    "☕ 请我们喝杯咖啡 → 支持 NODE404",
    "Fuel the experiment → donate",
    "Keep the node online → sponsor",
];

pub const SITE_SLOGANS: SloganSets = SloganSets {
    core: CORE_SLOGANS,
    filler: FILLER_SLOGANS,
    call_to_action: CALL_TO_ACTION_SLOGANS,
};

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Boot the overlay. `config` is an optional JSON object overriding any
/// field of [`danmaku::DanmakuConfig`].
#[wasm_bindgen]
pub fn start_danmaku(config: Option<String>) -> Result<(), JsValue> {
    web::start(config.as_deref()).map_err(JsValue::from)
}

/// Flip the overlay on/off; returns the new state.
#[wasm_bindgen]
pub fn danmaku_toggle() -> bool {
    web::toggle()
}

/// Show `text` immediately and remember it. Returns false for blank input
/// or before `start_danmaku()`.
#[wasm_bindgen]
pub fn danmaku_submit(text: &str) -> bool {
    web::submit(text)
}

#[wasm_bindgen]
pub fn danmaku_resize() {
    web::resize();
}
