//! wasm-bindgen bindings for `vizij-scroll-core`.
//!
//! Exposes `ScrollController` and `ScrollScene` to JS, backed by the real
//! document through [`WebDom`].

use wasm_bindgen::prelude::*;

mod controller;
mod convert;
mod dom;
mod outbox;
mod scene;
mod scrollbar;
mod timeline;

pub use controller::ScrollController;
pub use dom::WebDom;
pub use scene::ScrollScene;
pub use scrollbar::JsScrollbar;
pub use timeline::JsTimeline;

/// Panic messages and `log` output go to the browser console. Safe to
/// call repeatedly.
pub(crate) fn install_hooks() {
    console_error_panic_hook::set_once();
    // Err only means a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
