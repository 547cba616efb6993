//! # optool
//!
//! Leptos + WASM frontend for the operations tool.
//!
//! The crate's core is the client session lifecycle: a persisted bearer
//! credential, the profile it resolves to, a one-time restore on first
//! navigation, a navigation guard applying per-route access flags, and an
//! authenticated API channel that forces logout when the backend rejects the
//! credential. Pages are thin views over those pieces.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod router;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Browser entry point: install logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
