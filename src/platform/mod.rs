//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger setup (env_logger natively, browser console on the web)
//! - The wasm-bindgen surface driven by the browser game loop

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Install the logger for the current target; safe to call more than once
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Install the logger for the current target; safe to call more than once
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
