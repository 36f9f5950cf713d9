//! Browser binding
//!
//! The page owns the canvas, pointer events and drawing; it forwards
//! timestamps and input here and paints the JSON snapshot `frame` returns.

use wasm_bindgen::prelude::*;

use crate::session::Session;
use crate::settings::{QualityPreset, Settings};
use crate::sim::Viewport;
use crate::sim::snapshot::Snapshot;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Skyburst starting...");
}

/// One game session driven from JavaScript
#[wasm_bindgen]
pub struct WebSession {
    inner: Session,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, quality: &str) -> WebSession {
        let seed = js_sys::Date::now() as u64;
        let settings = QualityPreset::from_str(quality)
            .map(Settings::from_preset)
            .unwrap_or_default();
        // A finished crash reloads the page: a full restart, not a soft reset
        let restart = Box::new(|| {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().reload() {
                    log::error!("Reload failed: {:?}", e);
                }
            }
        });
        log::info!("Game initialized with seed: {}", seed);
        WebSession {
            inner: Session::new(Viewport::new(width, height), seed, settings, restart),
        }
    }

    pub fn start(&mut self, now: f64) {
        self.inner.start(now);
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.inner.on_pointer_move(x, y);
    }

    pub fn activate(&mut self, x: f32, y: f32) {
        self.inner.on_activate(x, y);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner.resize(Viewport::new(width, height));
    }

    /// Advance to `now` (ms) and return the frame as JSON, if one was produced
    pub fn frame(&mut self, now: f64) -> Option<String> {
        let mut json = None;
        let mut sink = |snapshot: &Snapshot| match serde_json::to_string(snapshot) {
            Ok(s) => json = Some(s),
            Err(e) => log::warn!("Snapshot encoding failed: {}", e),
        };
        self.inner.frame(now, &mut sink);
        json
    }
}
