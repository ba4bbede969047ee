#![forbid(unsafe_code)]

//! `wasm-bindgen` surface over [`PageRunner`].
//!
//! Element ids are plain `u32`s chosen by the host. Patches cross the
//! boundary as a JSON array of `{"op": ..., "element": ...}` objects.

use folio_core::AppConfig;
use folio_core::element::ElementId;
use folio_core::geometry::Rect;
use folio_reveal::RevealEffect;
use wasm_bindgen::prelude::*;

use crate::error::InputError;
use crate::runner_core::{PageRunner, StepResult, duration_from_ms};

fn to_js(err: InputError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn step_to_js(result: StepResult) -> JsValue {
    let obj = js_sys::Object::new();
    let set = |key: &str, value: JsValue| {
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str(key), &value);
    };
    set("running", JsValue::from_bool(result.running));
    set("timersFired", JsValue::from_f64(result.timers_fired as f64));
    set(
        "visibilityEvents",
        JsValue::from_f64(result.visibility_events as f64),
    );
    set("cursorMoved", JsValue::from_bool(result.cursor_moved));
    set(
        "pendingPatches",
        JsValue::from_f64(result.pending_patches as f64),
    );
    set("frameIdx", JsValue::from_f64(result.frame_idx as f64));
    obj.into()
}

/// Page runner exported to JavaScript.
#[wasm_bindgen]
pub struct PortfolioRunner {
    core: PageRunner,
}

#[wasm_bindgen]
impl PortfolioRunner {
    /// Create a runner; `config_json` may be omitted for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PortfolioRunner, JsValue> {
        let core = match config_json {
            Some(json) => PageRunner::from_config_json(&json),
            None => PageRunner::new(AppConfig::default()),
        }
        .map_err(to_js)?;
        Ok(Self { core })
    }

    /// CSS for the hidden state and every reveal effect.
    pub fn stylesheet() -> String {
        folio_reveal::effect::stylesheet()
    }

    /// Selector for elements whose hover should call `pointerHover(true)`.
    #[wasm_bindgen(js_name = interactiveSelector)]
    pub fn interactive_selector() -> String {
        folio_cursor::INTERACTIVE_SELECTOR.to_string()
    }

    #[wasm_bindgen(js_name = mountDocument)]
    pub fn mount_document(&mut self, root: u32) {
        self.core.mount_document(ElementId(root));
    }

    /// `effect` is `"fade-in-up"` (default) or `"fade-in-left"`.
    #[wasm_bindgen(js_name = mountReveal)]
    pub fn mount_reveal(
        &mut self,
        element: u32,
        effect: Option<String>,
        delay_ms: Option<f64>,
    ) -> Result<(), JsValue> {
        let mut options = self.core.reveal_options();
        if let Some(name) = effect {
            let effect = name
                .parse::<RevealEffect>()
                .map_err(|e| to_js(InputError::UnknownEffect(e.0)))?;
            options = options.effect(effect);
        }
        if let Some(ms) = delay_ms {
            options = options.delay(duration_from_ms(ms));
        }
        self.core.mount_reveal(ElementId(element), options);
        Ok(())
    }

    #[wasm_bindgen(js_name = mountRotator)]
    pub fn mount_rotator(&mut self, element: u32) -> Result<(), JsValue> {
        self.core.mount_rotator(ElementId(element)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = mountCursor)]
    pub fn mount_cursor(&mut self, ring: u32, dot: u32) {
        self.core.mount_cursor(ElementId(ring), ElementId(dot));
    }

    #[wasm_bindgen(js_name = mountImageFade)]
    pub fn mount_image_fade(&mut self, element: u32) {
        self.core.mount_image_fade(ElementId(element));
    }

    pub fn unmount(&mut self, element: u32) -> bool {
        self.core.unmount(ElementId(element))
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.core.resize(width, height);
    }

    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.core.scroll_to(x, y);
    }

    #[wasm_bindgen(js_name = setElementRect)]
    pub fn set_element_rect(&mut self, element: u32, x: f64, y: f64, width: f64, height: f64) {
        self.core
            .set_element_rect(ElementId(element), Rect::new(x, y, width, height));
    }

    #[wasm_bindgen(js_name = removeElementRect)]
    pub fn remove_element_rect(&mut self, element: u32) {
        self.core.remove_element_rect(ElementId(element));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.core.pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self) {
        self.core.pointer_down();
    }

    #[wasm_bindgen(js_name = pointerHover)]
    pub fn pointer_hover(&mut self, hovering: bool) {
        self.core.pointer_hover(hovering);
    }

    /// Decode and apply one JSON input. Returns `false` if it was rejected.
    #[wasm_bindgen(js_name = pushEncodedInput)]
    pub fn push_encoded_input(&mut self, json: &str) -> bool {
        self.core.push_encoded_input(json).is_ok()
    }

    /// Advance by `dt_ms` and return the step counters.
    pub fn step(&mut self, dt_ms: f64) -> JsValue {
        step_to_js(self.core.advance_time_ms(dt_ms))
    }

    /// Drain pending patches as a JSON array.
    #[wasm_bindgen(js_name = takePatches)]
    pub fn take_patches(&mut self) -> String {
        self.core.take_patches_json()
    }

    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    pub fn dispose(&mut self) {
        self.core.dispose();
    }
}
