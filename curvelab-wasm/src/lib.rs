//! WASM <-> JavaScript bridge so the browser can interpret exams without the backend.

use curvelab_core::{InterpretationConfig, LabError, ProfileOverrides, ReferenceProfile};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Engine configuration for a page-supplied profile, defaults everywhere else.
fn config_with_profile(profile: Option<ProfileOverrides>) -> InterpretationConfig {
    let mut config = InterpretationConfig::default();
    if let Some(overrides) = profile {
        config.references = ReferenceProfile::from(overrides);
    }
    config
}

fn read_profile(profile: Option<JsValue>) -> Result<Option<ProfileOverrides>, JsValue> {
    match profile {
        Some(js_profile) if !js_profile.is_undefined() && !js_profile.is_null() => {
            from_value(js_profile)
                .map(Some)
                .map_err(|err| JsValue::from_str(&format!("Could not read profile: {err}")))
        }
        _ => Ok(None),
    }
}

#[wasm_bindgen]
pub fn interpret_curve(payload: JsValue, profile: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload_value = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Could not read curve payload: {err}")))?;
    let cfg = config_with_profile(read_profile(profile)?);

    let interpretation = curvelab_interpret::interpret_curve_value(&payload_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_lab_error(err)))?;

    to_value(&interpretation)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize interpretation: {err}")))
}

#[wasm_bindgen]
pub fn interpret_antibiogram(payload: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload_value = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Could not read antibiogram payload: {err}")))?;

    let cfg = InterpretationConfig::default();
    let interpretation = curvelab_interpret::interpret_antibiogram_value(&payload_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_lab_error(err)))?;

    to_value(&interpretation)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize interpretation: {err}")))
}

/// The built-in reference profile, for pre-filling range editors.
#[wasm_bindgen]
pub fn default_profile() -> Result<JsValue, JsValue> {
    to_value(&ReferenceProfile::default())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize profile: {err}")))
}

fn format_lab_error(err: LabError) -> String {
    format!("Interpretation error: {err}")
}
