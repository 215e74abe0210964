//! One-shot analysis entry points.

use crate::system::js_error;
use lake_core::config::AnalysisConfig;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Runs the equilibrium report and the loading sweep for a (possibly partial)
/// `AnalysisConfig` object.
#[wasm_bindgen]
pub fn analyze(config_val: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let config: AnalysisConfig =
        from_value(config_val).map_err(|e| js_error("Invalid analysis config", e))?;
    let analysis = lake_core::analyze(&config).map_err(|e| js_error("Analysis failed", e))?;
    to_value(&analysis).map_err(|e| js_error("Serialization error", e))
}

/// The reference configuration, as a starting point for front-end forms.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_value(&AnalysisConfig::default()).map_err(|e| js_error("Serialization error", e))
}
