//! Core WASM model wrapper and low-level utilities.

use lake_core::analysis::{analyze_equilibria, EquilibriumReport};
use lake_core::config::IntervalSpec;
use lake_core::model::{rate_derivative, rate_slice, LakeParameters};
use lake_core::scan::ScanSettings;
use lake_core::stability::classify_stability;
use serde_wasm_bindgen::to_value;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

pub(crate) fn js_error(context: &str, err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {err}"))
}

#[wasm_bindgen]
pub struct WasmLakeModel {
    pub(crate) params: LakeParameters,
}

#[wasm_bindgen]
impl WasmLakeModel {
    #[wasm_bindgen(constructor)]
    pub fn new(
        loading: f64,
        recycling: f64,
        sedimentation: f64,
        half_saturation: f64,
        hill_exponent: f64,
    ) -> Result<WasmLakeModel, JsValue> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        let params = LakeParameters::new(
            loading,
            recycling,
            sedimentation,
            half_saturation,
            hill_exponent,
        );
        params
            .validate()
            .map_err(|e| js_error("Invalid lake parameters", e))?;
        Ok(WasmLakeModel { params })
    }

    pub fn get_loading(&self) -> f64 {
        self.params.loading
    }

    pub fn set_loading(&mut self, loading: f64) -> Result<(), JsValue> {
        let params = self.params.with_loading(loading);
        params
            .validate()
            .map_err(|e| js_error("Invalid loading", e))?;
        self.params = params;
        Ok(())
    }

    /// Elementwise dP/dt, for plotting the rate curve.
    pub fn evaluate_rate(&self, states: Vec<f64>) -> Vec<f64> {
        rate_slice(&states, &self.params)
    }

    pub fn evaluate_derivative(&self, state: f64) -> f64 {
        rate_derivative(state, &self.params)
    }

    pub fn find_fixed_points(
        &self,
        state_min: f64,
        state_max: f64,
        samples: u32,
    ) -> Result<JsValue, JsValue> {
        let report = self
            .equilibria(IntervalSpec::new(state_min, state_max, samples as usize))
            .map_err(|e| js_error("Fixed point scan failed", e))?;
        to_value(&report).map_err(|e| js_error("Serialization error", e))
    }

    /// "Stable" or "Unstable".
    pub fn classify_stability(&self, root: f64) -> Result<String, JsValue> {
        classify_stability(root, &self.params)
            .map(|stability| format!("{stability:?}"))
            .map_err(|e| js_error("Stability classification failed", e))
    }
}

impl WasmLakeModel {
    pub(crate) fn equilibria(&self, interval: IntervalSpec) -> lake_core::Result<EquilibriumReport> {
        let interval = interval.scan_interval()?;
        analyze_equilibria(&self.params, &interval, &ScanSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lake_core::regime::TrophicRegime;

    #[test]
    fn wasm_model_evaluates_rate_elementwise() {
        let model = WasmLakeModel::new(0.45, 1.0, 0.7, 1.0, 8.0).expect("model");
        let rates = model.evaluate_rate(vec![0.0, 1.0]);
        assert_eq!(rates.len(), 2);
        assert!((rates[0] - 0.45).abs() < 1e-12);
        assert!((rates[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn wasm_model_derivative_ignores_loading() {
        let mut model = WasmLakeModel::new(0.45, 1.0, 0.7, 1.0, 8.0).expect("model");
        let before = model.evaluate_derivative(0.9);
        model.set_loading(1.2).expect("loading");
        assert_eq!(model.get_loading(), 1.2);
        assert_eq!(model.evaluate_derivative(0.9), before);
    }

    #[test]
    fn wasm_model_reports_bistable_equilibria() {
        let model = WasmLakeModel::new(0.3, 1.0, 0.7, 1.0, 8.0).expect("model");
        let report = model
            .equilibria(IntervalSpec::new(0.0, 4.0, 1000))
            .expect("equilibria");
        assert_eq!(report.fixed_points.len(), 3);
        assert_eq!(
            report.fixed_points[0].regime,
            Some(TrophicRegime::Oligotrophic)
        );
        assert_eq!(report.fixed_points[2].regime, Some(TrophicRegime::Eutrophic));
    }

    #[test]
    fn wasm_model_classifies_stability_by_name() {
        let model = WasmLakeModel::new(0.45, 1.0, 0.7, 1.0, 8.0).expect("model");
        let report = model
            .equilibria(IntervalSpec::new(0.0, 4.0, 1000))
            .expect("equilibria");
        let root = report.fixed_points[0].point.state;
        assert_eq!(model.classify_stability(root).expect("label"), "Stable");
    }

    #[test]
    fn equilibria_rejects_inverted_interval() {
        let model = WasmLakeModel::new(0.45, 1.0, 0.7, 1.0, 8.0).expect("model");
        assert!(model.equilibria(IntervalSpec::new(4.0, 0.0, 1000)).is_err());
    }

}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmLakeModel;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn wasm_model_rejects_zero_half_saturation() {
        let result = WasmLakeModel::new(0.45, 1.0, 0.7, 0.0, 8.0);
        assert!(result.is_err(), "expected invalid parameter error");
    }

    #[wasm_bindgen_test]
    fn wasm_model_find_fixed_points_serializes() {
        let model = WasmLakeModel::new(0.3, 1.0, 0.7, 1.0, 8.0).expect("model");
        assert!(model.find_fixed_points(0.0, 4.0, 1000).is_ok());
        assert!(model.find_fixed_points(0.0, 4.0, 0).is_err());
    }
}
