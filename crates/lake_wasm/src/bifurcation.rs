//! Stepped bifurcation sweep runner.

use crate::system::js_error;
use js_sys::Float64Array;
use lake_core::bifurcation::BifurcationSweeper;
use lake_core::config::AnalysisConfig;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn build_sweeper(config: &AnalysisConfig) -> lake_core::Result<BifurcationSweeper> {
    BifurcationSweeper::new(
        config.parameters,
        config.sweep.loading_sweep()?,
        config.interval.scan_interval()?,
        config.settings,
    )
}

/// WASM-exported runner for the loading sweep.
/// Runs a batch of loadings per call so the front end can report progress
/// and abandon the sweep between batches.
#[wasm_bindgen]
pub struct WasmBifurcationRunner {
    runner: Option<BifurcationSweeper>,
}

#[wasm_bindgen]
impl WasmBifurcationRunner {
    /// `config_val` is a (possibly partial) `AnalysisConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_val: JsValue) -> Result<WasmBifurcationRunner, JsValue> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        let config: AnalysisConfig =
            from_value(config_val).map_err(|e| js_error("Invalid analysis config", e))?;
        let runner =
            build_sweeper(&config).map_err(|e| js_error("Bifurcation sweep init failed", e))?;

        Ok(WasmBifurcationRunner {
            runner: Some(runner),
        })
    }

    pub fn is_done(&self) -> bool {
        self.runner.as_ref().map_or(true, |runner| runner.is_done())
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let runner = self
            .runner
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        let progress = runner.run_steps(batch_size as usize);
        to_value(&progress).map_err(|e| js_error("Serialization error", e))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&runner.progress()).map_err(|e| js_error("Serialization error", e))
    }

    /// Loading column of the point cloud computed so far.
    pub fn point_loadings(&self) -> Result<Float64Array, JsValue> {
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        Ok(Float64Array::from(
            runner.diagram().point_loadings().as_slice(),
        ))
    }

    /// State column of the point cloud computed so far.
    pub fn point_states(&self) -> Result<Float64Array, JsValue> {
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        Ok(Float64Array::from(runner.diagram().point_states().as_slice()))
    }

    /// Consumes the runner and returns the diagram, complete or not.
    pub fn get_result(&mut self) -> Result<JsValue, JsValue> {
        let runner = self
            .runner
            .take()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&runner.into_diagram()).map_err(|e| js_error("Serialization error", e))
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmBifurcationRunner;
    use lake_core::config::AnalysisConfig;
    use serde_wasm_bindgen::to_value;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn runner_round_trips_through_js() {
        let rejected = WasmBifurcationRunner::new(JsValue::from_str("not a config"));
        assert!(rejected.is_err(), "string config should not deserialize");

        let config = to_value(&AnalysisConfig::default()).expect("config");
        let mut runner = WasmBifurcationRunner::new(config).expect("runner");
        runner.run_steps(250).expect("run steps");
        assert!(runner.is_done());
        assert!(runner.point_loadings().expect("loadings").length() > 0);
        assert!(runner.get_result().is_ok());
        assert!(runner.get_result().is_err(), "result can only be taken once");
    }
}
