// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Intact/Degraded Stock-Flow Engine

pub mod types;
pub mod error;
pub mod params;
pub mod flows;
pub mod simulation;
pub mod thresholds;
pub mod comparator;
pub mod conservation;
pub mod adapter;

pub use types::*;
pub use error::{ForestError, Result};
pub use params::{ParameterSet, ParameterSetBuilder};
pub use simulation::{simulate, ForestSimulation, StepResult};
pub use thresholds::{detect_thresholds, DEFAULT_THRESHOLDS};
pub use comparator::{compare, compare_with, ComparisonConfig, ScenarioComparison};

use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl ForestSimulation {
    /// Build from a JS object shaped like `ParameterSet`.
    #[wasm_bindgen(constructor)]
    pub fn new(params: JsValue) -> std::result::Result<ForestSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let params: ParameterSet = serde_wasm_bindgen::from_value(params)?;
        ForestSimulation::from_parameters(params).map_err(to_js_error)
    }

    /// Advance one year. Returns the step result, or `null` past the horizon.
    pub fn tick(&mut self) -> std::result::Result<JsValue, JsValue> {
        match self.step_core().map_err(to_js_error)? {
            Some(step) => serde_wasm_bindgen::to_value(&step).map_err(to_js_error),
            None => Ok(JsValue::NULL),
        }
    }

    /// Run up to `years` steps without returning intermediate results.
    pub fn run_batch(&mut self, years: u32) -> std::result::Result<(), JsValue> {
        for _ in 0..years {
            if self.step_core().map_err(to_js_error)?.is_none() {
                break;
            }
        }
        Ok(())
    }

    pub fn get_series(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.series()).unwrap_or(JsValue::NULL)
    }

    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.current_state()).unwrap_or(JsValue::NULL)
    }

    pub fn get_ledger(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.ledger()).unwrap_or(JsValue::NULL)
    }

    pub fn finished(&self) -> bool {
        self.is_finished()
    }

    /// Restart from year 0 with the same parameters.
    pub fn reset(&mut self) -> std::result::Result<(), JsValue> {
        *self = ForestSimulation::from_parameters(self.params.clone()).map_err(to_js_error)?;
        Ok(())
    }
}

/// Simulate a full scenario, returning its series.
#[wasm_bindgen(js_name = simulate)]
pub fn simulate_js(params: JsValue) -> std::result::Result<JsValue, JsValue> {
    let params: ParameterSet = serde_wasm_bindgen::from_value(params)?;
    let series = simulate(&params).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&series).map_err(to_js_error)
}

/// Detect threshold crossings in a series given as an array of year states.
#[wasm_bindgen(js_name = detectThresholds)]
pub fn detect_thresholds_js(
    states: JsValue,
    start_year: i32,
    thresholds: Vec<f64>,
) -> std::result::Result<JsValue, JsValue> {
    let states: Vec<YearState> = serde_wasm_bindgen::from_value(states)?;
    let series = TimeSeries::from_states(start_year, states).map_err(to_js_error)?;
    let results = detect_thresholds(&series, &thresholds).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&results).map_err(to_js_error)
}

/// Compare `[{ name, parameters }]` scenarios; `truncate` aligns horizons to
/// the shortest instead of failing.
#[wasm_bindgen(js_name = compare)]
pub fn compare_js(
    scenarios: JsValue,
    truncate: bool,
    thresholds: Option<Vec<f64>>,
) -> std::result::Result<JsValue, JsValue> {
    let named: Vec<NamedScenario> = serde_wasm_bindgen::from_value(scenarios)?;
    let scenarios: Vec<(String, ParameterSet)> = named.into_iter().map(Into::into).collect();
    let config = ComparisonConfig {
        align: if truncate { AlignPolicy::TruncateToShortest } else { AlignPolicy::Strict },
        thresholds: thresholds.unwrap_or_else(|| DEFAULT_THRESHOLDS.to_vec()),
        parallel: false,
    };
    let runs = compare_with(&scenarios, &config).map_err(to_js_error)?;
    let comparison = ScenarioComparison::against_baseline(&runs);
    serde_wasm_bindgen::to_value(&(runs, comparison)).map_err(to_js_error)
}
