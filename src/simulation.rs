// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Stock-Flow Engine

use serde::Serialize;
use tracing::{debug, error, trace, warn};
use wasm_bindgen::prelude::*;

use crate::conservation::{AreaLedger, LedgerCheck};
use crate::error::{ForestError, Result};
use crate::flows::{self, YearFlows};
use crate::params::ParameterSet;
use crate::types::{TimeSeries, YearState};

// ─── ForestSimulation struct ─────────────────────────────────────────────────

/// Two-stock (intact/degraded) simulation of one scenario, advanced one year
/// per step until the horizon is reached.
#[wasm_bindgen]
pub struct ForestSimulation {
    pub(crate) params: ParameterSet,
    pub(crate) current: YearState,
    pub(crate) series: TimeSeries,
    pub(crate) ledger: AreaLedger,
    // Overdraw is reported once per run; it repeats every year once a stock is exhausted.
    pub(crate) overdraw_reported: bool,
}

/// Outcome of one year step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub state: YearState,
    pub flows: YearFlows,
    pub ledger: LedgerCheck,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl ForestSimulation {
    /// Validate `params` and set up year 0.
    pub fn from_parameters(params: ParameterSet) -> Result<Self> {
        params.validate()?;
        let initial = YearState::new(0, params.initial_intact_ha, params.initial_degraded_ha);
        let mut series =
            TimeSeries::with_capacity(params.start_year, params.horizon_years as usize + 1);
        series.push(initial);
        Ok(Self {
            ledger: AreaLedger::new(initial.total_ha()),
            current: initial,
            series,
            params,
            overdraw_reported: false,
        })
    }

    /// Advance one year. Returns `Ok(None)` once the horizon has been reached.
    pub fn step_core(&mut self) -> Result<Option<StepResult>> {
        if self.is_finished() {
            return Ok(None);
        }

        let flows = flows::compute_flows(&self.params, &self.current);
        let next = flows.apply(&self.current);

        if !next.is_finite() {
            error!(
                year = next.year,
                intact_ha = next.intact_ha,
                degraded_ha = next.degraded_ha,
                "non-finite forest stock"
            );
            return Err(ForestError::NumericInstability {
                year: next.year,
                intact_ha: next.intact_ha,
                degraded_ha: next.degraded_ha,
            });
        }

        if flows.overdrawn && !self.overdraw_reported {
            warn!(year = self.current.year, "flows exceed available stock, scaling draws");
            self.overdraw_reported = true;
        }

        let check = self.ledger.record_step(&flows, &next);
        if !check.balanced {
            warn!(
                year = next.year,
                error_ha = check.error,
                expected_ha = self.ledger.expected_total(),
                actual_ha = next.total_ha(),
                "area accounting imbalance"
            );
        }

        trace!(
            year = next.year,
            intact_ha = next.intact_ha,
            degraded_ha = next.degraded_ha,
            vulnerability = flows.vulnerability_factor,
            "year step"
        );

        self.current = next;
        self.series.push(next);

        Ok(Some(StepResult { state: next, flows, ledger: check }))
    }

    /// Run the remaining years and hand back the finished series.
    pub fn run(mut self) -> Result<TimeSeries> {
        while self.step_core()?.is_some() {}
        debug!(
            horizon = self.params.horizon_years,
            intact_ha = self.current.intact_ha,
            degraded_ha = self.current.degraded_ha,
            max_imbalance_ha = self.ledger.max_error,
            "simulation complete"
        );
        Ok(self.series)
    }

    pub fn is_finished(&self) -> bool {
        self.current.year >= self.params.horizon_years
    }

    pub fn current_state(&self) -> &YearState {
        &self.current
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Series produced so far, year 0 through the current year.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn ledger(&self) -> &AreaLedger {
        &self.ledger
    }
}

/// Simulate a scenario from year 0 to its horizon.
pub fn simulate(params: &ParameterSet) -> Result<TimeSeries> {
    ForestSimulation::from_parameters(params.clone())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_scenario() -> ParameterSet {
        ParameterSet::builder(10_000.0, 20)
            .human_conversion(100.0)
            .fire_pulse(200.0, 0.6)
            .vulnerability_feedback(2.0)
            .recovery(0.02)
            .build()
            .expect("test: valid params")
    }

    #[test]
    fn series_covers_horizon() {
        let series = simulate(&fire_scenario()).expect("test: simulation should succeed");
        assert_eq!(series.len(), 21);
        for (i, s) in series.iter().enumerate() {
            assert_eq!(s.year, i as u32);
        }
    }

    #[test]
    fn step_core_stops_at_horizon() {
        let params = ParameterSet::builder(100.0, 2).build().expect("test: valid params");
        let mut sim = ForestSimulation::from_parameters(params).expect("test: valid");
        assert!(sim.step_core().expect("test: step").is_some());
        assert!(sim.step_core().expect("test: step").is_some());
        assert!(sim.is_finished());
        assert!(sim.step_core().expect("test: step").is_none());
        assert_eq!(sim.series().len(), 3);
    }

    #[test]
    fn invalid_parameters_rejected_before_stepping() {
        let mut params = fire_scenario();
        params.recovery_rate = -1.0;
        let err = simulate(&params).expect_err("test: negative rate");
        assert_eq!(err.offending_field(), Some("recovery_rate"));
    }

    #[test]
    fn overflowing_rates_raise_numeric_instability() {
        let mut params = fire_scenario();
        params.initial_intact_ha = f64::MAX;
        params.initial_degraded_ha = f64::MAX;
        let err = simulate(&params).expect_err("test: infinite total");
        assert!(matches!(err, ForestError::NumericInstability { .. }), "got {err}");
    }

    #[test]
    fn ledger_stays_balanced() {
        let params = fire_scenario();
        let mut sim = ForestSimulation::from_parameters(params).expect("test: valid");
        while sim.step_core().expect("test: step").is_some() {}
        assert!(sim.ledger().is_balanced(), "max error {}", sim.ledger().max_error);
    }

    #[test]
    fn exhausted_forest_stays_at_zero() {
        let params = ParameterSet::builder(1_000.0, 10)
            .human_conversion(300.0)
            .build()
            .expect("test: valid params");
        let series = simulate(&params).expect("test: simulation should succeed");
        let last = series.final_state().expect("test: non-empty");
        assert_eq!(last.intact_ha, 0.0);
        assert_eq!(last.degraded_ha, 0.0);
        assert_eq!(series.get(4).map(|s| s.intact_ha), Some(0.0));
    }
}
