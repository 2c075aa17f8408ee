// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};
use crate::params::ParameterSet;

// ─── Year State ─────────────────────────────────────────────────────────────

/// Forest stocks at the end of one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearState {
    /// Year index, 0 = initial conditions.
    pub year: u32,
    pub intact_ha: f64,
    pub degraded_ha: f64,
}

impl YearState {
    pub fn new(year: u32, intact_ha: f64, degraded_ha: f64) -> Self {
        Self { year, intact_ha, degraded_ha }
    }

    /// Intact plus degraded forest.
    pub fn total_ha(&self) -> f64 {
        self.intact_ha + self.degraded_ha
    }

    /// Share of the remaining forest that is degraded, in [0, 1].
    pub fn degraded_share(&self) -> f64 {
        let total = self.total_ha();
        if total > 0.0 { (self.degraded_ha / total).clamp(0.0, 1.0) } else { 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.intact_ha.is_finite() && self.degraded_ha.is_finite()
    }
}

// ─── Time Series ────────────────────────────────────────────────────────────

/// Year-by-year stock levels of one scenario, year 0 through the horizon.
///
/// Built incrementally by the engine and immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    start_year: i32,
    states: Vec<YearState>,
}

impl TimeSeries {
    pub(crate) fn with_capacity(start_year: i32, capacity: usize) -> Self {
        Self { start_year, states: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, state: YearState) {
        debug_assert!(self.states.last().map_or(true, |last| last.year < state.year));
        self.states.push(state);
    }

    /// Build a series from precomputed states (e.g. for re-scanning stored
    /// output). Years must be strictly increasing and stocks finite and
    /// non-negative.
    pub fn from_states(start_year: i32, states: Vec<YearState>) -> Result<Self> {
        for pair in states.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ForestError::invalid(
                    "states",
                    format!("years must be strictly increasing ({} then {})", pair[0].year, pair[1].year),
                ));
            }
        }
        if let Some(bad) = states
            .iter()
            .find(|s| !s.is_finite() || s.intact_ha < 0.0 || s.degraded_ha < 0.0)
        {
            return Err(ForestError::invalid(
                "states",
                format!("year {} has a negative or non-finite stock", bad.year),
            ));
        }
        Ok(Self { start_year, states })
    }

    pub fn states(&self) -> &[YearState] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, YearState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, year: u32) -> Option<&YearState> {
        self.states
            .binary_search_by_key(&year, |s| s.year)
            .ok()
            .map(|i| &self.states[i])
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Calendar year for a year index.
    pub fn calendar_year(&self, year: u32) -> i64 {
        self.start_year as i64 + year as i64
    }

    pub fn initial_total(&self) -> f64 {
        self.states.first().map_or(0.0, YearState::total_ha)
    }

    pub fn final_state(&self) -> Option<&YearState> {
        self.states.last()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.states.iter().map(YearState::total_ha).collect()
    }

    /// Cumulative deforested area: initial total minus remaining, floored at 0.
    pub fn deforested_ha(&self) -> Vec<f64> {
        let initial = self.initial_total();
        self.states.iter().map(|s| (initial - s.total_ha()).max(0.0)).collect()
    }

    /// Degraded area as a percent of total (denominator floored at 1 ha).
    pub fn degraded_pct(&self) -> Vec<f64> {
        self.states
            .iter()
            .map(|s| s.degraded_ha / s.total_ha().max(1.0) * 100.0)
            .collect()
    }

    pub fn peak_degraded_pct(&self) -> f64 {
        self.degraded_pct().into_iter().fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a YearState;
    type IntoIter = std::slice::Iter<'a, YearState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

// ─── Threshold Result ───────────────────────────────────────────────────────

/// First year the remaining-forest fraction fell to or below a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub threshold_fraction: f64,
    /// `None` when not crossed within the horizon.
    pub crossing_year: Option<u32>,
}

impl ThresholdResult {
    pub fn is_crossed(&self) -> bool {
        self.crossing_year.is_some()
    }

    /// Loss percentage this threshold stands for (0.80 remaining = 20% loss).
    pub fn loss_pct(&self) -> f64 {
        (1.0 - self.threshold_fraction) * 100.0
    }

    pub fn calendar_year(&self, start_year: i32) -> Option<i64> {
        self.crossing_year.map(|y| start_year as i64 + y as i64)
    }
}

// ─── Scenario Run ───────────────────────────────────────────────────────────

/// Parameters, produced series and threshold years of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRun {
    pub parameters: ParameterSet,
    pub series: TimeSeries,
    pub thresholds: Vec<ThresholdResult>,
}

// ─── Named Scenario ─────────────────────────────────────────────────────────

/// A parameter set with the label it is reported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    pub parameters: ParameterSet,
}

impl From<NamedScenario> for (String, ParameterSet) {
    fn from(s: NamedScenario) -> Self {
        (s.name, s.parameters)
    }
}

// ─── Alignment Policy ───────────────────────────────────────────────────────

/// How the comparator treats scenarios with different horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlignPolicy {
    /// Horizons must match, otherwise `IncomparableScenarios`.
    #[default]
    Strict,
    /// Run every scenario to the shortest horizon.
    TruncateToShortest,
}
