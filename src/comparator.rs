// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Scenario Comparator

//! Runs the engine over several named scenarios and lines the results up for
//! side-by-side comparison.
//!
//! Scenarios are independent: each run owns its series buffer and parameter
//! sets are only read, so the parallel path needs no locking.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ForestError, Result};
use crate::params::ParameterSet;
use crate::simulation::simulate;
use crate::thresholds::{detect_thresholds, DEFAULT_THRESHOLDS};
use crate::types::{AlignPolicy, ScenarioRun};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a comparison is carried out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonConfig {
    pub align: AlignPolicy,
    pub thresholds: Vec<f64>,
    /// Run scenarios on the rayon pool (ignored on wasm32).
    pub parallel: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            align: AlignPolicy::Strict,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            parallel: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compare scenarios with the default thresholds, sequentially.
pub fn compare(
    scenarios: &[(String, ParameterSet)],
    align: AlignPolicy,
) -> Result<Vec<(String, ScenarioRun)>> {
    compare_with(scenarios, &ComparisonConfig { align, ..ComparisonConfig::default() })
}

/// Compare scenarios. Output keeps input order.
pub fn compare_with(
    scenarios: &[(String, ParameterSet)],
    config: &ComparisonConfig,
) -> Result<Vec<(String, ScenarioRun)>> {
    let horizon = aligned_horizon(scenarios, config.align)?;
    let Some(horizon) = horizon else {
        return Ok(Vec::new());
    };

    let run_one = |(name, params): &(String, ParameterSet)| -> Result<(String, ScenarioRun)> {
        let params = if params.horizon_years == horizon {
            params.clone()
        } else {
            params.with_horizon(horizon)
        };
        run_scenario(params, &config.thresholds)
            .map(|run| (name.clone(), run))
            .map_err(|e| ForestError::ScenarioFailed { name: name.clone(), source: Box::new(e) })
    };

    let results: Vec<Result<(String, ScenarioRun)>> = if config.parallel {
        run_parallel(scenarios, run_one)
    } else {
        scenarios.iter().map(run_one).collect()
    };

    info!(scenarios = results.len(), horizon, "comparison complete");
    results.into_iter().collect()
}

/// Simulate one scenario and detect its threshold crossings.
pub fn run_scenario(params: ParameterSet, thresholds: &[f64]) -> Result<ScenarioRun> {
    let series = simulate(&params)?;
    let thresholds = detect_thresholds(&series, thresholds)?;
    Ok(ScenarioRun { parameters: params, series, thresholds })
}

#[cfg(not(target_arch = "wasm32"))]
fn run_parallel<F>(
    scenarios: &[(String, ParameterSet)],
    run_one: F,
) -> Vec<Result<(String, ScenarioRun)>>
where
    F: Fn(&(String, ParameterSet)) -> Result<(String, ScenarioRun)> + Sync + Send,
{
    use rayon::prelude::*;
    scenarios.par_iter().map(run_one).collect()
}

#[cfg(target_arch = "wasm32")]
fn run_parallel<F>(
    scenarios: &[(String, ParameterSet)],
    run_one: F,
) -> Vec<Result<(String, ScenarioRun)>>
where
    F: Fn(&(String, ParameterSet)) -> Result<(String, ScenarioRun)>,
{
    scenarios.iter().map(run_one).collect()
}

/// Horizon every run will use, or `None` for an empty comparison.
fn aligned_horizon(scenarios: &[(String, ParameterSet)], align: AlignPolicy) -> Result<Option<u32>> {
    let Some((_, first)) = scenarios.first() else {
        return Ok(None);
    };
    match align {
        AlignPolicy::Strict => {
            let expected = first.horizon_years;
            if let Some((name, params)) =
                scenarios.iter().find(|(_, p)| p.horizon_years != expected)
            {
                return Err(ForestError::IncomparableScenarios {
                    name: name.clone(),
                    expected,
                    found: params.horizon_years,
                });
            }
            Ok(Some(expected))
        }
        AlignPolicy::TruncateToShortest => {
            let shortest = scenarios.iter().map(|(_, p)| p.horizon_years).min();
            if let Some(h) = shortest {
                if scenarios.iter().any(|(_, p)| p.horizon_years != h) {
                    debug!(horizon = h, "truncating scenarios to shortest horizon");
                }
            }
            Ok(shortest)
        }
    }
}

// ---------------------------------------------------------------------------
// Side-by-side comparison
// ---------------------------------------------------------------------------

/// One scenario measured against the baseline (the first run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDelta {
    pub name: String,
    /// Crossing year minus baseline crossing year, per threshold. Negative =
    /// crossed earlier. `None` when either side never crossed.
    pub threshold_shift_years: Vec<Option<i64>>,
    /// Scenario total minus baseline total at the final year (ha).
    pub final_total_gap_ha: f64,
    /// Final degraded area minus baseline final degraded area (ha).
    pub final_degraded_gap_ha: f64,
    /// Year where the totals differ the most, with that absolute gap.
    pub max_divergence: Option<(u32, f64)>,
}

/// Runs compared against the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub baseline: String,
    pub deltas: Vec<ScenarioDelta>,
}

impl ScenarioComparison {
    /// `None` when `runs` is empty.
    pub fn against_baseline(runs: &[(String, ScenarioRun)]) -> Option<Self> {
        let (baseline_name, baseline) = runs.first()?;
        let deltas = runs
            .iter()
            .map(|(name, run)| delta(name, baseline, run))
            .collect();
        Some(Self { baseline: baseline_name.clone(), deltas })
    }
}

fn delta(name: &str, baseline: &ScenarioRun, run: &ScenarioRun) -> ScenarioDelta {
    let threshold_shift_years = run
        .thresholds
        .iter()
        .zip(&baseline.thresholds)
        .map(|(r, b)| match (r.crossing_year, b.crossing_year) {
            (Some(y), Some(by)) => Some(y as i64 - by as i64),
            _ => None,
        })
        .collect();

    let final_total = |r: &ScenarioRun| r.series.final_state().map_or(0.0, |s| s.total_ha());
    let final_degraded = |r: &ScenarioRun| r.series.final_state().map_or(0.0, |s| s.degraded_ha);

    let max_divergence = run
        .series
        .iter()
        .zip(baseline.series.iter())
        .map(|(a, b)| (a.year, (a.total_ha() - b.total_ha()).abs()))
        .fold(None, |best: Option<(u32, f64)>, (year, gap)| match best {
            Some((_, g)) if g >= gap => best,
            _ => Some((year, gap)),
        });

    ScenarioDelta {
        name: name.to_string(),
        threshold_shift_years,
        final_total_gap_ha: final_total(run) - final_total(baseline),
        final_degraded_gap_ha: final_degraded(run) - final_degraded(baseline),
        max_divergence,
    }
}
