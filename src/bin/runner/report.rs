// Forest Scenario Report Types
// Structured JSON output for tabulation and charting outside the engine

use forest_engine::adapter::{final_year_rounded, round_hectares, RoundedYear, HECTARE_DP};
use forest_engine::{AlignPolicy, ParameterSet, ScenarioComparison, ScenarioRun};
use rust_decimal::Decimal;
use serde::Serialize;

// ─── Threshold Row ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdRow {
    pub threshold_fraction: f64,
    pub loss_pct: Decimal,
    pub crossing_year: Option<u32>,
    pub calendar_year: Option<i64>,
}

// ─── Single-Scenario Result ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub start_year: i32,
    pub horizon_years: u32,
    pub thresholds: Vec<ThresholdRow>,
    pub final_year: Option<RoundedYear>,
    pub peak_degraded_pct: Decimal,
    pub parameters: ParameterSet,
}

impl ScenarioReport {
    pub fn from_run(name: &str, run: &ScenarioRun) -> Self {
        let start = run.series.start_year();
        Self {
            name: name.to_string(),
            start_year: start,
            horizon_years: run.parameters.horizon_years,
            thresholds: run
                .thresholds
                .iter()
                .map(|t| ThresholdRow {
                    threshold_fraction: t.threshold_fraction,
                    loss_pct: round_hectares(t.loss_pct(), 1),
                    crossing_year: t.crossing_year,
                    calendar_year: t.calendar_year(start),
                })
                .collect(),
            final_year: final_year_rounded(run),
            peak_degraded_pct: round_hectares(run.series.peak_degraded_pct(), HECTARE_DP),
            parameters: run.parameters.clone(),
        }
    }
}

// ─── Group Report (one comparison) ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub align: AlignPolicy,
    pub scenarios: Vec<ScenarioReport>,
    pub comparison: Option<ScenarioComparison>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ForestReport {
    pub timestamp: String,
    pub version: &'static str,
    pub thresholds: Vec<f64>,
    pub groups: Vec<GroupReport>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub groups: usize,
    pub scenarios: usize,
    /// Scenarios crossing every threshold within their horizon.
    pub fully_crossed: usize,
}
