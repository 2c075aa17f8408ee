//! Adapter layer: converts the engine's f64 hectares into rounded `Decimal`
//! values for tabulation. Rounding only ever happens here, never inside the
//! simulation.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::types::{ScenarioRun, YearState};

/// Decimal places used for reported hectares.
pub const HECTARE_DP: u32 = 2;

/// Convert f64 to Decimal (lossy but sufficient for reporting).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Round an area for presentation (half away from zero).
pub fn round_hectares(v: f64, dp: u32) -> Decimal {
    to_decimal(v).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounded view of one year, as handed to tables and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundedYear {
    pub year: u32,
    pub calendar_year: i64,
    pub intact_ha: Decimal,
    pub degraded_ha: Decimal,
    pub total_ha: Decimal,
    pub degraded_pct: Decimal,
}

impl RoundedYear {
    pub fn from_state(state: &YearState, start_year: i32, dp: u32) -> Self {
        let total = state.total_ha();
        Self {
            year: state.year,
            calendar_year: start_year as i64 + state.year as i64,
            intact_ha: round_hectares(state.intact_ha, dp),
            degraded_ha: round_hectares(state.degraded_ha, dp),
            total_ha: round_hectares(total, dp),
            degraded_pct: round_hectares(state.degraded_ha / total.max(1.0) * 100.0, dp),
        }
    }
}

/// Rounded final year of a run, `None` for an empty series.
pub fn final_year_rounded(run: &ScenarioRun) -> Option<RoundedYear> {
    let start = run.series.start_year();
    run.series
        .final_state()
        .map(|s| RoundedYear::from_state(s, start, HECTARE_DP))
}
