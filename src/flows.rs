// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Annual Flow Computation

//! One year's flows between the intact and degraded stocks.
//!
//! Stage order is fixed: human conversion, fire split, vulnerability
//! amplification, recovery. Every draw on a stock is capped so the stock
//! cannot go negative; when several draws compete for the same stock they are
//! scaled down by a common factor.

use serde::Serialize;

use crate::params::ParameterSet;
use crate::types::YearState;

/// Realized flows for one year step, all in hectares.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct YearFlows {
    /// Human conversion drawn from intact forest.
    pub human_intact: f64,
    /// Human conversion drawn from degraded forest.
    pub human_degraded: f64,
    /// Fire flow moving intact forest into the degraded stock.
    pub fire_degradation: f64,
    /// Fire flow removing intact forest outright.
    pub fire_loss: f64,
    /// Degraded forest returning to intact.
    pub recovery: f64,
    /// `1 + feedback * degraded share` applied to this year's fire flow.
    pub vulnerability_factor: f64,
    /// True when any draw had to be scaled to the available stock.
    pub overdrawn: bool,
}

impl YearFlows {
    /// Area leaving the forest entirely this year.
    pub fn removed_ha(&self) -> f64 {
        self.human_intact + self.human_degraded + self.fire_loss
    }

    /// Apply these flows to `state`, producing the next year's state.
    ///
    /// Intact forest is taken as the residual of the area balance, so the
    /// next total never exceeds `state.total_ha() - removed_ha()`.
    pub fn apply(&self, state: &YearState) -> YearState {
        let degraded =
            (state.degraded_ha - self.human_degraded + self.fire_degradation - self.recovery).max(0.0);
        let bound = state.total_ha() - self.removed_ha();
        let (intact, degraded) = fit_within(degraded, bound);
        YearState::new(state.year + 1, intact, degraded)
    }
}

/// Split `bound` into (intact, degraded) with `intact + degraded <= bound`
/// in floating point. Non-finite bounds pass through for instability checks.
fn fit_within(degraded: f64, bound: f64) -> (f64, f64) {
    if !bound.is_finite() {
        return (bound - degraded, degraded);
    }
    if bound <= 0.0 {
        return (0.0, 0.0);
    }
    if degraded >= bound {
        return (0.0, bound);
    }
    // Overshoot is at most one ulp of `bound`, and only happens when
    // intact > bound / 2, so this loop runs a handful of times at most.
    let mut intact = bound - degraded;
    while intact > 0.0 && intact + degraded > bound {
        intact = f64::from_bits(intact.to_bits() - 1);
    }
    (intact, degraded)
}

// ─── Rate Drivers ───────────────────────────────────────────────────────────

/// Human conversion demand for year `t` (ha).
pub fn human_conversion(params: &ParameterSet, t: u32) -> f64 {
    let shifted = params.regime_shift_year.map_or(false, |shift| t >= shift);
    let regime = if shifted { params.post_shift_multiplier } else { 1.0 };
    params.human_conversion_rate * params.enforcement_factor * regime
}

/// Unamplified fire pulse for year `t` (ha).
pub fn fire_pulse(params: &ParameterSet, t: u32) -> f64 {
    if let Some(years) = &params.fire_pulse_years {
        if !years.contains(&t) {
            return 0.0;
        }
    }
    let el_nino = if params.el_nino_years.contains(&t) { params.el_nino_multiplier } else { 1.0 };
    params.fire_pulse_rate * params.climate_stress * el_nino
}

/// Factor in (0, 1] that makes `draws` fit into `available`.
fn draw_scale(available: f64, draws: f64) -> f64 {
    if draws > available && draws > 0.0 {
        (available.max(0.0) / draws).min(1.0)
    } else {
        1.0
    }
}

// ─── Year Step ──────────────────────────────────────────────────────────────

/// Compute the flows taking `state` (year `state.year`) to the next year.
pub fn compute_flows(params: &ParameterSet, state: &YearState) -> YearFlows {
    let t = state.year;
    let intact = state.intact_ha;
    let degraded = state.degraded_ha;
    let mut overdrawn = false;

    // Human conversion: the degraded-targeted share is capped at the degraded
    // stock; anything it cannot take falls back onto intact forest.
    let human = human_conversion(params, t);
    let human_degraded_demand = human * params.degraded_conversion_share;
    let mut human_degraded = human_degraded_demand.min(degraded);
    let human_intact_demand = human - human_degraded;

    // Provisional fire split, used only to read the degraded share the
    // vulnerability feedback responds to.
    let fire = fire_pulse(params, t);
    let fraction = params.fire_to_degradation_fraction;
    let provisional_scale = draw_scale(intact, human_intact_demand + fire);
    let provisional_degradation = fire * fraction * provisional_scale;
    let provisional_intact = intact - (human_intact_demand + fire) * provisional_scale;
    let provisional_degraded = degraded - human_degraded + provisional_degradation;
    let share = YearState::new(t, provisional_intact, provisional_degraded).degraded_share();

    let vulnerability_factor = 1.0 + params.degradation_vulnerability_feedback * share;
    let effective_fire = fire * vulnerability_factor;
    let mut fire_degradation = effective_fire * fraction;
    let mut fire_loss = effective_fire - fire_degradation;
    let mut human_intact = human_intact_demand;

    let scale = draw_scale(intact, human_intact + fire_degradation + fire_loss);
    if scale < 1.0 {
        overdrawn = true;
        human_intact *= scale;
        fire_degradation *= scale;
        fire_loss *= scale;
    }

    // Recovery sees the degraded stock after conversion and fire.
    let degraded_after_fire = degraded - human_degraded + fire_degradation;
    let mut recovery = params.recovery_rate * degraded_after_fire.max(0.0);
    let degraded_scale = draw_scale(degraded + fire_degradation, human_degraded + recovery);
    if degraded_scale < 1.0 {
        overdrawn = true;
        human_degraded *= degraded_scale;
        recovery *= degraded_scale;
    }

    YearFlows {
        human_intact,
        human_degraded,
        fire_degradation,
        fire_loss,
        recovery,
        vulnerability_factor,
        overdrawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> crate::params::ParameterSetBuilder {
        ParameterSet::builder(1_000.0, 10)
    }

    #[test]
    fn regime_shift_applies_from_shift_year() {
        let p = params().human_conversion(10.0).regime_shift(3, 1.5).build().expect("test: valid params");
        assert_eq!(human_conversion(&p, 2), 10.0);
        assert_eq!(human_conversion(&p, 3), 15.0);
        assert_eq!(human_conversion(&p, 9), 15.0);
    }

    #[test]
    fn enforcement_scales_human_conversion() {
        let p = params().human_conversion(10.0).enforcement(0.7).build().expect("test: valid params");
        assert!((human_conversion(&p, 0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn el_nino_only_in_listed_years() {
        let p = params().fire_pulse(20.0, 0.5).el_nino([4], 1.2).build().expect("test: valid params");
        assert_eq!(fire_pulse(&p, 3), 20.0);
        assert!((fire_pulse(&p, 4) - 24.0).abs() < 1e-12);
    }

    #[test]
    fn fire_pulse_years_gate_fire() {
        let p = params().fire_pulse(20.0, 0.5).fire_pulse_years([2, 5]).build().expect("test: valid params");
        assert_eq!(fire_pulse(&p, 1), 0.0);
        assert_eq!(fire_pulse(&p, 2), 20.0);
    }

    #[test]
    fn fire_split_without_feedback() {
        let p = params().fire_pulse(100.0, 0.25).build().expect("test: valid params");
        let flows = compute_flows(&p, &YearState::new(0, 1_000.0, 0.0));
        assert!((flows.fire_degradation - 25.0).abs() < 1e-12);
        assert!((flows.fire_loss - 75.0).abs() < 1e-12);
        assert_eq!(flows.vulnerability_factor, 1.0);
        let next = flows.apply(&YearState::new(0, 1_000.0, 0.0));
        assert!((next.intact_ha - 900.0).abs() < 1e-12);
        assert!((next.degraded_ha - 25.0).abs() < 1e-12);
    }

    #[test]
    fn feedback_reads_share_after_provisional_fire() {
        // Provisional: intact 900, degraded 100 -> share 0.1, factor 1 + 2 * 0.1.
        let p = params().fire_pulse(100.0, 1.0).vulnerability_feedback(2.0).build().expect("test: valid params");
        let flows = compute_flows(&p, &YearState::new(0, 1_000.0, 0.0));
        assert!((flows.vulnerability_factor - 1.2).abs() < 1e-12);
        assert!((flows.fire_degradation - 120.0).abs() < 1e-9);
    }

    #[test]
    fn recovery_moves_degraded_to_intact() {
        let p = params().initial_degraded(200.0).recovery(0.1).build().expect("test: valid params");
        let state = YearState::new(0, 1_000.0, 200.0);
        let flows = compute_flows(&p, &state);
        assert!((flows.recovery - 20.0).abs() < 1e-12);
        let next = flows.apply(&state);
        assert!((next.intact_ha - 1_020.0).abs() < 1e-12);
        assert!((next.degraded_ha - 180.0).abs() < 1e-12);
        assert_eq!(flows.removed_ha(), 0.0);
    }

    #[test]
    fn competing_draws_are_scaled_proportionally() {
        let p = params().human_conversion(600.0).fire_pulse(600.0, 0.5).build().expect("test: valid params");
        let state = YearState::new(0, 1_000.0, 0.0);
        let flows = compute_flows(&p, &state);
        assert!(flows.overdrawn);
        let drawn = flows.human_intact + flows.fire_degradation + flows.fire_loss;
        assert!((drawn - 1_000.0).abs() < 1e-9);
        assert!((flows.human_intact / flows.fire_loss - 2.0).abs() < 1e-9);
        let next = flows.apply(&state);
        assert!(next.intact_ha >= 0.0 && next.degraded_ha >= 0.0);
    }

    #[test]
    fn degraded_targeted_conversion_is_capped() {
        let p = params()
            .initial_degraded(10.0)
            .human_conversion(100.0)
            .degraded_conversion_share(0.5)
            .build()
            .expect("test: valid params");
        let flows = compute_flows(&p, &YearState::new(0, 1_000.0, 10.0));
        assert_eq!(flows.human_degraded, 10.0);
        assert_eq!(flows.human_intact, 90.0);
    }

    #[test]
    fn recovery_above_one_cannot_overdraw_degraded() {
        let p = params().initial_degraded(50.0).recovery(3.0).build().expect("test: valid params");
        let state = YearState::new(0, 1_000.0, 50.0);
        let flows = compute_flows(&p, &state);
        assert!(flows.overdrawn);
        let next = flows.apply(&state);
        assert!(next.degraded_ha < 1e-9);
        assert!((next.intact_ha - 1_050.0).abs() < 1e-9);
    }

    #[test]
    fn fit_within_never_exceeds_bound() {
        for i in 0..20_000u32 {
            let bound = 39_011_117.0 - i as f64 * 0.731;
            let degraded = i as f64 * 977.123_456_7 % bound;
            let (intact, d) = fit_within(degraded, bound);
            assert!(intact + d <= bound, "i={i}: {intact} + {d} > {bound}");
            assert!(intact >= 0.0);
            assert_eq!(d, degraded);
        }
    }

    #[test]
    fn fit_within_edge_cases() {
        assert_eq!(fit_within(5.0, 0.0), (0.0, 0.0));
        assert_eq!(fit_within(5.0, -1e-9), (0.0, 0.0));
        assert_eq!(fit_within(12.0, 10.0), (0.0, 10.0));
        assert_eq!(fit_within(4.0, 10.0), (6.0, 4.0));
        assert!(fit_within(1.0, f64::INFINITY).0.is_infinite());
    }

    #[test]
    fn transfers_never_grow_total() {
        let p = params().fire_pulse(20_000.0, 1.0).vulnerability_feedback(2.0).recovery(0.01)
            .build().expect("test: valid params");
        let mut state = YearState::new(0, 39_011_117.0, 0.0);
        for _ in 0..200 {
            let next = compute_flows(&p, &state).apply(&state);
            assert!(next.total_ha() <= state.total_ha(), "{state:?} -> {next:?}");
            state = next;
        }
    }
}
