// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Scenario Parameters

//! Scenario parameter set and its validation.
//!
//! A [`ParameterSet`] is an immutable value describing one scenario: initial
//! stocks, flow rates, multipliers and the simulated horizon. Year-valued
//! fields (`regime_shift_year`, `el_nino_years`, `fire_pulse_years`) are year
//! indices relative to `start_year`; use [`ParameterSet::year_index`] or the
//! calendar helpers on [`ParameterSetBuilder`] to convert calendar years.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

// ---------------------------------------------------------------------------
// ParameterSet
// ---------------------------------------------------------------------------

/// Rates, multipliers and initial stocks of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Intact forest at year 0 (ha), must be > 0.
    pub initial_intact_ha: f64,
    /// Degraded forest at year 0 (ha).
    #[serde(default)]
    pub initial_degraded_ha: f64,
    /// Human conversion of forest (ha/year).
    #[serde(default)]
    pub human_conversion_rate: f64,
    /// Fire pulse drawing on intact forest (ha/year).
    #[serde(default)]
    pub fire_pulse_rate: f64,
    /// Share of the fire flow that degrades rather than removes forest, in [0, 1].
    #[serde(default)]
    pub fire_to_degradation_fraction: f64,
    /// Amplification of the fire flow per unit of degraded share.
    #[serde(default)]
    pub degradation_vulnerability_feedback: f64,
    /// Fraction of the degraded stock returning to intact each year.
    #[serde(default)]
    pub recovery_rate: f64,
    /// First year index of the sustained human-conversion regime shift.
    #[serde(default)]
    pub regime_shift_year: Option<u32>,
    /// Multiplier on human conversion from `regime_shift_year` onward.
    #[serde(default = "one")]
    pub post_shift_multiplier: f64,
    #[serde(default)]
    pub el_nino_years: BTreeSet<u32>,
    /// Multiplier on the fire pulse in El Niño years, must be >= 1.
    #[serde(default = "one")]
    pub el_nino_multiplier: f64,
    pub horizon_years: u32,

    /// Calendar year of year index 0.
    #[serde(default)]
    pub start_year: i32,
    /// Governance multiplier on human conversion (lower = stronger enforcement).
    #[serde(default = "one")]
    pub enforcement_factor: f64,
    /// Climate multiplier on the fire pulse.
    #[serde(default = "one")]
    pub climate_stress: f64,
    /// When set, fire only burns in these year indices.
    #[serde(default)]
    pub fire_pulse_years: Option<BTreeSet<u32>>,
    /// Share of human conversion that targets degraded forest first, in [0, 1].
    #[serde(default)]
    pub degraded_conversion_share: f64,
    /// Historical forest baseline the initial stocks must fit within.
    #[serde(default)]
    pub baseline_total_ha: Option<f64>,
}

fn one() -> f64 {
    1.0
}

impl ParameterSet {
    /// Start a builder with every flow switched off.
    pub fn builder(initial_intact_ha: f64, horizon_years: u32) -> ParameterSetBuilder {
        ParameterSetBuilder::new(initial_intact_ha, horizon_years)
    }

    pub fn initial_total_ha(&self) -> f64 {
        self.initial_intact_ha + self.initial_degraded_ha
    }

    /// Year index of a calendar year, saturating at 0.
    pub fn year_index(&self, calendar_year: i32) -> u32 {
        (calendar_year as i64 - self.start_year as i64).clamp(0, u32::MAX as i64) as u32
    }

    pub fn calendar_year(&self, year: u32) -> i64 {
        self.start_year as i64 + year as i64
    }

    /// Copy of these parameters with a different horizon.
    pub fn with_horizon(&self, horizon_years: u32) -> Self {
        Self { horizon_years, ..self.clone() }
    }

    /// Check every field, reporting the first offending one.
    pub fn validate(&self) -> Result<()> {
        positive("initial_intact_ha", self.initial_intact_ha)?;
        non_negative("initial_degraded_ha", self.initial_degraded_ha)?;
        non_negative("human_conversion_rate", self.human_conversion_rate)?;
        non_negative("fire_pulse_rate", self.fire_pulse_rate)?;
        fraction("fire_to_degradation_fraction", self.fire_to_degradation_fraction)?;
        non_negative(
            "degradation_vulnerability_feedback",
            self.degradation_vulnerability_feedback,
        )?;
        non_negative("recovery_rate", self.recovery_rate)?;
        non_negative("post_shift_multiplier", self.post_shift_multiplier)?;
        if !self.el_nino_multiplier.is_finite() || self.el_nino_multiplier < 1.0 {
            return Err(ForestError::invalid(
                "el_nino_multiplier",
                format!("must be finite and >= 1, got {}", self.el_nino_multiplier),
            ));
        }
        if self.horizon_years == 0 {
            return Err(ForestError::invalid("horizon_years", "must be > 0"));
        }
        non_negative("enforcement_factor", self.enforcement_factor)?;
        non_negative("climate_stress", self.climate_stress)?;
        fraction("degraded_conversion_share", self.degraded_conversion_share)?;

        if let Some(baseline) = self.baseline_total_ha {
            positive("baseline_total_ha", baseline)?;
            let initial = self.initial_total_ha();
            if initial > baseline {
                return Err(ForestError::invalid(
                    "initial_degraded_ha",
                    format!("initial stocks {initial} ha exceed the historical baseline {baseline} ha"),
                ));
            }
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

fn fraction(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("must be in [0, 1], got {value}")))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Consuming builder for [`ParameterSet`]; `build()` validates.
#[derive(Debug, Clone)]
pub struct ParameterSetBuilder {
    params: ParameterSet,
}

impl ParameterSetBuilder {
    fn new(initial_intact_ha: f64, horizon_years: u32) -> Self {
        Self {
            params: ParameterSet {
                initial_intact_ha,
                initial_degraded_ha: 0.0,
                human_conversion_rate: 0.0,
                fire_pulse_rate: 0.0,
                fire_to_degradation_fraction: 0.0,
                degradation_vulnerability_feedback: 0.0,
                recovery_rate: 0.0,
                regime_shift_year: None,
                post_shift_multiplier: 1.0,
                el_nino_years: BTreeSet::new(),
                el_nino_multiplier: 1.0,
                horizon_years,
                start_year: 0,
                enforcement_factor: 1.0,
                climate_stress: 1.0,
                fire_pulse_years: None,
                degraded_conversion_share: 0.0,
                baseline_total_ha: None,
            },
        }
    }

    pub fn initial_degraded(mut self, ha: f64) -> Self {
        self.params.initial_degraded_ha = ha;
        self
    }

    pub fn human_conversion(mut self, ha_per_year: f64) -> Self {
        self.params.human_conversion_rate = ha_per_year;
        self
    }

    pub fn fire_pulse(mut self, ha_per_year: f64, degradation_fraction: f64) -> Self {
        self.params.fire_pulse_rate = ha_per_year;
        self.params.fire_to_degradation_fraction = degradation_fraction;
        self
    }

    pub fn vulnerability_feedback(mut self, coefficient: f64) -> Self {
        self.params.degradation_vulnerability_feedback = coefficient;
        self
    }

    pub fn recovery(mut self, rate: f64) -> Self {
        self.params.recovery_rate = rate;
        self
    }

    pub fn regime_shift(mut self, year: u32, multiplier: f64) -> Self {
        self.params.regime_shift_year = Some(year);
        self.params.post_shift_multiplier = multiplier;
        self
    }

    pub fn el_nino(mut self, years: impl IntoIterator<Item = u32>, multiplier: f64) -> Self {
        self.params.el_nino_years = years.into_iter().collect();
        self.params.el_nino_multiplier = multiplier;
        self
    }

    pub fn fire_pulse_years(mut self, years: impl IntoIterator<Item = u32>) -> Self {
        self.params.fire_pulse_years = Some(years.into_iter().collect());
        self
    }

    /// Set the calendar year of index 0. Call before the calendar helpers below.
    pub fn start_year(mut self, year: i32) -> Self {
        self.params.start_year = year;
        self
    }

    pub fn regime_shift_from_calendar(self, calendar_year: i32, multiplier: f64) -> Self {
        let year = self.params.year_index(calendar_year);
        self.regime_shift(year, multiplier)
    }

    /// Calendar years before `start_year` are dropped.
    pub fn el_nino_calendar_years(
        self,
        calendar_years: impl IntoIterator<Item = i32>,
        multiplier: f64,
    ) -> Self {
        let start = self.params.start_year;
        let years: Vec<u32> = calendar_years
            .into_iter()
            .filter(|&y| y >= start)
            .map(|y| self.params.year_index(y))
            .collect();
        self.el_nino(years, multiplier)
    }

    /// Calendar years before `start_year` are dropped.
    pub fn fire_pulse_calendar_years(self, calendar_years: impl IntoIterator<Item = i32>) -> Self {
        let start = self.params.start_year;
        let years: Vec<u32> = calendar_years
            .into_iter()
            .filter(|&y| y >= start)
            .map(|y| self.params.year_index(y))
            .collect();
        self.fire_pulse_years(years)
    }

    pub fn enforcement(mut self, factor: f64) -> Self {
        self.params.enforcement_factor = factor;
        self
    }

    pub fn climate_stress(mut self, factor: f64) -> Self {
        self.params.climate_stress = factor;
        self
    }

    pub fn degraded_conversion_share(mut self, share: f64) -> Self {
        self.params.degraded_conversion_share = share;
        self
    }

    pub fn baseline_total(mut self, ha: f64) -> Self {
        self.params.baseline_total_ha = Some(ha);
        self
    }

    pub fn build(self) -> Result<ParameterSet> {
        self.params.validate()?;
        Ok(self.params)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ParameterSetBuilder {
        ParameterSet::builder(1_000.0, 10)
    }

    #[test]
    fn builder_defaults_are_neutral() {
        let p = base().build().expect("test: defaults should validate");
        assert_eq!(p.post_shift_multiplier, 1.0);
        assert_eq!(p.el_nino_multiplier, 1.0);
        assert_eq!(p.enforcement_factor, 1.0);
        assert_eq!(p.climate_stress, 1.0);
        assert!(p.el_nino_years.is_empty());
        assert!(p.fire_pulse_years.is_none());
        assert_eq!(p.initial_total_ha(), 1_000.0);
    }

    #[test]
    fn rejects_zero_horizon() {
        let err = ParameterSet::builder(1_000.0, 0).build().expect_err("test: horizon 0");
        assert_eq!(err.offending_field(), Some("horizon_years"));
    }

    #[test]
    fn rejects_non_positive_intact() {
        let err = ParameterSet::builder(0.0, 5).build().expect_err("test: intact 0");
        assert_eq!(err.offending_field(), Some("initial_intact_ha"));
    }

    #[test]
    fn rejects_negative_rates() {
        let cases: Vec<(ParameterSetBuilder, &str)> = vec![
            (base().human_conversion(-1.0), "human_conversion_rate"),
            (base().fire_pulse(-5.0, 0.5), "fire_pulse_rate"),
            (base().recovery(-0.01), "recovery_rate"),
            (base().vulnerability_feedback(-2.0), "degradation_vulnerability_feedback"),
            (base().regime_shift(3, -0.3), "post_shift_multiplier"),
            (base().initial_degraded(-10.0), "initial_degraded_ha"),
            (base().enforcement(-0.5), "enforcement_factor"),
            (base().climate_stress(f64::NAN), "climate_stress"),
        ];
        for (builder, field) in cases {
            let err = builder.build().expect_err("test: should be rejected");
            assert_eq!(err.offending_field(), Some(field));
        }
    }

    #[test]
    fn rejects_fraction_out_of_range() {
        let err = base().fire_pulse(100.0, 1.5).build().expect_err("test: fraction > 1");
        assert_eq!(err.offending_field(), Some("fire_to_degradation_fraction"));
        let err = base()
            .degraded_conversion_share(-0.1)
            .build()
            .expect_err("test: share < 0");
        assert_eq!(err.offending_field(), Some("degraded_conversion_share"));
    }

    #[test]
    fn rejects_el_nino_multiplier_below_one() {
        let err = base().el_nino([2, 3], 0.8).build().expect_err("test: multiplier < 1");
        assert_eq!(err.offending_field(), Some("el_nino_multiplier"));
    }

    #[test]
    fn baseline_sanity_check() {
        assert!(base().initial_degraded(500.0).baseline_total(1_500.0).build().is_ok());
        let err = base()
            .initial_degraded(600.0)
            .baseline_total(1_500.0)
            .build()
            .expect_err("test: exceeds baseline");
        assert_eq!(err.offending_field(), Some("initial_degraded_ha"));
    }

    #[test]
    fn calendar_helpers_map_to_indices() {
        let p = ParameterSet::builder(1_000.0, 200)
            .start_year(2000)
            .regime_shift_from_calendar(2017, 1.3)
            .el_nino_calendar_years([1998, 2015, 2016, 2023, 2024], 1.2)
            .fire_pulse_calendar_years([2019, 2024])
            .build()
            .expect("test: valid calendar scenario");
        assert_eq!(p.regime_shift_year, Some(17));
        assert_eq!(p.el_nino_years.iter().copied().collect::<Vec<_>>(), vec![15, 16, 23, 24]);
        assert_eq!(
            p.fire_pulse_years.as_ref().map(|s| s.iter().copied().collect::<Vec<_>>()),
            Some(vec![19, 24])
        );
        assert_eq!(p.year_index(1990), 0);
        assert_eq!(p.calendar_year(17), 2017);
    }

    #[test]
    fn with_horizon_leaves_original_untouched() {
        let p = base().human_conversion(5.0).build().expect("test: valid");
        let q = p.with_horizon(4);
        assert_eq!(p.horizon_years, 10);
        assert_eq!(q.horizon_years, 4);
        assert_eq!(q.human_conversion_rate, 5.0);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{ "initial_intact_ha": 100.0, "horizon_years": 5, "human_conversion_rate": 2.0 }"#;
        let p: ParameterSet = serde_json::from_str(json).expect("test: valid json");
        assert_eq!(p.post_shift_multiplier, 1.0);
        assert_eq!(p.el_nino_multiplier, 1.0);
        assert_eq!(p.enforcement_factor, 1.0);
        assert_eq!(p.initial_degraded_ha, 0.0);
        assert!(p.validate().is_ok());
    }
}
