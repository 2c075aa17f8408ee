#[cfg(test)]
mod tests {
    use forest_engine::{
        detect_thresholds, simulate, ForestSimulation, ParameterSet, TimeSeries, YearState,
    };
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[allow(clippy::too_many_arguments)]
    fn scenario(
        intact: u32,
        degraded: u32,
        human: u32,
        fire: u32,
        fraction_pct: u32,
        feedback_pct: u32,
        recovery_bp: u32,
        horizon: u32,
    ) -> ParameterSet {
        ParameterSet::builder(intact as f64, horizon)
            .initial_degraded(degraded as f64)
            .human_conversion(human as f64)
            .fire_pulse(fire as f64, fraction_pct as f64 / 100.0)
            .vulnerability_feedback(feedback_pct as f64 / 100.0)
            .recovery(recovery_bp as f64 / 10_000.0)
            .regime_shift(horizon / 3, 1.3)
            .el_nino([1, 2, horizon / 2], 1.2)
            .build()
            .expect("test: generated params are valid")
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_stocks_non_negative_and_total_non_increasing(
            intact in 1_000u32..5_000_000,
            degraded in 0u32..500_000,
            human in 0u32..200_000,
            fire in 0u32..100_000,
            fraction_pct in 0u32..101,
            feedback_pct in 0u32..500,
            recovery_bp in 0u32..1_000,
            horizon in 1u32..200
        ) {
            let p = scenario(intact, degraded, human, fire, fraction_pct, feedback_pct, recovery_bp, horizon);
            let series = simulate(&p).expect("test: simulation should succeed");

            prop_assert_eq!(series.len(), horizon as usize + 1);
            let mut previous: Option<YearState> = None;
            for (i, state) in series.iter().enumerate() {
                prop_assert_eq!(state.year, i as u32);
                prop_assert!(state.intact_ha >= 0.0 && state.degraded_ha >= 0.0);
                prop_assert!(state.is_finite());
                if let Some(prev) = previous {
                    prop_assert!(state.total_ha() <= prev.total_ha());
                }
                previous = Some(*state);
            }
        }

        #[test]
        fn prop_area_ledger_stays_balanced(
            intact in 1_000u32..5_000_000,
            human in 0u32..200_000,
            fire in 0u32..100_000,
            fraction_pct in 0u32..101,
            feedback_pct in 0u32..500,
            recovery_bp in 0u32..1_000,
            horizon in 1u32..150
        ) {
            let p = scenario(intact, 0, human, fire, fraction_pct, feedback_pct, recovery_bp, horizon);
            let mut sim = ForestSimulation::from_parameters(p).expect("test: valid params");
            while sim.step_core().expect("test: step should succeed").is_some() {}
            prop_assert_eq!(sim.ledger().violations, 0);
        }

        #[test]
        fn prop_zero_rates_hold_stocks_constant(
            intact in 1u32..10_000_000,
            degraded in 0u32..1_000_000,
            horizon in 1u32..100
        ) {
            let p = ParameterSet::builder(intact as f64, horizon)
                .initial_degraded(degraded as f64)
                .build()
                .expect("test: valid params");
            let series = simulate(&p).expect("test: simulation should succeed");
            for state in &series {
                prop_assert_eq!(state.intact_ha, intact as f64);
                prop_assert_eq!(state.degraded_ha, degraded as f64);
            }
        }

        #[test]
        fn prop_crossing_year_is_first_at_or_below(
            steps in proptest::collection::vec(0u32..2_000, 1..120),
            threshold_pct in 1u32..101
        ) {
            let mut total = 100_000.0;
            let mut states = vec![YearState::new(0, total, 0.0)];
            for (i, step) in steps.iter().enumerate() {
                total = (total - *step as f64).max(0.0);
                states.push(YearState::new(i as u32 + 1, total, 0.0));
            }
            let series = TimeSeries::from_states(2025, states).expect("test: valid series");
            let threshold = threshold_pct as f64 / 100.0;
            let result = detect_thresholds(&series, &[threshold]).expect("test: valid thresholds")[0];

            let initial = series.initial_total();
            match result.crossing_year {
                Some(year) => {
                    for state in series.iter().take_while(|s| s.year < year) {
                        prop_assert!(state.total_ha() / initial > threshold);
                    }
                    let hit = series.get(year).expect("test: crossing year in series");
                    prop_assert!(hit.total_ha() / initial <= threshold);
                }
                None => {
                    for state in &series {
                        prop_assert!(state.total_ha() / initial > threshold);
                    }
                }
            }
        }

        #[test]
        fn prop_identical_inputs_identical_series(
            human in 0u32..200_000,
            fire in 0u32..100_000,
            feedback_pct in 0u32..500
        ) {
            let p = scenario(3_000_000, 10_000, human, fire, 60, feedback_pct, 100, 80);
            let a = simulate(&p).expect("test: simulation should succeed");
            let b = simulate(&p).expect("test: simulation should succeed");
            prop_assert_eq!(a, b);
        }
    }
}
