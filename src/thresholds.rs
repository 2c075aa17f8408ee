// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Threshold Detector

//! First-crossing detection for remaining-forest fractions.
//!
//! A threshold `f` is crossed in the first year where
//! `total_t / total_0 <= f`. All thresholds are resolved in one pass over the
//! series.

use crate::error::{ForestError, Result};
use crate::types::{ThresholdResult, TimeSeries};

/// Precautionary thresholds: 20% and 25% cumulative loss.
pub const DEFAULT_THRESHOLDS: [f64; 2] = [0.80, 0.75];

/// Find the first crossing year of each threshold, in the caller's order.
pub fn detect_thresholds(series: &TimeSeries, thresholds: &[f64]) -> Result<Vec<ThresholdResult>> {
    for &threshold in thresholds {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ForestError::invalid(
                "thresholds",
                format!("threshold fractions must be in (0, 1], got {threshold}"),
            ));
        }
    }

    let mut results: Vec<ThresholdResult> = thresholds
        .iter()
        .map(|&threshold_fraction| ThresholdResult { threshold_fraction, crossing_year: None })
        .collect();

    let initial = series.initial_total();
    let mut pending = results.len();

    for state in series {
        if pending == 0 {
            break;
        }
        let fraction = if initial > 0.0 { state.total_ha() / initial } else { 0.0 };
        for result in results.iter_mut().filter(|r| r.crossing_year.is_none()) {
            if fraction <= result.threshold_fraction {
                result.crossing_year = Some(state.year);
                pending -= 1;
            }
        }
    }

    Ok(results)
}
