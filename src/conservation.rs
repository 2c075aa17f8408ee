// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Area Accounting

use serde::{Deserialize, Serialize};

use crate::flows::YearFlows;
use crate::types::YearState;

/// Relative tolerance: imbalance below this share of the initial area is
/// floating-point noise.
const TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Free function
// ---------------------------------------------------------------------------

/// Compute the area imbalance of a run.
///
/// In a closed two-stock system:
///   initial_total = current_total + cumulative_removed
///
/// Recovery and degradation only move area between stocks, so they never
/// appear here. Returns the absolute difference in hectares.
pub fn compute_imbalance(initial_total: f64, current_total: f64, cumulative_removed: f64) -> f64 {
    (initial_total - (current_total + cumulative_removed)).abs()
}

// ---------------------------------------------------------------------------
// Check result
// ---------------------------------------------------------------------------

/// Outcome of one per-year accounting check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LedgerCheck {
    pub balanced: bool,
    /// Absolute imbalance in hectares.
    pub error: f64,
}

// ---------------------------------------------------------------------------
// Area ledger
// ---------------------------------------------------------------------------

/// Tracks the area that has left the forest and verifies each year that
/// nothing was created or lost outside the modeled flows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AreaLedger {
    pub initial_total: f64,
    pub cumulative_removed: f64,
    /// Largest imbalance seen so far (ha).
    pub max_error: f64,
    /// Number of years whose check failed.
    pub violations: u32,
}

impl AreaLedger {
    pub fn new(initial_total: f64) -> Self {
        Self {
            initial_total,
            cumulative_removed: 0.0,
            max_error: 0.0,
            violations: 0,
        }
    }

    /// Book one year's flows and verify the resulting state.
    pub fn record_step(&mut self, flows: &YearFlows, state: &YearState) -> LedgerCheck {
        self.cumulative_removed += flows.removed_ha();
        let error = compute_imbalance(self.initial_total, state.total_ha(), self.cumulative_removed);
        let balanced = error <= TOLERANCE * self.initial_total.max(1.0);

        self.max_error = self.max_error.max(error);
        if !balanced {
            self.violations += 1;
        }

        LedgerCheck { balanced, error }
    }

    /// Area the forest should hold given everything removed so far.
    pub fn expected_total(&self) -> f64 {
        self.initial_total - self.cumulative_removed
    }

    pub fn is_balanced(&self) -> bool {
        self.violations == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
