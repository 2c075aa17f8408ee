// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Forest Cover Simulation Suite - Error Types

use thiserror::Error;

/// Result alias used by every fallible engine operation.
pub type Result<T> = std::result::Result<T, ForestError>;

/// Errors raised by the parameter validator, the engine, the threshold
/// detector and the comparator. All of them are local to one scenario.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForestError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("numeric instability at year {year}: intact={intact_ha}, degraded={degraded_ha}")]
    NumericInstability {
        year: u32,
        intact_ha: f64,
        degraded_ha: f64,
    },

    #[error("scenario `{name}` has horizon {found}, expected {expected} (use truncation to align)")]
    IncomparableScenarios {
        name: String,
        expected: u32,
        found: u32,
    },

    #[error("scenario `{name}` failed: {source}")]
    ScenarioFailed {
        name: String,
        #[source]
        source: Box<ForestError>,
    },
}

impl ForestError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// The field named by an `InvalidParameter`, looking through comparator context.
    pub fn offending_field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(*field),
            Self::ScenarioFailed { source, .. } => source.offending_field(),
            _ => None,
        }
    }
}
