// Per-Year JSONL Time Series Recorder
// Outputs one JSON line per simulated year for charting outside the engine

use serde::Serialize;
use forest_engine::{TimeSeries, YearState};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct YearSnapshot {
    pub year: u32,
    pub calendar_year: i64,
    pub intact_ha: f64,
    pub degraded_ha: f64,
    pub total_ha: f64,
    pub deforested_ha: f64,
    pub degraded_pct: f64,
}

impl YearSnapshot {
    pub fn from_state(state: &YearState, start_year: i32, initial_total: f64) -> Self {
        let total = state.total_ha();
        Self {
            year: state.year,
            calendar_year: start_year as i64 + state.year as i64,
            intact_ha: state.intact_ha,
            degraded_ha: state.degraded_ha,
            total_ha: total,
            deforested_ha: (initial_total - total).max(0.0),
            degraded_pct: state.degraded_ha / total.max(1.0) * 100.0,
        }
    }
}

/// File-name stem for a scenario's series: its position plus the name with
/// anything outside `[A-Za-z0-9_-]` replaced, so names from a config file
/// cannot escape the output directory.
pub fn file_stem(index: usize, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{:02}-{}", index, safe)
}

/// Snapshots of one scenario's series, written as JSONL
pub struct SeriesRecorder {
    snapshots: Vec<YearSnapshot>,
}

impl SeriesRecorder {
    pub fn from_series(series: &TimeSeries) -> Self {
        let initial = series.initial_total();
        let start = series.start_year();
        Self {
            snapshots: series.iter().map(|s| YearSnapshot::from_state(s, start, initial)).collect(),
        }
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
