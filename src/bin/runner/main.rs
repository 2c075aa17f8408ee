// Forest Scenario Runner v0.3.0: Colombian Amazon intact/degraded projections
// Runs preset or file-defined scenarios, prints threshold crossings, writes JSON
//
// Usage:
//   cargo run --release --bin runner                          # All presets, grouped by model version
//   cargo run --release --bin runner -- V03                   # Filter by name, label or group
//   cargo run --release --bin runner -- --config runs.json    # Scenarios from a JSON file
//   cargo run --release --bin runner -- --thresholds 0.8,0.7  # Custom remaining-cover fractions
//   cargo run --release --bin runner -- --truncate            # Align mismatched horizons
//   cargo run --release --bin runner -- --parallel            # Run each group on the rayon pool
//   cargo run --release --bin runner -- --time-series         # Enable JSONL output

mod report;
mod scenarios;
mod time_series;

use forest_engine::{
    compare_with, AlignPolicy, ComparisonConfig, NamedScenario, ParameterSet, ScenarioComparison,
    DEFAULT_THRESHOLDS,
};
use report::*;
use scenarios::presets;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use time_series::{file_stem, SeriesRecorder};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    config: Option<PathBuf>,
    thresholds: Vec<f64>,
    truncate: bool,
    parallel: bool,
    time_series: bool,
    out: PathBuf,
    filter: Option<String>,
}

fn parse_thresholds(raw: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    raw.split(',').map(|s| s.trim().parse::<f64>()).collect()
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        config: None,
        thresholds: DEFAULT_THRESHOLDS.to_vec(),
        truncate: false,
        parallel: false,
        time_series: false,
        out: PathBuf::from("forest-results"),
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config needs a file path")?;
                cli.config = Some(PathBuf::from(path));
            }
            "--thresholds" => {
                i += 1;
                let raw = args.get(i).ok_or("--thresholds needs a comma-separated list")?;
                cli.thresholds = parse_thresholds(raw)
                    .map_err(|e| format!("bad --thresholds {:?}: {}", raw, e))?;
            }
            "--out" => {
                i += 1;
                let dir = args.get(i).ok_or("--out needs a directory")?;
                cli.out = PathBuf::from(dir);
            }
            "--truncate" => cli.truncate = true,
            "--parallel" => cli.parallel = true,
            "--time-series" => cli.time_series = true,
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    Ok(cli)
}

// ─── Scenario Loading ───────────────────────────────────────────────────────

type Group = (String, Vec<(String, ParameterSet)>);

fn matches(filter: &Option<String>, fields: &[&str]) -> bool {
    match filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            fields.iter().any(|s| s.to_lowercase().contains(&f_lower))
        }
        None => true,
    }
}

fn load_config(path: &Path, filter: &Option<String>) -> Result<Vec<Group>, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let named: Vec<NamedScenario> = serde_json::from_str(&raw)?;
    let scenarios = named
        .into_iter()
        .filter(|s| matches(filter, &[s.name.as_str()]))
        .map(Into::into)
        .collect();
    Ok(vec![("config".to_string(), scenarios)])
}

fn load_presets(filter: &Option<String>) -> Result<Vec<Group>, Box<dyn Error>> {
    let mut groups: Vec<Group> = Vec::new();
    for preset in presets() {
        if !matches(filter, &[preset.name, preset.label, preset.group]) {
            continue;
        }
        let params = (preset.build)()?;
        match groups.iter_mut().find(|(g, _)| g == preset.group) {
            Some((_, list)) => list.push((preset.name.to_string(), params)),
            None => groups.push((preset.group.to_string(), vec![(preset.name.to_string(), params)])),
        }
    }
    Ok(groups)
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn fmt_crossing(calendar_year: Option<i64>) -> String {
    calendar_year.map_or_else(|| "never".to_string(), |y| y.to_string())
}

fn print_group(group: &GroupReport) {
    println!("\n  [{}] align={:?}", group.group, group.align);
    let header: Vec<String> = group
        .scenarios
        .first()
        .map(|s| s.thresholds.iter().map(|t| format!("{}%", t.threshold_fraction * 100.0)).collect())
        .unwrap_or_default();
    println!("  {:<24} {:>16} {:>14} {:>10}  {}",
        "Scenario", "Final total (ha)", "Degraded (ha)", "Peak deg%", header.join("  "));
    println!("  {}", "-".repeat(84));

    for s in &group.scenarios {
        let (total, degraded) = s
            .final_year
            .as_ref()
            .map_or((String::new(), String::new()), |f| (f.total_ha.to_string(), f.degraded_ha.to_string()));
        let crossings: Vec<String> = s.thresholds.iter().map(|t| fmt_crossing(t.calendar_year)).collect();
        println!("  {:<24} {:>16} {:>14} {:>9}%  {}",
            s.name, total, degraded, s.peak_degraded_pct, crossings.join("  "));
    }

    if let Some(cmp) = &group.comparison {
        for d in cmp.deltas.iter().skip(1) {
            let shifts: Vec<String> = d
                .threshold_shift_years
                .iter()
                .map(|s| s.map_or_else(|| "n/a".to_string(), |y| format!("{:+}y", y)))
                .collect();
            println!("    {:<22} vs {}: total gap {:>12.0} ha  shifts {}",
                d.name, cmp.baseline, d.final_total_gap_ha, shifts.join(" "));
        }
    }
}

fn write_report(out: &Path, report: &ForestReport) -> Result<PathBuf, Box<dyn Error>> {
    std::fs::create_dir_all(out)?;
    let path = out.join(format!("forest-report-{}.json", report.timestamp));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: CliArgs) -> Result<bool, Box<dyn Error>> {
    let groups = match &cli.config {
        Some(path) => load_config(path, &cli.filter)?,
        None => load_presets(&cli.filter)?,
    };
    let groups: Vec<Group> = groups.into_iter().filter(|(_, s)| !s.is_empty()).collect();
    if groups.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        return Ok(false);
    }

    let config = ComparisonConfig {
        align: if cli.truncate { AlignPolicy::TruncateToShortest } else { AlignPolicy::Strict },
        thresholds: cli.thresholds.clone(),
        parallel: cli.parallel,
    };

    println!("\n  Forest Scenario Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  Thresholds: {:?} | Groups: {} | Parallel: {}",
        config.thresholds, groups.len(), config.parallel);

    let suite_start = Instant::now();
    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);
    let mut group_reports = Vec::new();

    for (group, scenarios) in &groups {
        let runs = compare_with(scenarios, &config)?;
        info!(group = %group, scenarios = runs.len(), "group compared");

        if cli.time_series {
            let dir = cli.out.join("time-series");
            for (index, (name, run)) in runs.iter().enumerate() {
                let recorder = SeriesRecorder::from_series(&run.series);
                let path = dir.join(format!("{}-{}.jsonl", file_stem(index, name), timestamp));
                recorder.write_jsonl(&path)?;
                info!(scenario = %name, years = recorder.len(), path = %path.display(), "time series written");
            }
        }

        let report = GroupReport {
            group: group.clone(),
            align: config.align,
            scenarios: runs.iter().map(|(n, r)| ScenarioReport::from_run(n, r)).collect(),
            comparison: ScenarioComparison::against_baseline(&runs),
        };
        print_group(&report);
        group_reports.push(report);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let scenarios: usize = group_reports.iter().map(|g| g.scenarios.len()).sum();
    let fully_crossed = group_reports
        .iter()
        .flat_map(|g| &g.scenarios)
        .filter(|s| s.thresholds.iter().all(|t| t.crossing_year.is_some()))
        .count();

    println!("\n  Scenarios: {}  Crossed all thresholds: {}  Suite time: {:.2}s",
        scenarios, fully_crossed, suite_start.elapsed().as_secs_f64());

    let report = ForestReport {
        timestamp,
        version: env!("CARGO_PKG_VERSION"),
        thresholds: config.thresholds.clone(),
        summary: Summary { groups: group_reports.len(), scenarios, fully_crossed },
        groups: group_reports,
    };
    let path = write_report(&cli.out, &report)?;
    println!("  Results saved to: {}\n", path.display());
    Ok(true)
}

/// `RUST_LOG` plus info-level events from the engine and this binary.
fn log_filter() -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    Ok(EnvFilter::from_default_env()
        .add_directive("forest_engine=info".parse()?)
        .add_directive("runner=info".parse()?))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let outcome = parse_args().map_err(Box::<dyn Error>::from).and_then(run);
    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_enables_runner_events() {
        let filter = log_filter().expect("test: directives parse").to_string();
        assert!(filter.contains("runner=info"), "{filter}");
        assert!(filter.contains("forest_engine=info"), "{filter}");
    }

    #[test]
    fn thresholds_parse_from_comma_list() {
        assert_eq!(parse_thresholds("0.8, 0.75").expect("test: valid list"), vec![0.8, 0.75]);
        assert!(parse_thresholds("0.8,abc").is_err());
    }
}
