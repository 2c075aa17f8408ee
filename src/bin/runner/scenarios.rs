// Scenario Presets: the V0.1, V0.2 and V0.3 scenarios of the Colombian Amazon model
// Each group shares a horizon so it can be compared without truncation

use forest_engine::{ParameterSet, Result};

// ─── Core Constants ─────────────────────────────────────────────────────────

/// IDEAM Amazon biome forest cover, reference year 2021 (ha).
pub const AMAZON_FOREST_HA: f64 = 39_011_117.0;

/// BAU human deforestation, 2020–2024 average (ha/year).
const D_BAU: f64 = 81_240.0;
/// Post-agreement peak, 2017–2018 average (ha/year).
const D_POST_PEAK: f64 = 141_161.0;

const POST_ACCORD_START: i32 = 2017;
const POST_ACCORD_MULT: f64 = 1.30;

const EL_NINO_YEARS: [i32; 4] = [2015, 2016, 2023, 2024];
const EL_NINO_MULT: f64 = 1.20;

/// V0.2 fire pulse years; 2017–2018 excluded to avoid double counting the regime shift.
const FIRE_YEARS: [i32; 2] = [2019, 2024];
const FIRE_EXTRA_HA: f64 = 15_000.0;

const FIRE_BASE_HA: f64 = 20_000.0;
const RECOVERY_RATE: f64 = 0.01;
const DEGRADED_CONVERSION_SHARE: f64 = 0.20;

// ─── Preset Configuration ───────────────────────────────────────────────────

pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    pub group: &'static str,
    pub build: fn() -> Result<ParameterSet>,
}

// ─── V0.1: single stock, constant deforestation ─────────────────────────────

fn v01(rate: f64) -> Result<ParameterSet> {
    ParameterSet::builder(AMAZON_FOREST_HA, 150)
        .start_year(2025)
        .human_conversion(rate)
        .baseline_total(AMAZON_FOREST_HA)
        .build()
}

fn v01_bau() -> Result<ParameterSet> { v01(D_BAU) }
fn v01_post_peak() -> Result<ParameterSet> { v01(D_POST_PEAK) }

// ─── V0.2: channelized shocks, fire as direct loss ──────────────────────────

fn v02(post_accord: bool, fires: bool, el_nino: bool) -> Result<ParameterSet> {
    let mut b = ParameterSet::builder(AMAZON_FOREST_HA, 200)
        .start_year(2000)
        .human_conversion(D_BAU)
        .baseline_total(AMAZON_FOREST_HA);
    if post_accord {
        b = b.regime_shift_from_calendar(POST_ACCORD_START, POST_ACCORD_MULT);
    }
    if fires {
        b = b.fire_pulse(FIRE_EXTRA_HA, 0.0).fire_pulse_calendar_years(FIRE_YEARS);
    }
    if el_nino {
        b = b.el_nino_calendar_years(EL_NINO_YEARS, EL_NINO_MULT);
    }
    b.build()
}

fn v02_bau() -> Result<ParameterSet> { v02(false, false, false) }
fn v02_post_accord() -> Result<ParameterSet> { v02(true, false, false) }
fn v02_fires() -> Result<ParameterSet> { v02(true, true, false) }
fn v02_fires_el_nino() -> Result<ParameterSet> { v02(true, true, true) }

// ─── V0.3: intact/degraded with feedback and recovery ───────────────────────

fn v03(climate_stress: f64, enforcement: f64, alpha: f64) -> Result<ParameterSet> {
    ParameterSet::builder(AMAZON_FOREST_HA, 200)
        .start_year(2000)
        .human_conversion(D_BAU)
        .enforcement(enforcement)
        .regime_shift_from_calendar(POST_ACCORD_START, POST_ACCORD_MULT)
        .degraded_conversion_share(DEGRADED_CONVERSION_SHARE)
        .fire_pulse(FIRE_BASE_HA, 1.0)
        .climate_stress(climate_stress)
        .vulnerability_feedback(alpha)
        .el_nino_calendar_years(EL_NINO_YEARS, EL_NINO_MULT)
        .recovery(RECOVERY_RATE)
        .baseline_total(AMAZON_FOREST_HA)
        .build()
}

fn v03_base() -> Result<ParameterSet> { v03(1.0, 1.0, 2.0) }
fn v03_enforcement() -> Result<ParameterSet> { v03(1.0, 0.7, 2.0) }
fn v03_climate_stress() -> Result<ParameterSet> { v03(1.7, 1.0, 4.0) }

// ─── Preset Catalog ─────────────────────────────────────────────────────────

pub fn presets() -> Vec<Preset> {
    vec![
        Preset { name: "V01_BAU", label: "BAU (2020–2024 avg)", group: "v0.1", build: v01_bau },
        Preset { name: "V01_POST_PEAK", label: "Post-Agreement Peak (2017–2018 avg)", group: "v0.1",
            build: v01_post_peak },

        Preset { name: "V02_BAU", label: "BAU (human only, no shocks)", group: "v0.2", build: v02_bau },
        Preset { name: "V02_POST_ACCORD", label: "Post-accord (human regime shift)", group: "v0.2",
            build: v02_post_accord },
        Preset { name: "V02_FIRES", label: "Post-accord + fires", group: "v0.2", build: v02_fires },
        Preset { name: "V02_FIRES_EL_NINO", label: "Post-accord + fires + El Niño", group: "v0.2",
            build: v02_fires_el_nino },

        Preset { name: "V03_BASE", label: "Base (post-accord, baseline climate)", group: "v0.3",
            build: v03_base },
        Preset { name: "V03_ENFORCEMENT", label: "Alt 1: Enforcement", group: "v0.3",
            build: v03_enforcement },
        Preset { name: "V03_CLIMATE_STRESS", label: "Alt 2: Climate stress", group: "v0.3",
            build: v03_climate_stress },
    ]
}
