//! Config loading, run bookkeeping and initial-state construction shared by
//! the `orbit_cli` runner and its tests.

mod metrics_writer;
mod overrides;
mod run_dir;

pub use metrics_writer::{MetricsFileWriter, MAX_ROWS_PER_FILE};
pub use overrides::{apply_overrides, parse_override, VALID_KEYS};
pub use run_dir::{create_run_dir, generate_run_id, write_run_info, RunInfo};

use anyhow::{bail, Context, Result};
use orbit_control::DesignTargets;
use orbit_core::{initialize_thermal_state, FleetSpec, RiskMode, ThermalState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "fleet.json";

/// One simulated fleet segment plus the run parameters that drive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub config_version: String,
    pub fleet: FleetSpec,
    #[serde(default = "default_start_year")]
    pub start_year: f64,
    #[serde(default = "default_dt_hours")]
    pub dt_hours: f64,
    #[serde(default)]
    pub risk_mode: RiskMode,
    #[serde(default)]
    pub auto_design_mode: bool,
    #[serde(default)]
    pub design_targets: DesignTargets,
}

fn default_start_year() -> f64 {
    2025.0
}

fn default_dt_hours() -> f64 {
    orbit_core::constants::HOURS_PER_YEAR
}

pub fn load_config(config_dir: &str) -> Result<SimConfig> {
    let path = Path::new(config_dir).join(CONFIG_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: SimConfig =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Rejects configs the integrator would silently sanitize: non-finite or
/// negative quantities, fractions outside `[0, 1]`, and empty timesteps.
pub fn validate_config(config: &SimConfig) -> Result<()> {
    let fleet = &config.fleet;
    for (name, value) in [
        ("power_per_a_kw", fleet.power_per_a_kw),
        ("power_per_b_kw", fleet.power_per_b_kw),
        ("compute_per_a_pflops", fleet.compute_per_a_pflops),
        ("compute_per_b_pflops", fleet.compute_per_b_pflops),
        ("radiator_area_per_a_m2", fleet.radiator_area_per_a_m2),
        ("radiator_area_per_b_m2", fleet.radiator_area_per_b_m2),
        ("failure_rate", fleet.health.failure_rate),
        (
            "maintenance_capacity_fraction",
            fleet.health.maintenance_capacity_fraction,
        ),
        (
            "manufacturing_rate_pods_per_year",
            fleet.health.manufacturing_rate_pods_per_year,
        ),
        ("design_targets.compute_pflops", config.design_targets.compute_pflops),
    ] {
        ensure_non_negative(name, value)?;
    }

    for (name, value) in [
        ("design_targets.radiator_area_m2", config.design_targets.radiator_area_m2),
        ("design_targets.backhaul_tbps", config.design_targets.backhaul_tbps),
        (
            "design_targets.maintenance_capacity_pods",
            config.design_targets.maintenance_capacity_pods,
        ),
    ] {
        if let Some(value) = value {
            ensure_non_negative(name, value)?;
        }
    }

    let env = &fleet.environment;
    for (name, value) in [
        ("emissivity", env.emissivity),
        ("eclipse_fraction", env.eclipse_fraction),
        ("shadowing_loss", env.shadowing_loss),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("{name} must be within [0, 1], got {value}");
        }
    }

    let min_temp = -orbit_core::constants::KELVIN_OFFSET;
    if !env.initial_temp_c.is_finite() || env.initial_temp_c < min_temp {
        bail!(
            "initial_temp_c must be a finite temperature above {min_temp} C, got {}",
            env.initial_temp_c
        );
    }
    if !config.start_year.is_finite() {
        bail!("start_year must be finite, got {}", config.start_year);
    }
    if !config.dt_hours.is_finite() || config.dt_hours <= 0.0 {
        bail!("dt_hours must be a positive number, got {}", config.dt_hours);
    }
    Ok(())
}

fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{name} must be a finite non-negative number, got {value}");
    }
    Ok(())
}

/// Initializes the configured segment at `start_year` and carries the
/// auto-design settings onto the state.
pub fn build_initial_state(config: &SimConfig, rng: &mut impl Rng) -> ThermalState {
    let state = initialize_thermal_state(&config.fleet, config.start_year, rng);
    ThermalState {
        auto_design_mode: config.auto_design_mode,
        risk_mode: config.risk_mode,
        ..state
    }
}

pub fn load_state(path: &Path) -> Result<ThermalState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file: {}", path.display()))?;
    let state = serde_json::from_str(&json)
        .with_context(|| format!("parsing state file: {}", path.display()))?;
    Ok(state)
}

pub fn save_state(path: &Path, state: &ThermalState) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, state)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
