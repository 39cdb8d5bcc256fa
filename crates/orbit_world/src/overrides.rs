use anyhow::{anyhow, bail, Context, Result};
use orbit_core::RiskMode;
use std::collections::HashMap;

use crate::SimConfig;

pub const VALID_KEYS: &[&str] = &[
    "start_year",
    "dt_hours",
    "risk_mode",
    "auto_design_mode",
    "satellite_count_a",
    "satellite_count_b",
    "power_per_a_kw",
    "power_per_b_kw",
    "compute_per_a_pflops",
    "compute_per_b_pflops",
    "radiator_area_per_a_m2",
    "radiator_area_per_b_m2",
    "emissivity",
    "eclipse_fraction",
    "shadowing_loss",
    "initial_temp_c",
    "failure_rate",
    "maintenance_capacity_fraction",
    "manufacturing_rate_pods_per_year",
    "target_compute_pflops",
    "target_radiator_area_m2",
    "target_backhaul_tbps",
    "target_maintenance_capacity_pods",
];

pub fn apply_overrides(
    config: &mut SimConfig,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    let fleet = &mut config.fleet;
    let env = &mut fleet.environment;
    let health = &mut fleet.health;
    let targets = &mut config.design_targets;
    for (key, value) in overrides {
        match key.as_str() {
            "start_year" => config.start_year = as_f64(key, value)?,
            "dt_hours" => config.dt_hours = as_f64(key, value)?,
            "risk_mode" => config.risk_mode = as_risk_mode(key, value)?,
            "auto_design_mode" => config.auto_design_mode = as_bool(key, value)?,
            "satellite_count_a" => fleet.satellite_count_a = as_u32(key, value)?,
            "satellite_count_b" => fleet.satellite_count_b = as_u32(key, value)?,
            "power_per_a_kw" => fleet.power_per_a_kw = as_f64(key, value)?,
            "power_per_b_kw" => fleet.power_per_b_kw = as_f64(key, value)?,
            "compute_per_a_pflops" => fleet.compute_per_a_pflops = as_f64(key, value)?,
            "compute_per_b_pflops" => fleet.compute_per_b_pflops = as_f64(key, value)?,
            "radiator_area_per_a_m2" => fleet.radiator_area_per_a_m2 = as_f64(key, value)?,
            "radiator_area_per_b_m2" => fleet.radiator_area_per_b_m2 = as_f64(key, value)?,
            "emissivity" => env.emissivity = as_f64(key, value)?,
            "eclipse_fraction" => env.eclipse_fraction = as_f64(key, value)?,
            "shadowing_loss" => env.shadowing_loss = as_f64(key, value)?,
            "initial_temp_c" => env.initial_temp_c = as_f64(key, value)?,
            "failure_rate" => health.failure_rate = as_f64(key, value)?,
            "maintenance_capacity_fraction" => {
                health.maintenance_capacity_fraction = as_f64(key, value)?;
            }
            "manufacturing_rate_pods_per_year" => {
                health.manufacturing_rate_pods_per_year = as_f64(key, value)?;
            }
            "target_compute_pflops" => targets.compute_pflops = as_f64(key, value)?,
            "target_radiator_area_m2" => targets.radiator_area_m2 = as_optional_f64(key, value)?,
            "target_backhaul_tbps" => targets.backhaul_tbps = as_optional_f64(key, value)?,
            "target_maintenance_capacity_pods" => {
                targets.maintenance_capacity_pods = as_optional_f64(key, value)?;
            }
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

/// Splits a `key=value` command-line override. The value is read as JSON
/// when it parses, otherwise as a bare string (`risk_mode=YOLO`).
pub fn parse_override(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("override '{raw}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("override '{raw}': empty key");
    }
    let value = value.trim();
    let parsed = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_optional_f64(key: &str, value: &serde_json::Value) -> Result<Option<f64>> {
    if value.is_null() {
        return Ok(None);
    }
    as_f64(key, value).map(Some)
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = value.as_u64().ok_or_else(|| {
        anyhow!("override '{key}': expected a positive integer, got {value}")
    })?;
    u32::try_from(val).map_err(|_| anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_bool(key: &str, value: &serde_json::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| anyhow!("override '{key}': expected true or false, got {value}"))
}

fn as_risk_mode(key: &str, value: &serde_json::Value) -> Result<RiskMode> {
    let normalized = value
        .as_str()
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| anyhow!("override '{key}': expected SAFE, AGGRESSIVE or YOLO"))?;
    serde_json::from_value(serde_json::Value::String(normalized))
        .with_context(|| format!("override '{key}': unknown risk mode {value}"))
}
