//! Snapshot metrics computed from `ThermalState`.
//!
//! `compute_metrics(&ThermalState) -> MetricsSnapshot` flattens one state
//! into a single row for time-series analysis. No state mutation, no IO.

use serde::Serialize;

use crate::constants::FLOPS_PER_PFLOP;
use crate::{Constraint, ThermalState};

/// Current schema version. Bump when fields are added/removed/reordered.
pub const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub year: f64,
    pub metrics_version: u32,

    // Fleet
    pub total_pods: f64,
    pub power_total_kw: f64,
    pub lost_fraction: f64,
    pub degraded_pods: f64,
    pub global_efficiency: f64,

    // Thermal
    pub temp_core_c: f64,
    pub temp_radiator_c: f64,
    pub heat_gen_kw: f64,
    pub heat_reject_kw: f64,
    pub radiator_capacity_kw: f64,
    pub active_cooling_kw: f64,
    pub radiator_burnout_factor: f64,
    pub emissivity: f64,
    pub thermal_excursions: u64,

    // Compute, in PFLOPs
    pub compute_raw_pflops: f64,
    pub compute_effective_pflops: f64,
    pub compute_exportable_pflops: f64,
    pub sustained_compute_pflops: f64,

    // Utilization
    pub power_utilization_pct: f64,
    pub radiator_utilization_pct: f64,
    pub backhaul_utilization_pct: f64,
    pub manufacturing_utilization_pct: f64,
    pub maintenance_utilization_pct: f64,
    pub dominant_constraint: Constraint,

    // Failure modes
    pub radiator_damage_fraction: f64,
    pub pump_failed: bool,
    pub coolant_frozen: bool,
    pub radiation_dose: f64,
}

pub fn compute_metrics(state: &ThermalState) -> MetricsSnapshot {
    MetricsSnapshot {
        year: state.year,
        metrics_version: METRICS_VERSION,
        total_pods: state.total_pods,
        power_total_kw: state.power_total_kw,
        lost_fraction: state.lost_fraction,
        degraded_pods: state.degraded_pods,
        global_efficiency: state.global_efficiency,
        temp_core_c: state.temp_core_c,
        temp_radiator_c: state.temp_radiator_c,
        heat_gen_kw: state.heat_gen_kw,
        heat_reject_kw: state.heat_reject_kw,
        radiator_capacity_kw: state.radiator_capacity_kw,
        active_cooling_kw: state.active_cooling_kw,
        radiator_burnout_factor: state.radiator_burnout_factor,
        emissivity: state.emissivity,
        thermal_excursions: state.cumulative_thermal_excursions,
        compute_raw_pflops: state.compute_raw_flops / FLOPS_PER_PFLOP,
        compute_effective_pflops: state.compute_effective_flops / FLOPS_PER_PFLOP,
        compute_exportable_pflops: state.compute_exportable_flops / FLOPS_PER_PFLOP,
        sustained_compute_pflops: state.sustained_compute_flops / FLOPS_PER_PFLOP,
        power_utilization_pct: state.power_utilization_percent,
        radiator_utilization_pct: state.radiator_utilization_percent,
        backhaul_utilization_pct: state.backhaul_utilization_percent,
        manufacturing_utilization_pct: state.manufacturing_utilization_percent,
        maintenance_utilization_pct: state.maintenance_utilization_percent,
        dominant_constraint: state.dominant_constraint,
        radiator_damage_fraction: state.radiator_damage_fraction(),
        pump_failed: state.pump_failure_active(),
        coolant_frozen: state.coolant_frozen(),
        radiation_dose: state.cumulative_radiation_dose,
    }
}
