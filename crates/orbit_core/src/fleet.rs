//! Building a `ThermalState` from a two-class fleet spec.

use rand::Rng;

use crate::constants::{
    BACKHAUL_TBPS_PER_SATELLITE, CLASS_A_THERMAL_MASS_J_PER_C, CLASS_B_THERMAL_MASS_J_PER_C,
    FLOPS_PER_PFLOP, WARM_UP_DT_HOURS,
};
use crate::thermal::{non_negative, unit_fraction};
use crate::{Constraint, FailureModes, FleetSpec, ThermalState};

/// Lumped thermal mass of the segment. Depends on satellite counts only,
/// never on power or compute.
pub fn fleet_thermal_mass_j_per_c(satellite_count_a: u32, satellite_count_b: u32) -> f64 {
    f64::from(satellite_count_a) * CLASS_A_THERMAL_MASS_J_PER_C
        + f64::from(satellite_count_b) * CLASS_B_THERMAL_MASS_J_PER_C
}

/// Aggregate the two satellite classes into a fresh state without running
/// any tick. Derived fields are zero until the first update.
pub fn seed_thermal_state(spec: &FleetSpec, year: f64) -> ThermalState {
    let count_a = f64::from(spec.satellite_count_a);
    let count_b = f64::from(spec.satellite_count_b);
    let total_pods = count_a + count_b;
    let env = &spec.environment;
    let health = &spec.health;

    ThermalState {
        year,
        total_pods,
        power_total_kw: non_negative(
            count_a * spec.power_per_a_kw + count_b * spec.power_per_b_kw,
        ),
        compute_raw_flops: non_negative(
            (count_a * spec.compute_per_a_pflops + count_b * spec.compute_per_b_pflops)
                * FLOPS_PER_PFLOP,
        ),
        temp_core_c: env.initial_temp_c,
        temp_radiator_c: env.initial_temp_c,
        thermal_mass_j_per_c: fleet_thermal_mass_j_per_c(
            spec.satellite_count_a,
            spec.satellite_count_b,
        ),
        radiator_area_m2: non_negative(
            count_a * spec.radiator_area_per_a_m2 + count_b * spec.radiator_area_per_b_m2,
        ),
        emissivity: unit_fraction(env.emissivity),
        eclipse_fraction: unit_fraction(env.eclipse_fraction),
        shadowing_loss: unit_fraction(env.shadowing_loss),
        radiator_burnout_factor: 1.0,
        backhaul_tbps: total_pods * BACKHAUL_TBPS_PER_SATELLITE,
        manufacturing_rate_pods_per_year: non_negative(health.manufacturing_rate_pods_per_year),
        maintenance_capacity_pods: non_negative(health.maintenance_capacity_fraction * total_pods),
        failure_rate: non_negative(health.failure_rate),
        degraded_pods: 0.0,
        global_efficiency: 1.0,
        failure_modes: FailureModes::default(),
        cumulative_radiation_dose: 0.0,
        cumulative_thermal_excursions: 0,
        lost_fraction: 0.0,
        auto_design_mode: false,
        risk_mode: crate::RiskMode::default(),
        heat_gen_kw: 0.0,
        heat_reject_kw: 0.0,
        radiator_capacity_kw: 0.0,
        net_heat_flow_kw: 0.0,
        active_cooling_kw: 0.0,
        effective_failure_rate: 0.0,
        compute_effective_flops: 0.0,
        compute_exportable_flops: 0.0,
        sustained_compute_flops: 0.0,
        survival_fraction: 1.0,
        power_utilization_percent: 0.0,
        radiator_utilization_percent: 0.0,
        backhaul_utilization_percent: 0.0,
        manufacturing_utilization_percent: 0.0,
        maintenance_utilization_percent: 0.0,
        dominant_constraint: Constraint::Unconstrained,
    }
}

/// Seed a state from `spec` and run one short warm-up tick so every derived
/// field is populated.
pub fn initialize_thermal_state(spec: &FleetSpec, year: f64, rng: &mut impl Rng) -> ThermalState {
    let seeded = seed_thermal_state(spec, year);
    crate::update_thermal_state(&seeded, WARM_UP_DT_HOURS, year, rng)
}
