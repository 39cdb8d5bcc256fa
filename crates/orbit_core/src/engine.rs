use rand::Rng;

use crate::constants::{
    ACTIVE_COOLING_EFFICIENCY, CAPACITY_EPSILON, DEFICIT_AMPLIFICATION, DEFICIT_EXPONENT,
    DEFICIT_FAILURE_MULTIPLIER, ECLIPSE_OSCILLATION_AMPLITUDE_C, ECLIPSE_OSCILLATION_FREQUENCY,
    ECLIPSE_OSCILLATION_THRESHOLD, FLOPS_PER_TBPS, MAX_ACTIVE_COOLING_FRACTION, MAX_TEMP_C,
    MIN_TEMP_C, OVERDRIVE_BURNOUT_DECAY, OVERDRIVE_EMISSIVITY_DECAY, OVERDRIVE_FACTOR,
    OVERDRIVE_HEAT_MULTIPLIER, OVERDRIVE_LOAD_RATIO, PUMP_FAILURE_POWER_PENALTY,
    RADIATION_DOSE_PER_YEAR,
};
use crate::failure::{advance_failure_modes, FailureContext};
use crate::maintenance::{resolve_maintenance, MaintenanceInputs, MaintenanceOutcome};
use crate::thermal::{
    self, calculate_heat_rejection, finite_or, heat_generation_kw, heat_to_temp_delta_c,
    non_negative, unit_fraction, ThermalBand,
};
use crate::utilization::{derive_utilization, UtilizationInputs};
use crate::{Event, EventEnvelope, FailureModes, PumpState, ThermalState};

/// Advance a fleet segment by one tick of `dt_hours`.
///
/// Pure with respect to `state`: the argument is never mutated and a new
/// state is returned. Not idempotent, since failure dice are re-rolled and
/// cumulative counters advance on every call.
pub fn update_thermal_state(
    state: &ThermalState,
    dt_hours: f64,
    year: f64,
    rng: &mut impl Rng,
) -> ThermalState {
    let mut events = Vec::new();
    update_thermal_state_with_events(state, dt_hours, year, rng, &mut events)
}

/// Same as [`update_thermal_state`], also reporting failure-mode
/// transitions and catastrophic events.
///
/// Order of operations:
/// 1. Roll failure modes (radiator damage, pump, coolant).
/// 2. Heat generation and radiative rejection on the damaged radiator.
/// 3. Forward-Euler temperature update with overdrive amplification.
/// 4. Temperature-band and radiator-deficit throttles, thermal death.
/// 5. Maintenance debt loop.
/// 6. Sustained-compute gate and backhaul competition.
/// 7. Utilization metrics.
pub fn update_thermal_state_with_events(
    state: &ThermalState,
    dt_hours: f64,
    year: f64,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> ThermalState {
    let dt_hours = non_negative(dt_hours);
    let dt_years = thermal::dt_years(dt_hours);
    let inputs = TickInputs::sanitize(state);

    let failure_modes = advance_failure_modes(
        state.failure_modes,
        &FailureContext {
            year,
            total_pods: inputs.total_pods,
            dt_years,
            eclipse_fraction: inputs.eclipse_fraction,
            temp_radiator_c: inputs.temp_radiator_c,
        },
        rng,
        events,
    );

    let heat = resolve_heat_balance(&inputs, &failure_modes);
    if heat.overdrive {
        events.push(crate::emit(
            year,
            Event::RadiatorOverdrive {
                load_ratio: heat.load_ratio,
            },
        ));
    }

    let temps = integrate_temperature(&inputs, &heat, dt_hours, year);
    let compute = resolve_compute(state, &inputs, &heat, &temps, dt_years, year, events);

    let utilization = derive_utilization(&UtilizationInputs {
        heat_gen_kw: heat.heat_gen_kw,
        radiator_capacity_kw: heat.radiator_capacity_kw,
        thermal_throttle: compute.thermal_throttle,
        maintenance_ratio: compute.maintenance.ratio,
        compute_effective_flops: compute.effective_flops,
        compute_exportable_flops: compute.exportable_flops,
        sustained_compute_flops: compute.sustained_flops,
        backhaul_tbps: inputs.backhaul_tbps,
        global_efficiency: compute.maintenance.global_efficiency,
        lost_fraction: compute.lost_fraction,
        effective_failure_rate: compute.effective_failure_rate,
        total_pods: inputs.total_pods,
        manufacturing_rate_pods_per_year: inputs.manufacturing_rate_pods_per_year,
    });

    let (radiator_burnout_factor, emissivity) = if heat.overdrive {
        (
            inputs.radiator_burnout_factor * OVERDRIVE_BURNOUT_DECAY,
            inputs.emissivity * OVERDRIVE_EMISSIVITY_DECAY,
        )
    } else {
        (inputs.radiator_burnout_factor, inputs.emissivity)
    };
    let survival = compute.maintenance.survival_fraction;

    ThermalState {
        year,
        total_pods: inputs.total_pods,
        power_total_kw: inputs.power_total_kw * compute.surviving_share * survival,
        compute_raw_flops: inputs.compute_raw_flops * compute.surviving_share * survival,
        temp_core_c: temps.core_c,
        temp_radiator_c: temps.radiator_c,
        thermal_mass_j_per_c: state.thermal_mass_j_per_c,
        radiator_area_m2: inputs.radiator_area_m2 * compute.surviving_share,
        emissivity,
        eclipse_fraction: inputs.eclipse_fraction,
        shadowing_loss: inputs.shadowing_loss,
        radiator_burnout_factor,
        backhaul_tbps: inputs.backhaul_tbps,
        manufacturing_rate_pods_per_year: inputs.manufacturing_rate_pods_per_year,
        maintenance_capacity_pods: inputs.maintenance_capacity_pods,
        failure_rate: inputs.failure_rate,
        degraded_pods: compute.maintenance.degraded_pods,
        global_efficiency: compute.maintenance.global_efficiency,
        failure_modes,
        cumulative_radiation_dose: state.cumulative_radiation_dose
            + dt_years * RADIATION_DOSE_PER_YEAR,
        cumulative_thermal_excursions: state.cumulative_thermal_excursions
            + u64::from(compute.band.is_excursion()),
        lost_fraction: compute.lost_fraction,
        auto_design_mode: state.auto_design_mode,
        risk_mode: state.risk_mode,
        heat_gen_kw: heat.heat_gen_kw,
        heat_reject_kw: heat.heat_reject_kw,
        radiator_capacity_kw: heat.radiator_capacity_kw,
        net_heat_flow_kw: heat.net_heat_flow_kw,
        active_cooling_kw: heat.active_cooling_kw,
        effective_failure_rate: compute.effective_failure_rate,
        compute_effective_flops: compute.effective_flops,
        compute_exportable_flops: compute.exportable_flops,
        sustained_compute_flops: compute.sustained_flops,
        survival_fraction: survival,
        power_utilization_percent: utilization.power_percent,
        radiator_utilization_percent: utilization.radiator_percent,
        backhaul_utilization_percent: utilization.backhaul_percent,
        manufacturing_utilization_percent: utilization.manufacturing_percent,
        maintenance_utilization_percent: utilization.maintenance_percent,
        dominant_constraint: utilization.dominant_constraint,
    }
}

/// State inputs with pathological values (negative capacities, `NaN`,
/// out-of-range fractions) folded into their physical range.
#[derive(Debug, Clone, Copy)]
struct TickInputs {
    total_pods: f64,
    power_total_kw: f64,
    compute_raw_flops: f64,
    temp_core_c: f64,
    temp_radiator_c: f64,
    thermal_mass_j_per_c: f64,
    radiator_area_m2: f64,
    emissivity: f64,
    eclipse_fraction: f64,
    shadowing_loss: f64,
    radiator_burnout_factor: f64,
    backhaul_tbps: f64,
    manufacturing_rate_pods_per_year: f64,
    maintenance_capacity_pods: f64,
    failure_rate: f64,
    degraded_pods: f64,
    global_efficiency: f64,
    lost_fraction: f64,
}

impl TickInputs {
    fn sanitize(state: &ThermalState) -> Self {
        Self {
            total_pods: non_negative(state.total_pods),
            power_total_kw: non_negative(state.power_total_kw),
            compute_raw_flops: non_negative(state.compute_raw_flops),
            temp_core_c: finite_or(state.temp_core_c, 0.0).clamp(MIN_TEMP_C, MAX_TEMP_C),
            temp_radiator_c: finite_or(state.temp_radiator_c, 0.0).clamp(MIN_TEMP_C, MAX_TEMP_C),
            thermal_mass_j_per_c: state.thermal_mass_j_per_c,
            radiator_area_m2: non_negative(state.radiator_area_m2),
            emissivity: unit_fraction(state.emissivity),
            eclipse_fraction: unit_fraction(state.eclipse_fraction),
            shadowing_loss: unit_fraction(state.shadowing_loss),
            radiator_burnout_factor: unit_fraction(state.radiator_burnout_factor),
            backhaul_tbps: non_negative(state.backhaul_tbps),
            manufacturing_rate_pods_per_year: non_negative(state.manufacturing_rate_pods_per_year),
            maintenance_capacity_pods: non_negative(state.maintenance_capacity_pods),
            failure_rate: non_negative(state.failure_rate),
            degraded_pods: non_negative(state.degraded_pods),
            global_efficiency: unit_fraction(state.global_efficiency),
            lost_fraction: unit_fraction(state.lost_fraction),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HeatBalance {
    heat_gen_kw: f64,
    radiator_capacity_kw: f64,
    heat_reject_kw: f64,
    /// Generation over full-sun capacity. Unclamped; drives overdrive.
    load_ratio: f64,
    /// Rejection over generation. Below 1.0 the radiator is in deficit.
    rejection_ratio: f64,
    deficit: f64,
    overdrive: bool,
    net_heat_flow_kw: f64,
    active_cooling_kw: f64,
}

fn resolve_heat_balance(inputs: &TickInputs, modes: &FailureModes) -> HeatBalance {
    let effective_area = inputs.radiator_area_m2 * (1.0 - modes.radiator.fraction);
    let rejection = calculate_heat_rejection(
        effective_area,
        inputs.emissivity,
        inputs.temp_radiator_c,
        inputs.eclipse_fraction,
        inputs.shadowing_loss,
    );
    let radiator_capacity_kw = rejection.radiator_capacity_kw * inputs.radiator_burnout_factor;
    let heat_reject_kw = rejection.heat_reject_kw * inputs.radiator_burnout_factor;
    let heat_gen_kw = heat_generation_kw(inputs.power_total_kw);

    let load_ratio = heat_gen_kw / radiator_capacity_kw.max(CAPACITY_EPSILON);
    let rejection_ratio = if heat_gen_kw > CAPACITY_EPSILON {
        heat_reject_kw / heat_gen_kw
    } else {
        1.0
    };
    let deficit = if rejection_ratio < 1.0 {
        1.0 - rejection_ratio
    } else {
        0.0
    };
    let overdrive = load_ratio > OVERDRIVE_LOAD_RATIO;

    let mut net_heat_flow_kw = heat_gen_kw - heat_reject_kw;
    if overdrive {
        net_heat_flow_kw *= OVERDRIVE_HEAT_MULTIPLIER;
    }

    let coolant_frozen = matches!(modes.coolant, crate::CoolantState::Frozen { .. });
    let active_cooling_kw = if net_heat_flow_kw > 0.0 && !coolant_frozen {
        let cooling = (net_heat_flow_kw * ACTIVE_COOLING_EFFICIENCY)
            .min(inputs.power_total_kw * MAX_ACTIVE_COOLING_FRACTION)
            .max(0.0);
        if modes.pump == PumpState::Failed {
            cooling / PUMP_FAILURE_POWER_PENALTY
        } else {
            cooling
        }
    } else {
        0.0
    };

    HeatBalance {
        heat_gen_kw,
        radiator_capacity_kw,
        heat_reject_kw,
        load_ratio,
        rejection_ratio,
        deficit,
        overdrive,
        net_heat_flow_kw,
        active_cooling_kw,
    }
}

#[derive(Debug, Clone, Copy)]
struct Temperatures {
    core_c: f64,
    radiator_c: f64,
}

fn integrate_temperature(
    inputs: &TickInputs,
    heat: &HeatBalance,
    dt_hours: f64,
    year: f64,
) -> Temperatures {
    let mut delta_c = heat_to_temp_delta_c(
        heat.net_heat_flow_kw - heat.active_cooling_kw,
        dt_hours,
        inputs.thermal_mass_j_per_c,
    );

    // Runaway near radiator saturation accelerates super-linearly.
    if heat.deficit > 0.0 {
        delta_c *= 1.0 + DEFICIT_AMPLIFICATION * heat.deficit.powf(DEFICIT_EXPONENT);
        delta_c *= 1.0 + OVERDRIVE_FACTOR * heat.deficit;
    }

    if inputs.eclipse_fraction > ECLIPSE_OSCILLATION_THRESHOLD {
        delta_c += (year * ECLIPSE_OSCILLATION_FREQUENCY).sin()
            * (inputs.eclipse_fraction * ECLIPSE_OSCILLATION_AMPLITUDE_C)
            * thermal::dt_years(dt_hours);
    }

    let delta_c = finite_or(delta_c, 0.0);
    Temperatures {
        core_c: (inputs.temp_core_c + delta_c).clamp(MIN_TEMP_C, MAX_TEMP_C),
        radiator_c: (inputs.temp_radiator_c + delta_c).clamp(MIN_TEMP_C, MAX_TEMP_C),
    }
}

#[derive(Debug, Clone, Copy)]
struct ComputeOutcome {
    band: ThermalBand,
    thermal_throttle: f64,
    effective_failure_rate: f64,
    lost_fraction: f64,
    /// Share of last tick's nameplate that survived thermal death.
    surviving_share: f64,
    maintenance: MaintenanceOutcome,
    effective_flops: f64,
    exportable_flops: f64,
    sustained_flops: f64,
}

/// Share of the still-alive fleet that survives a loss ratchet from
/// `lost_before` to `lost_after`. Losses are applied to nameplate once.
fn surviving_share(lost_before: f64, lost_after: f64) -> f64 {
    let alive_before = 1.0 - lost_before;
    if alive_before <= CAPACITY_EPSILON {
        0.0
    } else {
        unit_fraction((1.0 - lost_after) / alive_before)
    }
}

fn resolve_compute(
    state: &ThermalState,
    inputs: &TickInputs,
    heat: &HeatBalance,
    temps: &Temperatures,
    dt_years: f64,
    year: f64,
    events: &mut Vec<EventEnvelope>,
) -> ComputeOutcome {
    let band = ThermalBand::classify(temps.core_c);

    let mut failure_multiplier = band.failure_multiplier();
    let mut thermal_throttle = band.throttle();
    if heat.deficit > 0.0 {
        failure_multiplier *= 1.0 + heat.deficit.powi(2) * DEFICIT_FAILURE_MULTIPLIER;
        thermal_throttle = thermal_throttle.min(heat.rejection_ratio.powi(2));
    }
    let effective_failure_rate = inputs.failure_rate * failure_multiplier;

    let death_fraction = band.death_fraction();
    let lost_fraction = inputs.lost_fraction.max(death_fraction);
    if lost_fraction > inputs.lost_fraction {
        events.push(crate::emit(
            year,
            Event::ThermalDeath {
                death_fraction,
                lost_fraction,
            },
        ));
    }
    let surviving_share = surviving_share(inputs.lost_fraction, lost_fraction);

    let maintenance = resolve_maintenance(&MaintenanceInputs {
        degraded_pods: inputs.degraded_pods,
        capacity_pods_per_year: inputs.maintenance_capacity_pods,
        effective_failure_rate,
        total_pods: inputs.total_pods,
        dt_years,
        global_efficiency: inputs.global_efficiency,
    });
    if maintenance.is_overloaded() {
        events.push(crate::emit(
            year,
            Event::MaintenanceOverload {
                ratio: maintenance.ratio,
            },
        ));
    }

    let surviving_raw_flops = inputs.compute_raw_flops * surviving_share;
    let sustained_flops = surviving_raw_flops * maintenance.global_efficiency;
    let backhaul_flops = inputs.backhaul_tbps * FLOPS_PER_TBPS;

    let (effective_flops, exportable_flops) = if sustained_flops > 0.0 {
        let effective = (surviving_raw_flops * thermal_throttle).min(sustained_flops);
        (effective, effective.min(backhaul_flops))
    } else {
        if state.sustained_compute_flops > 0.0 {
            events.push(crate::emit(year, Event::ComputeCollapse));
        }
        (0.0, 0.0)
    };

    ComputeOutcome {
        band,
        thermal_throttle,
        effective_failure_rate,
        lost_fraction,
        surviving_share,
        maintenance,
        effective_flops,
        exportable_flops,
        sustained_flops,
    }
}
