use super::*;

/// Radiators rejecting only half the waste heat: deficit 0.5, load ratio
/// well past the overdrive threshold.
fn half_rejection_state() -> ThermalState {
    let state = quiet_state();
    ThermalState {
        power_total_kw: power_for_rejection_ratio(&state, 0.5),
        ..state
    }
}

fn linear_delta_c(next: &ThermalState, dt_hours: f64) -> f64 {
    (next.net_heat_flow_kw - next.active_cooling_kw) * constants::SECONDS_PER_HOUR * dt_hours
        / next.thermal_mass_j_per_c
}

#[test]
fn test_deficit_amplifies_temperature_rise_super_linearly() {
    let state = half_rejection_state();
    let dt_hours = 100.0;
    let next = step(&state, dt_hours);

    let ratio = next.heat_reject_kw / next.heat_gen_kw;
    assert_close(ratio, 0.5, 1e-9);

    let linear = linear_delta_c(&next, dt_hours);
    let actual = next.temp_core_c - state.temp_core_c;
    assert!(linear > 0.0);

    let deficit: f64 = 1.0 - ratio;
    let amplification = 1.0 + 3.0 * deficit.powf(2.5);
    assert!(actual >= linear * amplification);
    assert_close(actual, linear * amplification * (1.0 + 2.0 * deficit), 1e-6);
}

#[test]
fn test_second_identical_tick_stays_amplified() {
    let state = half_rejection_state();
    let dt_hours = 100.0;
    let mut rng = make_rng();
    let first = update_thermal_state(&state, dt_hours, state.year, &mut rng);
    let second = update_thermal_state(&first, dt_hours, state.year, &mut rng);

    let deficit = 1.0 - second.heat_reject_kw / second.heat_gen_kw;
    assert!(deficit > 0.0);
    let linear = linear_delta_c(&second, dt_hours);
    let actual = second.temp_core_c - first.temp_core_c;
    assert!(actual >= linear * (1.0 + 3.0 * deficit.powf(2.5)));
}

#[test]
fn test_overdrive_inflates_net_heat_and_wears_radiator() {
    let state = half_rejection_state();
    let (next, events) = step_with_events(&state, ONE_HOUR);

    // load ratio = 2 x (1 - eclipse) = 2 with no eclipse
    assert_close(
        next.net_heat_flow_kw,
        (next.heat_gen_kw - next.heat_reject_kw) * 1.5,
        1e-9,
    );
    assert_close(next.radiator_burnout_factor, 0.98, 1e-12);
    assert_close(next.emissivity, state.emissivity * 0.99, 1e-12);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::RadiatorOverdrive { load_ratio } if load_ratio > 1.1)));
    assert!((next.radiator_utilization_percent - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_overdrive_leaves_input_untouched() {
    let state = half_rejection_state();
    let before = state.clone();
    let _ = step(&state, ONE_HOUR);
    assert_eq!(state, before);
    assert!((state.emissivity - 0.9).abs() < f64::EPSILON);
}

#[test]
fn test_deficit_throttle_and_failure_pressure() {
    let state = half_rejection_state();
    let next = step(&state, ONE_HOUR);

    // band throttle stays 1.0 near 20 °C, so the deficit throttle binds
    assert_eq!(next.dominant_constraint, Constraint::Thermal);
    assert_close(next.power_utilization_percent, 25.0, 1e-6);
    assert_close(next.compute_effective_flops, state.compute_raw_flops * 0.25, 1e-6);
    assert_close(
        next.effective_failure_rate,
        state.failure_rate * (1.0 + 0.25 * 5.0),
        1e-6,
    );
}

#[test]
fn test_modest_load_skips_overdrive() {
    let state = quiet_state();
    let state = ThermalState {
        power_total_kw: power_for_rejection_ratio(&state, 1.0) * 1.05,
        ..state
    };
    let (next, events) = step_with_events(&state, ONE_HOUR);
    assert!((next.radiator_burnout_factor - 1.0).abs() < f64::EPSILON);
    assert!(!events
        .iter()
        .any(|e| matches!(e.event, Event::RadiatorOverdrive { .. })));
}
