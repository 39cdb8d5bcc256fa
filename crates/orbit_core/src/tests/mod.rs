use super::*;
use crate::test_fixtures::{base_fleet, base_state, make_rng};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod failure_modes;
mod overdrive;
mod properties;

// --- Shared test helpers ------------------------------------------------

const ONE_HOUR: f64 = 1.0;
const ONE_YEAR: f64 = constants::HOURS_PER_YEAR;

/// Base state with no pods, so no failure-mode dice can fire.
fn quiet_state() -> ThermalState {
    ThermalState {
        total_pods: 0.0,
        ..base_state()
    }
}

fn step(state: &ThermalState, dt_hours: f64) -> ThermalState {
    let mut rng = make_rng();
    update_thermal_state(state, dt_hours, state.year, &mut rng)
}

fn step_with_events(state: &ThermalState, dt_hours: f64) -> (ThermalState, Vec<EventEnvelope>) {
    let mut rng = make_rng();
    let mut events = Vec::new();
    let next = update_thermal_state_with_events(state, dt_hours, state.year, &mut rng, &mut events);
    (next, events)
}

/// Bus power whose waste heat is `ratio` times what the radiator can
/// currently reject.
fn power_for_rejection_ratio(state: &ThermalState, ratio: f64) -> f64 {
    let rejection = calculate_heat_rejection(
        state.radiator_area_m2,
        state.emissivity,
        state.temp_radiator_c,
        state.eclipse_fraction,
        state.shadowing_loss,
    );
    rejection.heat_reject_kw / ratio / (1.0 - constants::ELECTRICAL_EFFICIENCY)
}

fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
    let scale = expected.abs().max(1e-12);
    assert!(
        (actual - expected).abs() / scale < rel_tol,
        "expected {expected}, got {actual}"
    );
}
