use super::*;

/// Cold, eclipsed segment whose waste heat exceeds what the shaded radiator
/// rejects, so active cooling runs whenever the coolant is liquid. The huge
/// thermal mass pins both temperatures below the freeze point. Coolant
/// freezing does not depend on pod count, so the quiet state still freezes.
fn cold_eclipsed_state() -> ThermalState {
    let state = ThermalState {
        eclipse_fraction: 0.5,
        temp_core_c: -40.0,
        temp_radiator_c: -40.0,
        thermal_mass_j_per_c: 1e15,
        ..quiet_state()
    };
    ThermalState {
        power_total_kw: power_for_rejection_ratio(&state, 0.67),
        ..state
    }
}

#[test]
fn test_coolant_freeze_lifecycle() {
    let mut rng = make_rng();
    let mut state = cold_eclipsed_state();
    let mut year = state.year;

    let mut ticks = 0;
    while !state.coolant_frozen() {
        year += ONE_HOUR / ONE_YEAR;
        state = update_thermal_state(&state, ONE_HOUR, year, &mut rng);
        ticks += 1;
        assert!(ticks < 20_000, "coolant never froze");
        assert!(state.temp_radiator_c < constants::COOLANT_FREEZE_TEMP_C);
        if !state.coolant_frozen() {
            assert!(state.active_cooling_kw > 0.0);
        }
    }

    let mut frozen_ticks = 0;
    while state.coolant_frozen() {
        assert!(state.active_cooling_kw.abs() < f64::EPSILON);
        assert!(state.net_heat_flow_kw > 0.0);
        year += ONE_HOUR / ONE_YEAR;
        state = update_thermal_state(&state, ONE_HOUR, year, &mut rng);
        frozen_ticks += 1;
        assert!(frozen_ticks <= 8, "coolant never thawed");
    }
    assert!(frozen_ticks >= 2);
    assert!(state.active_cooling_kw > 0.0);
}

#[test]
fn test_freeze_and_thaw_are_reported() {
    let mut rng = make_rng();
    let mut events = Vec::new();
    let mut state = cold_eclipsed_state();
    for _ in 0..20_000 {
        state = update_thermal_state_with_events(&state, ONE_HOUR, state.year, &mut rng, &mut events);
        if events.iter().any(|e| e.event == Event::CoolantThawed) {
            break;
        }
    }
    let froze = events
        .iter()
        .position(|e| matches!(e.event, Event::CoolantFroze { duration_hours } if (2.0..6.0).contains(&duration_hours)));
    let thawed = events.iter().position(|e| e.event == Event::CoolantThawed);
    assert!(froze.is_some());
    assert!(thawed > froze);
}

#[test]
fn test_failed_pump_weakens_active_cooling() {
    let state = ThermalState {
        power_total_kw: 2_000.0,
        ..quiet_state()
    };
    let failed = ThermalState {
        failure_modes: FailureModes {
            pump: PumpState::Failed,
            ..FailureModes::default()
        },
        ..state.clone()
    };

    // quiet state has no pods, so neither pump can fail; the failed one may
    // recover, so compare against a seed where it stays down
    let nominal_next = step(&state, ONE_HOUR);
    let failed_next = (0..50)
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            update_thermal_state(&failed, ONE_HOUR, failed.year, &mut rng)
        })
        .find(ThermalState::pump_failure_active)
        .unwrap();

    assert!(nominal_next.active_cooling_kw > 0.0);
    assert_close(
        failed_next.active_cooling_kw,
        nominal_next.active_cooling_kw / 1.3,
        1e-9,
    );
}

#[test]
fn test_radiator_damage_shrinks_rejection() {
    let state = quiet_state();
    let damaged = ThermalState {
        failure_modes: FailureModes {
            radiator: RadiatorDamage { fraction: 0.25 },
            ..FailureModes::default()
        },
        ..state.clone()
    };
    let clean_next = step(&state, ONE_HOUR);
    let damaged_next = step(&damaged, ONE_HOUR);
    assert_close(
        damaged_next.radiator_capacity_kw,
        clean_next.radiator_capacity_kw * 0.75,
        1e-9,
    );
    assert!((damaged_next.radiator_damage_fraction() - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_radiation_dose_accumulates_per_year() {
    let mut state = quiet_state();
    let mut rng = make_rng();
    for _ in 0..4 {
        state = update_thermal_state(&state, ONE_YEAR / 2.0, state.year, &mut rng);
    }
    assert_close(state.cumulative_radiation_dose, 2.0, 1e-12);
}

#[test]
fn test_same_seed_same_history() {
    let run = || {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut events = Vec::new();
        let mut state = ThermalState {
            total_pods: 5_000.0,
            ..base_state()
        };
        for year in 0..30 {
            state = update_thermal_state_with_events(
                &state,
                ONE_YEAR,
                2025.0 + f64::from(year),
                &mut rng,
                &mut events,
            );
        }
        (state, events)
    };
    let (a, a_events) = run();
    let (b, b_events) = run();
    assert_eq!(a, b);
    assert_eq!(a_events, b_events);
    assert!(!a_events.is_empty());
}
