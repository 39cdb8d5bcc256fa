//! Property-based tests over randomized fleet states.

use super::*;
use proptest::prelude::*;

prop_compose! {
    fn arb_heat()(
        power_total_kw in prop_oneof![Just(0.0), 0.0f64..1e7],
        temp_c in -270.0f64..2_000.0,
        thermal_mass_j_per_c in prop_oneof![Just(0.0), 0.0f64..1e11],
        radiator_area_m2 in prop_oneof![Just(0.0), 0.0f64..1e5],
        eclipse_fraction in 0.0f64..=1.0,
        shadowing_loss in 0.0f64..=1.0,
    ) -> ThermalState {
        ThermalState {
            power_total_kw,
            temp_core_c: temp_c,
            temp_radiator_c: temp_c,
            thermal_mass_j_per_c,
            radiator_area_m2,
            eclipse_fraction,
            shadowing_loss,
            ..base_state()
        }
    }
}

prop_compose! {
    fn arb_state()(
        heat in arb_heat(),
        total_pods in 0.0f64..20_000.0,
        compute_raw_flops in prop_oneof![Just(0.0), 0.0f64..1e20],
        backhaul_tbps in prop_oneof![Just(0.0), 0.0f64..1_000.0],
        maintenance_capacity_pods in prop_oneof![Just(0.0), 0.0f64..5_000.0],
        degraded_pods in 0.0f64..50_000.0,
        failure_rate in 0.0f64..2.0,
        health in (0.0f64..=1.0, 0.0f64..=1.0),
    ) -> ThermalState {
        let (global_efficiency, lost_fraction) = health;
        ThermalState {
            total_pods,
            compute_raw_flops,
            backhaul_tbps,
            maintenance_capacity_pods,
            degraded_pods,
            failure_rate,
            global_efficiency,
            lost_fraction,
            ..heat
        }
    }
}

fn dt_hours() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.1), Just(1.0), Just(ONE_YEAR), 0.0f64..20_000.0]
}

proptest! {
    /// Every utilization metric lands in its closed interval.
    #[test]
    fn test_utilization_stays_in_bounds(state in arb_state(), dt in dt_hours(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = update_thermal_state(&state, dt, 2030.0, &mut rng);

        for pct in [
            next.power_utilization_percent,
            next.radiator_utilization_percent,
            next.backhaul_utilization_percent,
            next.manufacturing_utilization_percent,
        ] {
            prop_assert!((0.0..=100.0).contains(&pct), "utilization {pct} out of range");
        }
        prop_assert!((0.0..=300.0).contains(&next.maintenance_utilization_percent));
        prop_assert!(next.temp_core_c.is_finite());
        prop_assert!(next.degraded_pods >= 0.0);
    }

    /// `lost_fraction` never decreases across a run.
    #[test]
    fn test_lost_fraction_is_monotonic(state in arb_state(), dt in dt_hours(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut current = state;
        for tick in 0..5 {
            let next = update_thermal_state(&current, dt, 2030.0 + f64::from(tick), &mut rng);
            prop_assert!(next.lost_fraction >= current.lost_fraction);
            prop_assert!(next.lost_fraction <= 1.0);
            current = next;
        }
    }

    /// Exportable compute is the minimum of effective compute and the link.
    #[test]
    fn test_exportable_is_backhaul_minimum(state in arb_state(), dt in dt_hours(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = update_thermal_state(&state, dt, 2030.0, &mut rng);
        let link = next.backhaul_tbps * constants::FLOPS_PER_TBPS;

        prop_assert!(next.compute_exportable_flops <= next.compute_effective_flops);
        prop_assert!(next.compute_exportable_flops <= link);
        let binding = next.compute_effective_flops.min(link);
        prop_assert!((next.compute_exportable_flops - binding).abs() <= binding * 1e-12);
    }

    /// No sustained compute means nothing effective or exportable.
    #[test]
    fn test_sustained_gate_zeroes_compute(state in arb_state(), dt in dt_hours(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = update_thermal_state(&state, dt, 2030.0, &mut rng);
        if next.sustained_compute_flops <= 0.0 {
            prop_assert!(next.compute_effective_flops.abs() < f64::EPSILON);
            prop_assert!(next.compute_exportable_flops.abs() < f64::EPSILON);
            prop_assert_eq!(next.dominant_constraint, Constraint::Collapsed);
        } else {
            prop_assert!(next.compute_effective_flops <= next.sustained_compute_flops);
        }
    }

    /// The input state is never mutated and thermal mass never drifts.
    #[test]
    fn test_step_is_pure_over_input(state in arb_state(), dt in dt_hours(), seed in any::<u64>()) {
        let before = state.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = update_thermal_state(&state, dt, 2030.0, &mut rng);
        prop_assert_eq!(&state, &before);
        prop_assert!((next.thermal_mass_j_per_c - before.thermal_mass_j_per_c).abs() < f64::EPSILON);
    }

    /// A backlog carried across many short ticks stays finite.
    #[test]
    fn test_backlog_stays_finite_over_short_ticks(state in arb_state(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut current = state;
        for _ in 0..48 {
            let year = current.year + 0.5 / ONE_YEAR;
            current = update_thermal_state(&current, 0.5, year, &mut rng);
            prop_assert!(current.degraded_pods.is_finite());
            prop_assert!(current.degraded_pods >= 0.0);
        }
    }

    /// Below capacity, tick length does not change fleet efficiency.
    #[test]
    fn test_efficiency_ignores_tick_length_below_capacity(
        capacity in 1.0f64..1_000.0,
        load in 0.0f64..0.9,
        efficiency in 0.1f64..=1.0,
    ) {
        let state = ThermalState {
            maintenance_capacity_pods: capacity,
            degraded_pods: capacity * load,
            global_efficiency: efficiency,
            ..quiet_state()
        };
        let mut rng = make_rng();
        let mut hourly = state.clone();
        for _ in 0..24 {
            hourly = update_thermal_state(&hourly, ONE_HOUR, hourly.year, &mut rng);
        }
        let daily = step(&state, 24.0);

        prop_assert!((hourly.global_efficiency - efficiency).abs() < 1e-12);
        prop_assert!((daily.global_efficiency - efficiency).abs() < 1e-12);
        prop_assert!((hourly.degraded_pods - daily.degraded_pods).abs() <= 1e-9 * capacity);
    }
}
