//! Shared test fixtures for orbit_core and downstream crates.
//!
//! `base_fleet()` is a healthy mixed fleet whose radiators comfortably
//! reject its waste heat at the default start temperature. `base_state()`
//! seeds it without the warm-up tick, so no randomness is consumed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{Environment, FleetHealth, FleetSpec, ThermalState};

/// 80 class-A and 20 class-B satellites: 640 kW, 260 PFLOPs, 640 m².
pub fn base_fleet() -> FleetSpec {
    FleetSpec {
        satellite_count_a: 80,
        satellite_count_b: 20,
        power_per_a_kw: 5.0,
        power_per_b_kw: 12.0,
        compute_per_a_pflops: 2.0,
        compute_per_b_pflops: 5.0,
        radiator_area_per_a_m2: 5.0,
        radiator_area_per_b_m2: 12.0,
        environment: Environment::default(),
        health: FleetHealth::default(),
    }
}

pub fn base_state() -> ThermalState {
    crate::seed_thermal_state(&base_fleet(), 2025.0)
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
