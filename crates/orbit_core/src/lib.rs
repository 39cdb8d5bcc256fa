//! `orbit_core`: per-tick thermal/power/compute integration for an orbital
//! compute fleet.
//!
//! No IO, no network. All randomness via the passed-in Rng.

pub mod constants;
mod engine;
mod failure;
mod fleet;
mod maintenance;
pub mod metrics;
pub mod thermal;
mod types;
mod utilization;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::{update_thermal_state, update_thermal_state_with_events};
pub use fleet::{fleet_thermal_mass_j_per_c, initialize_thermal_state, seed_thermal_state};
pub use metrics::{compute_metrics, MetricsSnapshot};
pub use thermal::{calculate_heat_rejection, HeatRejection};
pub use types::*;

pub(crate) fn emit(year: f64, event: Event) -> EventEnvelope {
    EventEnvelope { year, event }
}

#[cfg(test)]
mod tests;
