//! Maintenance debt loop.
//!
//! Repairs draw on a per-year throughput, so the repairs available to one
//! tick are `maintenance_capacity_pods * dt_years`. The load ratio measures
//! the outstanding work (backlog plus this tick's repairs) against the annual
//! rate, so it does not depend on tick length.
//!
//! Overload growth and decay are both per year of overload, so a year of
//! hourly ticks erodes capacity as much as one yearly tick at the same ratio.

use crate::constants::{
    CAPACITY_EPSILON, MAINTENANCE_EFFICIENCY_DECAY, MAINTENANCE_SURVIVAL_DECAY,
    MAINTENANCE_UTILIZATION_CAP_PERCENT,
};
use crate::thermal::{finite_or, non_negative, unit_fraction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MaintenanceInputs {
    pub degraded_pods: f64,
    pub capacity_pods_per_year: f64,
    pub effective_failure_rate: f64,
    pub total_pods: f64,
    pub dt_years: f64,
    pub global_efficiency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MaintenanceOutcome {
    pub degraded_pods: f64,
    pub pods_repaired: f64,
    pub new_failures: f64,
    /// Outstanding work over the annual repair rate. Values above 1.0 mean overload.
    pub ratio: f64,
    /// Share of nameplate that survives into the next tick.
    pub survival_fraction: f64,
    pub global_efficiency: f64,
}

impl MaintenanceOutcome {
    pub fn is_overloaded(&self) -> bool {
        self.ratio > 1.0
    }
}

pub(crate) fn resolve_maintenance(inputs: &MaintenanceInputs) -> MaintenanceOutcome {
    let annual_capacity = non_negative(inputs.capacity_pods_per_year);
    let dt_years = non_negative(inputs.dt_years);
    let tick_capacity = non_negative(annual_capacity * dt_years);
    let degraded = non_negative(inputs.degraded_pods);

    let pods_repaired = degraded.min(tick_capacity);
    let new_failures =
        non_negative(inputs.effective_failure_rate * inputs.total_pods * dt_years);
    let mut degraded_pods = (degraded + new_failures - pods_repaired).max(0.0);

    let work = degraded_pods + pods_repaired;
    let ratio = if annual_capacity > CAPACITY_EPSILON {
        finite_or(work / annual_capacity, 0.0)
    } else if work > CAPACITY_EPSILON {
        // No repair capacity at all: report the overload ceiling.
        MAINTENANCE_UTILIZATION_CAP_PERCENT / 100.0
    } else {
        0.0
    };

    let mut survival_fraction = 1.0;
    let mut global_efficiency = unit_fraction(inputs.global_efficiency);
    if ratio > 1.0 {
        let overload = ratio - 1.0;
        degraded_pods += overload * tick_capacity;
        let exponent = overload * dt_years;
        survival_fraction = MAINTENANCE_SURVIVAL_DECAY.powf(exponent);
        global_efficiency *= MAINTENANCE_EFFICIENCY_DECAY.powf(exponent);
    }

    MaintenanceOutcome {
        // a saturated backlog stays saturated
        degraded_pods: finite_or(degraded_pods, degraded).max(0.0),
        pods_repaired,
        new_failures,
        ratio,
        survival_fraction: unit_fraction(survival_fraction),
        global_efficiency: unit_fraction(global_efficiency),
    }
}
