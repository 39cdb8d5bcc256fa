//! Utilization metrics and the dominant-constraint pick.
//!
//! Every percentage is computed independently from the physical quantities
//! of the tick and then clamped. `NaN` is reported as 0.

use crate::constants::{
    CAPACITY_EPSILON, FLOPS_PER_TBPS, MAINTENANCE_UTILIZATION_CAP_PERCENT, UTILIZATION_CAP_PERCENT,
};
use crate::Constraint;

/// Clamps a percentage into `[0, cap]`, mapping `NaN` to 0.
#[inline]
pub(crate) fn clamp_percent(value: f64, cap: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, cap)
    }
}

/// `used / capacity` as a percentage. Zero capacity with nonzero demand reads
/// as fully used; zero of both reads as idle.
fn ratio_percent(used: f64, capacity: f64) -> f64 {
    if capacity > CAPACITY_EPSILON {
        clamp_percent(used / capacity * 100.0, UTILIZATION_CAP_PERCENT)
    } else if used > CAPACITY_EPSILON {
        UTILIZATION_CAP_PERCENT
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UtilizationInputs {
    pub heat_gen_kw: f64,
    pub radiator_capacity_kw: f64,
    pub thermal_throttle: f64,
    pub maintenance_ratio: f64,
    pub compute_effective_flops: f64,
    pub compute_exportable_flops: f64,
    pub sustained_compute_flops: f64,
    pub backhaul_tbps: f64,
    pub global_efficiency: f64,
    pub lost_fraction: f64,
    pub effective_failure_rate: f64,
    pub total_pods: f64,
    pub manufacturing_rate_pods_per_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Utilization {
    pub power_percent: f64,
    pub radiator_percent: f64,
    pub backhaul_percent: f64,
    pub manufacturing_percent: f64,
    pub maintenance_percent: f64,
    pub dominant_constraint: Constraint,
}

/// Per-constraint share of compute each limit allows, in `[0, 1]`-ish units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LimitFactors {
    thermal: f64,
    backhaul: f64,
    maintenance: f64,
    autonomy: f64,
    fleet: f64,
}

impl LimitFactors {
    fn from_inputs(inputs: &UtilizationInputs) -> Self {
        let maintenance = if inputs.maintenance_ratio > 1.0 {
            1.0 / inputs.maintenance_ratio
        } else {
            1.0
        };
        let backhaul = if inputs.compute_effective_flops > 0.0 {
            inputs.compute_exportable_flops / inputs.compute_effective_flops
        } else {
            1.0
        };
        Self {
            thermal: inputs.thermal_throttle,
            backhaul,
            maintenance,
            autonomy: inputs.global_efficiency,
            fleet: 1.0 - inputs.lost_fraction,
        }
    }

    /// Smallest factor (capped at 1.0) and the constraint it belongs to.
    /// Ties go to the earlier constraint in declaration order.
    fn binding(&self) -> (f64, Constraint) {
        let candidates = [
            (self.thermal, Constraint::Thermal),
            (self.backhaul, Constraint::Backhaul),
            (self.maintenance, Constraint::Maintenance),
            (self.autonomy, Constraint::Autonomy),
            (self.fleet, Constraint::FleetLoss),
        ];
        let mut binding = (1.0, Constraint::Unconstrained);
        for (factor, constraint) in candidates {
            let factor = if factor.is_nan() { 0.0 } else { factor };
            if factor < binding.0 - 1e-9 {
                binding = (factor, constraint);
            }
        }
        binding
    }
}

pub(crate) fn derive_utilization(inputs: &UtilizationInputs) -> Utilization {
    let radiator_percent = ratio_percent(inputs.heat_gen_kw, inputs.radiator_capacity_kw);
    let backhaul_percent = ratio_percent(
        inputs.compute_effective_flops / FLOPS_PER_TBPS,
        inputs.backhaul_tbps,
    );
    let manufacturing_percent = ratio_percent(
        inputs.effective_failure_rate * inputs.total_pods,
        inputs.manufacturing_rate_pods_per_year,
    );
    let maintenance_percent = clamp_percent(
        inputs.maintenance_ratio * 100.0,
        MAINTENANCE_UTILIZATION_CAP_PERCENT,
    );

    let (power_percent, dominant_constraint) = if inputs.sustained_compute_flops > 0.0 {
        let (factor, constraint) = LimitFactors::from_inputs(inputs).binding();
        (clamp_percent(factor * 100.0, UTILIZATION_CAP_PERCENT), constraint)
    } else {
        (0.0, Constraint::Collapsed)
    };

    Utilization {
        power_percent,
        radiator_percent,
        backhaul_percent,
        manufacturing_percent,
        maintenance_percent,
        dominant_constraint,
    }
}
