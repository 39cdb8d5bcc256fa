//! Heat generation, radiative rejection, and the temperature band helpers.
//!
//! Units at this boundary:
//! - Power and heat flow: kW
//! - Temperature: °C (converted to K only inside the Stefan-Boltzmann term)
//! - Thermal mass: J/°C
//!
//! Every helper here is pure and returns finite, non-negative values for
//! degenerate inputs instead of `NaN`/`Infinity`.

use crate::constants::{
    DEATH_SPAN_C, ELECTRICAL_EFFICIENCY, HARD_TEMP_LIMIT_C, HOURS_PER_YEAR, KELVIN_OFFSET,
    MIN_THERMAL_MASS_J_PER_C, SECONDS_PER_HOUR, SOFT_TEMP_LIMIT_C, STEFAN_BOLTZMANN, T_SPACE_K,
};

/// Radiator output for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatRejection {
    /// Full-sun radiative capacity.
    pub radiator_capacity_kw: f64,
    /// Capacity after eclipse and shadowing losses.
    pub heat_reject_kw: f64,
}

/// Replaces `NaN` and infinities with `fallback`.
#[inline]
pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamps to `[0, 1]`, mapping `NaN` to 0.
#[inline]
pub(crate) fn unit_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Non-negative finite value, mapping `NaN` to 0.
#[inline]
pub(crate) fn non_negative(value: f64) -> f64 {
    finite_or(value, 0.0).max(0.0)
}

#[inline]
pub fn dt_years(dt_hours: f64) -> f64 {
    dt_hours / HOURS_PER_YEAR
}

/// Waste heat from bus power.
#[inline]
pub fn heat_generation_kw(power_total_kw: f64) -> f64 {
    non_negative(power_total_kw) * (1.0 - ELECTRICAL_EFFICIENCY)
}

/// Stefan-Boltzmann radiative cooling to deep space.
///
/// `Q = A * ε * σ * (T_rad^4 - T_space^4)`, reported in kW, then derated by
/// eclipse and shadowing. A radiator colder than deep space rejects nothing.
pub fn calculate_heat_rejection(
    radiator_area_m2: f64,
    emissivity: f64,
    temp_radiator_c: f64,
    eclipse_fraction: f64,
    shadowing_loss: f64,
) -> HeatRejection {
    let t_rad_k = finite_or(temp_radiator_c + KELVIN_OFFSET, T_SPACE_K).max(0.0);
    let q_rad_max_w = non_negative(radiator_area_m2)
        * unit_fraction(emissivity)
        * STEFAN_BOLTZMANN
        * (t_rad_k.powi(4) - T_SPACE_K.powi(4));
    let radiator_capacity_kw = non_negative(q_rad_max_w / 1000.0);
    let heat_reject_kw = radiator_capacity_kw
        * (1.0 - unit_fraction(eclipse_fraction))
        * (1.0 - unit_fraction(shadowing_loss));
    HeatRejection {
        radiator_capacity_kw,
        heat_reject_kw: non_negative(heat_reject_kw),
    }
}

/// Forward-Euler temperature delta for a heat flow held over `dt_hours`.
///
/// The thermal mass is floored at `MIN_THERMAL_MASS_J_PER_C`.
#[inline]
pub fn heat_to_temp_delta_c(heat_flow_kw: f64, dt_hours: f64, thermal_mass_j_per_c: f64) -> f64 {
    let mass = finite_or(thermal_mass_j_per_c, 0.0).max(MIN_THERMAL_MASS_J_PER_C);
    finite_or(heat_flow_kw * SECONDS_PER_HOUR * dt_hours / mass, 0.0)
}

/// Where the core temperature sits relative to the soft and hard limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalBand {
    Nominal,
    /// Above the soft limit: throttled, overstressed.
    Throttled { throttle: f64, overstress: f64 },
    /// Above the hard limit: throttled and losing hardware.
    Critical {
        throttle: f64,
        overstress: f64,
        death_fraction: f64,
    },
}

impl ThermalBand {
    pub fn classify(temp_core_c: f64) -> Self {
        if temp_core_c.is_nan() || temp_core_c <= SOFT_TEMP_LIMIT_C {
            return ThermalBand::Nominal;
        }
        let throttle = SOFT_TEMP_LIMIT_C / temp_core_c;
        let band_width = HARD_TEMP_LIMIT_C - SOFT_TEMP_LIMIT_C;
        let overstress = ((temp_core_c - SOFT_TEMP_LIMIT_C) / band_width).min(1.0);
        if temp_core_c <= HARD_TEMP_LIMIT_C {
            ThermalBand::Throttled {
                throttle,
                overstress,
            }
        } else {
            ThermalBand::Critical {
                throttle,
                overstress,
                death_fraction: ((temp_core_c - HARD_TEMP_LIMIT_C) / DEATH_SPAN_C).min(1.0),
            }
        }
    }

    pub fn throttle(self) -> f64 {
        match self {
            ThermalBand::Nominal => 1.0,
            ThermalBand::Throttled { throttle, .. } | ThermalBand::Critical { throttle, .. } => {
                throttle
            }
        }
    }

    /// Failure-rate multiplier from running hot: 1.0 nominal, up to 2.0.
    pub fn failure_multiplier(self) -> f64 {
        match self {
            ThermalBand::Nominal => 1.0,
            ThermalBand::Throttled { overstress, .. } | ThermalBand::Critical { overstress, .. } => {
                1.0 + overstress
            }
        }
    }

    pub fn death_fraction(self) -> f64 {
        match self {
            ThermalBand::Critical { death_fraction, .. } => death_fraction,
            _ => 0.0,
        }
    }

    pub fn is_excursion(self) -> bool {
        !matches!(self, ThermalBand::Nominal)
    }
}
