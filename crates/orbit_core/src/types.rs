//! Type definitions for `orbit_core`.
//!
//! The fleet aggregate, its failure-mode sub-states, fleet specs consumed by
//! the initializer, and the event types returned by the step function.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// How aggressively the auto-design pre-pass clamps target design parameters.
/// The integrator only carries it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskMode {
    #[default]
    Safe,
    Aggressive,
    Yolo,
}

/// The limit that currently caps usable compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Constraint {
    #[default]
    Unconstrained,
    Thermal,
    Backhaul,
    Maintenance,
    Autonomy,
    FleetLoss,
    /// Sustained compute is zero; nothing is exportable.
    Collapsed,
}

impl Constraint {
    pub fn label(self) -> &'static str {
        match self {
            Constraint::Unconstrained => "unconstrained",
            Constraint::Thermal => "thermal",
            Constraint::Backhaul => "backhaul",
            Constraint::Maintenance => "maintenance",
            Constraint::Autonomy => "autonomy",
            Constraint::FleetLoss => "fleet_loss",
            Constraint::Collapsed => "collapsed",
        }
    }
}

// ---------------------------------------------------------------------------
// Failure-mode state machines
// ---------------------------------------------------------------------------

/// Cumulative micrometeoroid damage to the radiator field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RadiatorDamage {
    /// Fraction of radiator area lost, capped at `RADIATOR_DAMAGE_CAP`.
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PumpState {
    #[default]
    Nominal,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CoolantState {
    #[default]
    Liquid,
    /// Active cooling is disabled until the countdown reaches zero.
    Frozen { remaining_years: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FailureModes {
    pub radiator: RadiatorDamage,
    pub pump: PumpState,
    pub coolant: CoolantState,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// One lumped fleet segment at a simulated instant.
///
/// Produced by `initialize_thermal_state` and advanced only by
/// `update_thermal_state`, which returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    pub year: f64,
    pub total_pods: f64,

    // Nameplate capacity this tick
    pub power_total_kw: f64,
    pub compute_raw_flops: f64,

    // Thermal
    pub temp_core_c: f64,
    pub temp_radiator_c: f64,
    /// Sum of per-class constants. Never derived from power.
    pub thermal_mass_j_per_c: f64,
    pub radiator_area_m2: f64,
    pub emissivity: f64,
    pub eclipse_fraction: f64,
    pub shadowing_loss: f64,
    /// Multiplies radiator capacity; decays under sustained overdrive.
    #[serde(default = "default_unit")]
    pub radiator_burnout_factor: f64,

    // Backhaul
    pub backhaul_tbps: f64,

    // Fleet health
    pub manufacturing_rate_pods_per_year: f64,
    /// Repair throughput in pods per year.
    pub maintenance_capacity_pods: f64,
    /// Base per-pod failures per year, before thermal overstress.
    pub failure_rate: f64,
    pub degraded_pods: f64,
    #[serde(default = "default_unit")]
    pub global_efficiency: f64,

    // Failure modes
    #[serde(default)]
    pub failure_modes: FailureModes,
    #[serde(default)]
    pub cumulative_radiation_dose: f64,
    #[serde(default)]
    pub cumulative_thermal_excursions: u64,

    /// Fraction of the segment destroyed by exceeding the hard limit.
    /// Never decreases.
    #[serde(default)]
    pub lost_fraction: f64,

    // Auto-design passthrough
    #[serde(default)]
    pub auto_design_mode: bool,
    #[serde(default)]
    pub risk_mode: RiskMode,

    // Derived outputs, recomputed every tick
    #[serde(default)]
    pub heat_gen_kw: f64,
    #[serde(default)]
    pub heat_reject_kw: f64,
    #[serde(default)]
    pub radiator_capacity_kw: f64,
    #[serde(default)]
    pub net_heat_flow_kw: f64,
    #[serde(default)]
    pub active_cooling_kw: f64,
    #[serde(default)]
    pub effective_failure_rate: f64,
    #[serde(default)]
    pub compute_effective_flops: f64,
    #[serde(default)]
    pub compute_exportable_flops: f64,
    #[serde(default)]
    pub sustained_compute_flops: f64,
    #[serde(default = "default_unit")]
    pub survival_fraction: f64,
    #[serde(default)]
    pub power_utilization_percent: f64,
    #[serde(default)]
    pub radiator_utilization_percent: f64,
    #[serde(default)]
    pub backhaul_utilization_percent: f64,
    #[serde(default)]
    pub manufacturing_utilization_percent: f64,
    #[serde(default)]
    pub maintenance_utilization_percent: f64,
    #[serde(default)]
    pub dominant_constraint: Constraint,
}

fn default_unit() -> f64 {
    1.0
}

impl ThermalState {
    pub fn radiator_damage_fraction(&self) -> f64 {
        self.failure_modes.radiator.fraction
    }

    pub fn pump_failure_active(&self) -> bool {
        self.failure_modes.pump == PumpState::Failed
    }

    pub fn coolant_frozen(&self) -> bool {
        matches!(self.failure_modes.coolant, CoolantState::Frozen { .. })
    }

    /// Remaining freeze duration in fractional years, 0 when liquid.
    pub fn coolant_freeze_years_remaining(&self) -> f64 {
        match self.failure_modes.coolant {
            CoolantState::Frozen { remaining_years } => remaining_years,
            CoolantState::Liquid => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Fleet specs
// ---------------------------------------------------------------------------

/// Per-class specs for the two satellite classes making up a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSpec {
    pub satellite_count_a: u32,
    pub satellite_count_b: u32,
    pub power_per_a_kw: f64,
    pub power_per_b_kw: f64,
    pub compute_per_a_pflops: f64,
    pub compute_per_b_pflops: f64,
    #[serde(default = "default_radiator_area_a")]
    pub radiator_area_per_a_m2: f64,
    #[serde(default = "default_radiator_area_b")]
    pub radiator_area_per_b_m2: f64,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub health: FleetHealth,
}

fn default_radiator_area_a() -> f64 {
    5.0
}

fn default_radiator_area_b() -> f64 {
    12.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub emissivity: f64,
    pub eclipse_fraction: f64,
    pub shadowing_loss: f64,
    pub initial_temp_c: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            emissivity: 0.9,
            eclipse_fraction: 0.0,
            shadowing_loss: 0.0,
            initial_temp_c: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetHealth {
    /// Per-pod failures per year.
    pub failure_rate: f64,
    /// Repair throughput as a fraction of the fleet per year.
    pub maintenance_capacity_fraction: f64,
    pub manufacturing_rate_pods_per_year: f64,
}

impl Default for FleetHealth {
    fn default() -> Self {
        Self {
            failure_rate: 0.05,
            maintenance_capacity_fraction: 0.1,
            manufacturing_rate_pods_per_year: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub year: f64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MicrometeoroidStrike {
        damage_added: f64,
        damage_total: f64,
    },
    PumpFailed {
        /// Failed on restart after a coolant thaw rather than spontaneously.
        restart_failure: bool,
    },
    PumpRecovered,
    CoolantFroze {
        duration_hours: f64,
    },
    CoolantThawed,
    RadiatorOverdrive {
        load_ratio: f64,
    },
    ThermalDeath {
        death_fraction: f64,
        lost_fraction: f64,
    },
    MaintenanceOverload {
        ratio: f64,
    },
    ComputeCollapse,
}
