//! Fixed model constants. None of these are tunable per call.

pub const HOURS_PER_YEAR: f64 = 8760.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// Heat
/// Share of bus power doing useful work; the remainder is waste heat.
pub const ELECTRICAL_EFFICIENCY: f64 = 0.85;
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;
pub const T_SPACE_K: f64 = 2.7;
pub const KELVIN_OFFSET: f64 = 273.15;
pub const ACTIVE_COOLING_EFFICIENCY: f64 = 0.25;
pub const MAX_ACTIVE_COOLING_FRACTION: f64 = 0.15;
pub const PUMP_FAILURE_POWER_PENALTY: f64 = 1.3;

// Integration guards
pub const MIN_THERMAL_MASS_J_PER_C: f64 = 1e6;
pub const CAPACITY_EPSILON: f64 = 1e-6;
/// Deep-space floor for lumped temperatures.
pub const MIN_TEMP_C: f64 = T_SPACE_K - KELVIN_OFFSET;
/// Hard ceiling to keep runaway integration finite.
pub const MAX_TEMP_C: f64 = 1e6;

// Overdrive
pub const DEFICIT_AMPLIFICATION: f64 = 3.0;
pub const DEFICIT_EXPONENT: f64 = 2.5;
pub const OVERDRIVE_FACTOR: f64 = 2.0;
pub const OVERDRIVE_LOAD_RATIO: f64 = 1.10;
pub const OVERDRIVE_HEAT_MULTIPLIER: f64 = 1.5;
pub const OVERDRIVE_BURNOUT_DECAY: f64 = 0.98;
pub const OVERDRIVE_EMISSIVITY_DECAY: f64 = 0.99;
pub const ECLIPSE_OSCILLATION_THRESHOLD: f64 = 0.1;
pub const ECLIPSE_OSCILLATION_AMPLITUDE_C: f64 = 5.0;
pub const ECLIPSE_OSCILLATION_FREQUENCY: f64 = 0.5;

// Temperature bands
pub const SOFT_TEMP_LIMIT_C: f64 = 90.0;
pub const HARD_TEMP_LIMIT_C: f64 = 450.0;
/// Degrees above the hard limit at which the whole segment is lost.
pub const DEATH_SPAN_C: f64 = 100.0;
pub const DEFICIT_FAILURE_MULTIPLIER: f64 = 5.0;

// Backhaul
/// 1000 PFLOPs of exportable compute per Tbps of downlink.
pub const FLOPS_PER_TBPS: f64 = 1e18;
pub const FLOPS_PER_PFLOP: f64 = 1e15;
pub const BACKHAUL_TBPS_PER_SATELLITE: f64 = 0.05;

// Maintenance
pub const MAINTENANCE_SURVIVAL_DECAY: f64 = 0.9;
pub const MAINTENANCE_EFFICIENCY_DECAY: f64 = 0.95;

// Utilization caps
pub const UTILIZATION_CAP_PERCENT: f64 = 100.0;
pub const MAINTENANCE_UTILIZATION_CAP_PERCENT: f64 = 300.0;

// Failure-mode injection
pub const MICROMETEOROID_RATE_PER_POD_YEAR: f64 = 0.001;
pub const MICROMETEOROID_DAMAGE_MIN: f64 = 0.001;
pub const MICROMETEOROID_DAMAGE_MAX: f64 = 0.02;
pub const RADIATOR_DAMAGE_CAP: f64 = 0.5;
pub const PUMP_FAILURE_RATE_PER_POD_YEAR: f64 = 0.0005;
pub const PUMP_RECOVERY_PROBABILITY: f64 = 0.1;
pub const COOLANT_FREEZE_TEMP_C: f64 = -20.0;
pub const COOLANT_FREEZE_RATE: f64 = 0.01;
pub const COOLANT_FREEZE_MIN_HOURS: f64 = 2.0;
pub const COOLANT_FREEZE_MAX_HOURS: f64 = 6.0;
pub const PUMP_RESTART_FAILURE_RATE: f64 = 0.15;
pub const RADIATION_DOSE_PER_YEAR: f64 = 1.0;

// Satellite classes
pub const CLASS_A_THERMAL_MASS_J_PER_C: f64 = 2e6;
pub const CLASS_B_THERMAL_MASS_J_PER_C: f64 = 5e6;
pub const WARM_UP_DT_HOURS: f64 = 0.1;
