use orbit_core::{
    calculate_heat_rejection,
    constants::{ELECTRICAL_EFFICIENCY, FLOPS_PER_PFLOP, FLOPS_PER_TBPS, SOFT_TEMP_LIMIT_C},
    RiskMode, ThermalState,
};
use serde::{Deserialize, Serialize};

/// Produces a safe design for a fleet segment before the integrator runs.
pub trait DesignSource {
    fn propose(&mut self, state: &ThermalState) -> Option<SafeDesign>;
}

/// Requested design parameters. Capacities left as `None` keep the state's
/// current value. Compute and radiator area can only be clamped below what
/// the segment still has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignTargets {
    pub compute_pflops: f64,
    pub radiator_area_m2: Option<f64>,
    pub backhaul_tbps: Option<f64>,
    pub maintenance_capacity_pods: Option<f64>,
}

/// Fraction of each raw limit a risk mode is willing to design against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub thermal: f64,
    pub backhaul: f64,
    pub maintenance: f64,
}

impl Margins {
    /// `None` for YOLO: no clamp at all.
    pub fn for_mode(mode: RiskMode) -> Option<Self> {
        match mode {
            RiskMode::Safe => Some(Self {
                thermal: 0.7,
                backhaul: 0.9,
                maintenance: 0.9,
            }),
            RiskMode::Aggressive => Some(Self {
                thermal: 0.95,
                backhaul: 1.0,
                maintenance: 1.0,
            }),
            RiskMode::Yolo => None,
        }
    }
}

/// Which limit decided the designed compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignLimit {
    Requested,
    /// The segment's surviving nameplate compute.
    Nameplate,
    Thermal,
    Backhaul,
    Maintenance,
}

/// Raw compute ceilings in FLOPS, before margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeLimits {
    pub thermal_flops: f64,
    pub backhaul_flops: f64,
    pub maintenance_flops: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafeDesign {
    pub compute_flops: f64,
    pub power_kw: f64,
    pub radiator_area_m2: f64,
    pub backhaul_tbps: f64,
    pub maintenance_capacity_pods: f64,
    pub limits: ComputeLimits,
    pub binding: DesignLimit,
    pub risk_mode: RiskMode,
}

impl SafeDesign {
    /// Copy of `state` with the designed parameters written in.
    pub fn apply_to(&self, state: &ThermalState) -> ThermalState {
        ThermalState {
            compute_raw_flops: self.compute_flops,
            power_total_kw: self.power_kw,
            radiator_area_m2: self.radiator_area_m2,
            backhaul_tbps: self.backhaul_tbps,
            maintenance_capacity_pods: self.maintenance_capacity_pods,
            risk_mode: self.risk_mode,
            ..state.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// FLOPS delivered per kW of bus power in the current fleet mix.
fn flops_per_kw(state: &ThermalState) -> f64 {
    if state.power_total_kw > 0.0 {
        sanitize(state.compute_raw_flops / state.power_total_kw)
    } else {
        0.0
    }
}

/// Compute per pod in the current fleet mix.
fn flops_per_pod(state: &ThermalState) -> f64 {
    if state.total_pods > 0.0 {
        sanitize(state.compute_raw_flops / state.total_pods)
    } else {
        0.0
    }
}

/// Smallest candidate, keeping `first` on ties.
fn tightest(
    first: (f64, DesignLimit),
    candidates: impl IntoIterator<Item = (f64, DesignLimit)>,
) -> (f64, DesignLimit) {
    candidates.into_iter().fold(first, |best, candidate| {
        if candidate.0 < best.0 {
            candidate
        } else {
            best
        }
    })
}

/// Raw ceilings for a segment built with the given capacities. The thermal
/// ceiling holds the radiator at the soft limit under current damage,
/// burnout, eclipse and shadowing.
pub fn compute_limits(
    state: &ThermalState,
    radiator_area_m2: f64,
    backhaul_tbps: f64,
    maintenance_capacity_pods: f64,
) -> ComputeLimits {
    let effective_area = radiator_area_m2 * (1.0 - state.radiator_damage_fraction());
    let rejection = calculate_heat_rejection(
        effective_area,
        state.emissivity,
        SOFT_TEMP_LIMIT_C,
        state.eclipse_fraction,
        state.shadowing_loss,
    );
    let rejectable_kw = rejection.heat_reject_kw * state.radiator_burnout_factor;
    let max_power_kw = rejectable_kw / (1.0 - ELECTRICAL_EFFICIENCY);

    let maintenance_flops = if state.failure_rate > 0.0 {
        maintenance_capacity_pods / state.failure_rate * flops_per_pod(state)
    } else {
        f64::INFINITY
    };

    ComputeLimits {
        thermal_flops: sanitize(max_power_kw * flops_per_kw(state)),
        backhaul_flops: sanitize(backhaul_tbps * FLOPS_PER_TBPS),
        maintenance_flops: if maintenance_flops.is_nan() {
            0.0
        } else {
            maintenance_flops.max(0.0)
        },
    }
}

/// Clamp the requested compute to the risk mode's share of each limit.
pub fn clamp_design(
    state: &ThermalState,
    targets: &DesignTargets,
    risk_mode: RiskMode,
) -> SafeDesign {
    let nameplate_area_m2 = sanitize(state.radiator_area_m2);
    let radiator_area_m2 = sanitize(targets.radiator_area_m2.unwrap_or(nameplate_area_m2))
        .min(nameplate_area_m2);
    let backhaul_tbps = sanitize(targets.backhaul_tbps.unwrap_or(state.backhaul_tbps));
    let maintenance_capacity_pods = sanitize(
        targets
            .maintenance_capacity_pods
            .unwrap_or(state.maintenance_capacity_pods),
    );
    let requested = sanitize(targets.compute_pflops * FLOPS_PER_PFLOP);
    let limits = compute_limits(
        state,
        radiator_area_m2,
        backhaul_tbps,
        maintenance_capacity_pods,
    );

    let nameplate = (sanitize(state.compute_raw_flops), DesignLimit::Nameplate);
    let (compute_flops, binding) = match Margins::for_mode(risk_mode) {
        None => tightest((requested, DesignLimit::Requested), [nameplate]),
        Some(margins) => {
            let candidates = [
                nameplate,
                (limits.thermal_flops * margins.thermal, DesignLimit::Thermal),
                (limits.backhaul_flops * margins.backhaul, DesignLimit::Backhaul),
                (
                    limits.maintenance_flops * margins.maintenance,
                    DesignLimit::Maintenance,
                ),
            ];
            tightest((requested, DesignLimit::Requested), candidates)
        }
    };

    let nameplate_kw = sanitize(state.power_total_kw);
    let per_kw = flops_per_kw(state);
    let power_kw = if per_kw > 0.0 {
        (compute_flops / per_kw).min(nameplate_kw)
    } else {
        nameplate_kw
    };

    SafeDesign {
        compute_flops,
        power_kw,
        radiator_area_m2,
        backhaul_tbps,
        maintenance_capacity_pods,
        limits,
        binding,
        risk_mode,
    }
}

/// Applies `clamp_design` whenever the segment has auto-design turned on.
pub struct AutoDesigner {
    pub targets: DesignTargets,
}

impl AutoDesigner {
    pub fn new(targets: DesignTargets) -> Self {
        Self { targets }
    }

    /// `state` with the safe design applied, or an unchanged copy when
    /// auto-design is off.
    pub fn prepare(&mut self, state: &ThermalState) -> ThermalState {
        match self.propose(state) {
            Some(design) => design.apply_to(state),
            None => state.clone(),
        }
    }
}

impl DesignSource for AutoDesigner {
    fn propose(&mut self, state: &ThermalState) -> Option<SafeDesign> {
        if !state.auto_design_mode {
            return None;
        }
        Some(clamp_design(state, &self.targets, state.risk_mode))
    }
}
