//! Probabilistic failure-mode injection.
//!
//! Each failure mode is its own small state machine with an explicit
//! transition function. Transitions run once per tick, before any heat is
//! computed, in a fixed order (radiator, pump, coolant) so that a seeded
//! `Rng` reproduces the same history.

use rand::Rng;

use crate::constants::{
    COOLANT_FREEZE_MAX_HOURS, COOLANT_FREEZE_MIN_HOURS, COOLANT_FREEZE_RATE,
    COOLANT_FREEZE_TEMP_C, ECLIPSE_OSCILLATION_THRESHOLD, HOURS_PER_YEAR,
    MICROMETEOROID_DAMAGE_MAX, MICROMETEOROID_DAMAGE_MIN, MICROMETEOROID_RATE_PER_POD_YEAR,
    PUMP_FAILURE_RATE_PER_POD_YEAR, PUMP_RECOVERY_PROBABILITY, PUMP_RESTART_FAILURE_RATE,
    RADIATOR_DAMAGE_CAP,
};
use crate::thermal::unit_fraction;
use crate::{CoolantState, Event, EventEnvelope, FailureModes, PumpState, RadiatorDamage};

/// Environment a tick's failure rolls are evaluated against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailureContext {
    pub year: f64,
    pub total_pods: f64,
    pub dt_years: f64,
    pub eclipse_fraction: f64,
    pub temp_radiator_c: f64,
}

/// Bernoulli draw with the probability clamped into `[0, 1]`.
fn roll(rng: &mut impl Rng, probability: f64) -> bool {
    rng.gen_bool(unit_fraction(probability))
}

impl RadiatorDamage {
    pub(crate) fn transition(
        self,
        ctx: &FailureContext,
        rng: &mut impl Rng,
        events: &mut Vec<EventEnvelope>,
    ) -> Self {
        let p_hit = MICROMETEOROID_RATE_PER_POD_YEAR * ctx.total_pods * ctx.dt_years;
        let current = unit_fraction(self.fraction).min(RADIATOR_DAMAGE_CAP);
        if !roll(rng, p_hit) {
            return RadiatorDamage { fraction: current };
        }
        let damage_added = rng.gen_range(MICROMETEOROID_DAMAGE_MIN..MICROMETEOROID_DAMAGE_MAX);
        let fraction = (current + damage_added).min(RADIATOR_DAMAGE_CAP);
        events.push(crate::emit(
            ctx.year,
            Event::MicrometeoroidStrike {
                damage_added,
                damage_total: fraction,
            },
        ));
        RadiatorDamage { fraction }
    }
}

impl PumpState {
    pub(crate) fn transition(
        self,
        ctx: &FailureContext,
        rng: &mut impl Rng,
        events: &mut Vec<EventEnvelope>,
    ) -> Self {
        match self {
            PumpState::Nominal => {
                let p_fail = PUMP_FAILURE_RATE_PER_POD_YEAR * ctx.total_pods * ctx.dt_years;
                if roll(rng, p_fail) {
                    events.push(crate::emit(
                        ctx.year,
                        Event::PumpFailed {
                            restart_failure: false,
                        },
                    ));
                    PumpState::Failed
                } else {
                    PumpState::Nominal
                }
            }
            PumpState::Failed => {
                if roll(rng, PUMP_RECOVERY_PROBABILITY) {
                    events.push(crate::emit(ctx.year, Event::PumpRecovered));
                    PumpState::Nominal
                } else {
                    PumpState::Failed
                }
            }
        }
    }
}

/// Result of a coolant transition. A thaw can knock the pump out on restart.
pub(crate) struct CoolantTransition {
    pub coolant: CoolantState,
    pub pump_restart_failed: bool,
}

impl CoolantState {
    pub(crate) fn transition(
        self,
        ctx: &FailureContext,
        rng: &mut impl Rng,
        events: &mut Vec<EventEnvelope>,
    ) -> CoolantTransition {
        let eclipse = unit_fraction(ctx.eclipse_fraction);
        match self {
            CoolantState::Frozen { remaining_years } => {
                let remaining_years = remaining_years - ctx.dt_years;
                if remaining_years > 0.0 {
                    return CoolantTransition {
                        coolant: CoolantState::Frozen { remaining_years },
                        pump_restart_failed: false,
                    };
                }
                events.push(crate::emit(ctx.year, Event::CoolantThawed));
                let pump_restart_failed = roll(rng, PUMP_RESTART_FAILURE_RATE * eclipse);
                CoolantTransition {
                    coolant: CoolantState::Liquid,
                    pump_restart_failed,
                }
            }
            CoolantState::Liquid => {
                let can_freeze = eclipse > ECLIPSE_OSCILLATION_THRESHOLD
                    && ctx.temp_radiator_c < COOLANT_FREEZE_TEMP_C;
                if !can_freeze || !roll(rng, COOLANT_FREEZE_RATE * eclipse) {
                    return CoolantTransition {
                        coolant: CoolantState::Liquid,
                        pump_restart_failed: false,
                    };
                }
                let duration_hours =
                    rng.gen_range(COOLANT_FREEZE_MIN_HOURS..COOLANT_FREEZE_MAX_HOURS);
                events.push(crate::emit(ctx.year, Event::CoolantFroze { duration_hours }));
                CoolantTransition {
                    coolant: CoolantState::Frozen {
                        remaining_years: duration_hours / HOURS_PER_YEAR,
                    },
                    pump_restart_failed: false,
                }
            }
        }
    }
}

/// Advance all failure modes by one tick.
pub(crate) fn advance_failure_modes(
    modes: FailureModes,
    ctx: &FailureContext,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> FailureModes {
    let radiator = modes.radiator.transition(ctx, rng, events);
    let mut pump = modes.pump.transition(ctx, rng, events);
    let coolant = modes.coolant.transition(ctx, rng, events);

    if coolant.pump_restart_failed && pump == PumpState::Nominal {
        events.push(crate::emit(
            ctx.year,
            Event::PumpFailed {
                restart_failure: true,
            },
        ));
        pump = PumpState::Failed;
    }

    FailureModes {
        radiator,
        pump,
        coolant: coolant.coolant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(total_pods: f64, dt_years: f64) -> FailureContext {
        FailureContext {
            year: 2030.0,
            total_pods,
            dt_years,
            eclipse_fraction: 0.0,
            temp_radiator_c: 20.0,
        }
    }

    #[test]
    fn test_certain_strike_adds_bounded_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut events = Vec::new();
        // p = 0.001 * 10_000 * 1 year >= 1
        let damage = RadiatorDamage::default().transition(&ctx(10_000.0, 1.0), &mut rng, &mut events);
        assert!(damage.fraction >= MICROMETEOROID_DAMAGE_MIN);
        assert!(damage.fraction < MICROMETEOROID_DAMAGE_MAX);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].event, Event::MicrometeoroidStrike { .. }));
    }

    #[test]
    fn test_radiator_damage_caps_at_half() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut events = Vec::new();
        let mut damage = RadiatorDamage { fraction: 0.49 };
        for _ in 0..100 {
            damage = damage.transition(&ctx(10_000.0, 1.0), &mut rng, &mut events);
        }
        assert!((damage.fraction - RADIATOR_DAMAGE_CAP).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_pods_never_strike_or_fail_pump() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let mut modes = FailureModes::default();
        for _ in 0..1000 {
            modes = advance_failure_modes(modes, &ctx(0.0, 1.0), &mut rng, &mut events);
        }
        assert_eq!(modes, FailureModes::default());
        assert!(events.is_empty());
    }

    #[test]
    fn test_failed_pump_eventually_recovers() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = Vec::new();
        let mut pump = PumpState::Failed;
        let mut ticks = 0;
        while pump == PumpState::Failed {
            pump = pump.transition(&ctx(0.0, 1.0), &mut rng, &mut events);
            ticks += 1;
            assert!(ticks < 1000, "pump never recovered");
        }
        assert_eq!(events.last().map(|e| &e.event), Some(&Event::PumpRecovered));
    }

    #[test]
    fn test_coolant_does_not_freeze_when_warm() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut events = Vec::new();
        let warm = FailureContext {
            eclipse_fraction: 1.0,
            temp_radiator_c: 0.0,
            ..ctx(1.0, 0.001)
        };
        for _ in 0..1000 {
            let result = CoolantState::Liquid.transition(&warm, &mut rng, &mut events);
            assert_eq!(result.coolant, CoolantState::Liquid);
        }
    }

    #[test]
    fn test_coolant_does_not_freeze_without_eclipse() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut events = Vec::new();
        let sunlit = FailureContext {
            eclipse_fraction: 0.1,
            temp_radiator_c: -100.0,
            ..ctx(1.0, 0.001)
        };
        for _ in 0..1000 {
            let result = CoolantState::Liquid.transition(&sunlit, &mut rng, &mut events);
            assert_eq!(result.coolant, CoolantState::Liquid);
        }
    }

    #[test]
    fn test_frozen_coolant_counts_down_then_thaws() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut events = Vec::new();
        let one_hour = ctx(1.0, 1.0 / HOURS_PER_YEAR);
        let mut coolant = CoolantState::Frozen {
            remaining_years: 2.5 / HOURS_PER_YEAR,
        };
        for _ in 0..2 {
            coolant = coolant.transition(&one_hour, &mut rng, &mut events).coolant;
            assert!(matches!(coolant, CoolantState::Frozen { .. }));
        }
        coolant = coolant.transition(&one_hour, &mut rng, &mut events).coolant;
        assert_eq!(coolant, CoolantState::Liquid);
        assert!(events.iter().any(|e| e.event == Event::CoolantThawed));
    }

    #[test]
    fn test_thaw_in_full_eclipse_can_fail_pump_restart() {
        let full_eclipse = FailureContext {
            eclipse_fraction: 1.0,
            ..ctx(0.0, 1.0)
        };
        // 15% restart failure per thaw: some seed in the first hundred hits it.
        let restart_failed = (0..100).any(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut events = Vec::new();
            let modes = FailureModes {
                coolant: CoolantState::Frozen {
                    remaining_years: 0.0,
                },
                ..FailureModes::default()
            };
            let next = advance_failure_modes(modes, &full_eclipse, &mut rng, &mut events);
            next.pump == PumpState::Failed
                && events.iter().any(|e| {
                    e.event
                        == Event::PumpFailed {
                            restart_failure: true,
                        }
                })
        });
        assert!(restart_failed);
    }
}
