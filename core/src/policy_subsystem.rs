//! Policies — user-activated interventions with a phased rollout.
//!
//! Lifecycle:
//!   1. `activate()` clones the catalog entry into the active list, zeroes
//!      progress and debits the full cost from the budget at once.
//!   2. Every tick, progress ramps linearly with simulated time:
//!      `sim_days × 100 / implementation_days`, capped at 100.
//!   3. From the tick progress reaches 100, the impact map is added to the
//!      city state every tick, undecayed, for as long as the policy is active.
//!
//! Policies are never deactivated; only a reset clears the active list.
//!
//! Execution: every tick, after noise and before the city event stage.

use crate::{
    city::CityState,
    error::SimResult,
    event::SimEvent,
    impact::ImpactMap,
    metric::MetricCategory,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::{PolicyId, HOURS_PER_DAY},
};
use serde::{Deserialize, Serialize};

pub const FULLY_IMPLEMENTED: f64 = 100.0;

/// A catalog entry. Read-only configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDefinition {
    pub id:                  PolicyId,
    pub name:                String,
    pub description:         String,
    /// One-time cost, in millions.
    pub cost:                f64,
    pub category:            MetricCategory,
    pub impact:              ImpactMap,
    /// Simulated days from activation to full effect.
    pub implementation_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivePolicy {
    #[serde(flatten)]
    pub definition:              PolicyDefinition,
    pub active:                  bool,
    /// 0-100
    pub implementation_progress: f64,
}

impl ActivePolicy {
    pub fn is_implemented(&self) -> bool {
        self.implementation_progress >= FULLY_IMPLEMENTED
    }
}

/// Result of an activation request. Unknown and repeated ids are no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyActivation {
    Activated { cost: f64 },
    UnknownPolicy,
    AlreadyActive,
}

impl PolicyActivation {
    pub fn is_activated(&self) -> bool {
        matches!(self, PolicyActivation::Activated { .. })
    }
}

pub struct PolicySubsystem {
    catalog: Vec<PolicyDefinition>,
    active:  Vec<ActivePolicy>,
}

impl PolicySubsystem {
    pub fn new(catalog: Vec<PolicyDefinition>) -> Self {
        Self { catalog, active: Vec::new() }
    }

    pub fn catalog(&self) -> &[PolicyDefinition] {
        &self.catalog
    }

    pub fn active(&self) -> &[ActivePolicy] {
        &self.active
    }

    pub fn is_active(&self, policy_id: &str) -> bool {
        self.active.iter().any(|p| p.definition.id == policy_id)
    }

    /// Activate a catalog policy and pay for it up front.
    /// No affordability check: the budget may go negative.
    pub fn activate(&mut self, policy_id: &str, city: &mut CityState) -> PolicyActivation {
        if self.is_active(policy_id) {
            return PolicyActivation::AlreadyActive;
        }
        let Some(definition) = self.catalog.iter().find(|p| p.id == policy_id) else {
            return PolicyActivation::UnknownPolicy;
        };

        let cost = definition.cost;
        self.active.push(ActivePolicy {
            definition:              definition.clone(),
            active:                  true,
            implementation_progress: 0.0,
        });
        city.economy.budget -= cost;

        log::info!(
            "policy {policy_id} activated: cost={cost:.1} budget={:.1}",
            city.economy.budget
        );
        PolicyActivation::Activated { cost }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Progress gained over `sim_hours` for a policy taking `implementation_days`.
pub fn progress_increment(sim_hours: f64, implementation_days: f64) -> f64 {
    (sim_hours / HOURS_PER_DAY) * FULLY_IMPLEMENTED / implementation_days
}

impl SimSubsystem for PolicySubsystem {
    fn name(&self) -> &'static str { "policy" }

    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        for policy in self.active.iter_mut().filter(|p| p.active) {
            if !policy.is_implemented() {
                let step = progress_increment(ctx.sim_hours, policy.definition.implementation_days);
                policy.implementation_progress =
                    (policy.implementation_progress + step).min(FULLY_IMPLEMENTED);

                if policy.is_implemented() {
                    log::info!("tick={} policy {} fully implemented", ctx.tick, policy.definition.id);
                    events.push(SimEvent::PolicyImplemented {
                        tick:      ctx.tick,
                        policy_id: policy.definition.id.clone(),
                    });
                }
            }

            if policy.is_implemented() {
                policy.definition.impact.apply(city);
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_day_policy_is_half_done_after_five_days() {
        assert_eq!(progress_increment(5.0 * 24.0, 10.0), 50.0);
        assert_eq!(progress_increment(0.0, 10.0), 0.0);
    }
}
