//! The simulation event log — what happened during a tick or command.
//!
//! Not to be confused with city events (`event_subsystem`), which are
//! catalog-driven occurrences that perturb metrics. A `SimEvent` is a
//! record of an engine-level happening, returned to the caller and logged.

use crate::{
    event_subsystem::Severity,
    types::{CityEventId, PolicyId, Tick},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event emitted by the engine.
/// Variants may be appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
        sim_hours: f64,
    },
    TickCompleted {
        tick: Tick,
    },

    // ── Control events ─────────────────────────────
    AccelerationChanged {
        requested: f64,
        effective: f64,
    },
    SimulationPaused,
    SimulationResumed,
    SimulationReset,

    // ── Pattern events ─────────────────────────────
    PeakDemandRaised {
        tick: Tick,
        peak_demand: f64,
    },

    // ── Policy events ──────────────────────────────
    PolicyActivated {
        policy_id: PolicyId,
        cost: f64,
        budget_after: f64,
    },
    PolicyImplemented {
        tick: Tick,
        policy_id: PolicyId,
    },

    // ── City event lifecycle ───────────────────────
    CityEventStarted {
        event_id: CityEventId,
        instance_id: Uuid,
        severity: Severity,
    },
    CityEventResolved {
        tick: Tick,
        event_id: CityEventId,
        instance_id: Uuid,
    },
}

impl SimEvent {
    /// Stable string name for log lines and the IPC stream.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. }         => "tick_started",
            SimEvent::TickCompleted { .. }       => "tick_completed",
            SimEvent::AccelerationChanged { .. } => "acceleration_changed",
            SimEvent::SimulationPaused           => "simulation_paused",
            SimEvent::SimulationResumed          => "simulation_resumed",
            SimEvent::SimulationReset            => "simulation_reset",
            SimEvent::PeakDemandRaised { .. }    => "peak_demand_raised",
            SimEvent::PolicyActivated { .. }     => "policy_activated",
            SimEvent::PolicyImplemented { .. }   => "policy_implemented",
            SimEvent::CityEventStarted { .. }    => "city_event_started",
            SimEvent::CityEventResolved { .. }   => "city_event_resolved",
        }
    }
}
