//! Player commands — the mutation API in serialisable form.
//!
//! The IPC driver decodes these from JSON and hands them to
//! `SimEngine::apply`. Direct callers may use the engine methods instead.

use crate::{
    event_subsystem::EventTrigger,
    policy_subsystem::PolicyActivation,
    types::{CityEventId, PolicyId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetAcceleration { factor: f64 },
    Reset,

    // ── City interventions ────────────────────────
    ActivatePolicy { policy_id: PolicyId },
    TriggerEvent { event_id: CityEventId },
}

/// What a command did. Invalid input is clamped or ignored, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Paused,
    Resumed,
    AccelerationSet { effective: f64 },
    Reset,
    Policy(PolicyActivation),
    Event(EventTrigger),
}
