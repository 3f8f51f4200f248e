//! Snapshot — an independent copy of everything a consumer may read.
//!
//! A snapshot owns its data; later ticks never show through it, and
//! mutating it never touches the engine.

use crate::{
    city::CityState,
    event_subsystem::ActiveCityEvent,
    policy_subsystem::{ActivePolicy, PolicyDefinition},
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSnapshot {
    pub run_id:          RunId,
    pub tick:            Tick,
    pub paused:          bool,
    pub acceleration:    f64,
    pub city:            CityState,
    pub active_policies: Vec<ActivePolicy>,
    pub active_events:   Vec<ActiveCityEvent>,
}

/// A catalog policy as offered to the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyListing {
    #[serde(flatten)]
    pub policy: PolicyDefinition,
    pub active: bool,
}
