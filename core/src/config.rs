use crate::{
    city::CityState,
    error::{SimError, SimResult},
    event_subsystem::CityEventDefinition,
    history::DEFAULT_HISTORY_CAPACITY,
    policy_subsystem::PolicyDefinition,
};
use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineTuning {
    /// Cadence the driver calls tick() at.
    pub tick_interval_ms:        u64,
    /// Ticks whose real elapsed time exceeds this are skipped whole.
    pub max_tick_delta_secs:     f64,
    pub initial_acceleration:    f64,
    pub max_acceleration:        f64,
    /// Samples kept per metric.
    pub history_capacity:        usize,
    /// Chance per tick of a new city event while below the cap.
    pub event_spawn_probability: f64,
    pub max_active_events:       usize,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            tick_interval_ms:        1_000,
            max_tick_delta_secs:     5.0,
            initial_acceleration:    1.0,
            max_acceleration:        10.0,
            history_capacity:        DEFAULT_HISTORY_CAPACITY,
            event_spawn_probability: 0.003,
            max_active_events:       2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PolicyCatalogFile {
    policies: Vec<PolicyDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventCatalogFile {
    events: Vec<CityEventDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tuning:        EngineTuning,
    pub initial_state: CityState,
    pub policies:      Vec<PolicyDefinition>,
    pub events:        Vec<CityEventDefinition>,
}

const TUNING_FILE: &str = "engine/tuning.json";
const INITIAL_STATE_FILE: &str = "city/initial_state.json";
const POLICY_CATALOG_FILE: &str = "catalog/policies.json";
const EVENT_CATALOG_FILE: &str = "catalog/events.json";

fn read_json<T: DeserializeOwned>(data_dir: &Path, file: &str) -> anyhow::Result<T> {
    let path = data_dir.join(file);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {}", path.display()))
}

fn parse_embedded<T: DeserializeOwned>(file: &str, content: &str) -> anyhow::Result<T> {
    serde_json::from_str(content).with_context(|| format!("Cannot parse built-in {file}"))
}

impl SimConfig {
    /// Load from a data/ directory.
    /// In tests, use SimConfig::builtin() or SimConfig::default_test().
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data_dir = data_dir.as_ref();
        let policies: PolicyCatalogFile = read_json(data_dir, POLICY_CATALOG_FILE)?;
        let events: EventCatalogFile = read_json(data_dir, EVENT_CATALOG_FILE)?;

        let config = Self {
            tuning:        read_json(data_dir, TUNING_FILE)?,
            initial_state: read_json(data_dir, INITIAL_STATE_FILE)?,
            policies:      policies.policies,
            events:        events.events,
        };
        config.validate()?;
        Ok(config)
    }

    /// The data/ directory shipped with the crate, compiled in.
    pub fn builtin() -> anyhow::Result<Self> {
        let policies: PolicyCatalogFile = parse_embedded(
            POLICY_CATALOG_FILE,
            include_str!("../../data/catalog/policies.json"),
        )?;
        let events: EventCatalogFile = parse_embedded(
            EVENT_CATALOG_FILE,
            include_str!("../../data/catalog/events.json"),
        )?;

        let config = Self {
            tuning: parse_embedded(TUNING_FILE, include_str!("../../data/engine/tuning.json"))?,
            initial_state: parse_embedded(
                INITIAL_STATE_FILE,
                include_str!("../../data/city/initial_state.json"),
            )?,
            policies: policies.policies,
            events:   events.events,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default tuning and initial state with empty catalogs, for unit tests
    /// that supply their own policies and events.
    pub fn default_test() -> Self {
        Self {
            tuning:        EngineTuning::default(),
            initial_state: CityState::default(),
            policies:      Vec::new(),
            events:        Vec::new(),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        let t = &self.tuning;
        if t.history_capacity == 0 {
            return Err(invalid("history_capacity must be at least 1"));
        }
        if !(0.0..=1.0).contains(&t.event_spawn_probability) {
            return Err(invalid(format!(
                "event_spawn_probability {} outside [0, 1]",
                t.event_spawn_probability
            )));
        }
        if !(t.max_acceleration >= 0.0) {
            return Err(invalid("max_acceleration must be non-negative"));
        }
        if !(t.max_tick_delta_secs > 0.0) {
            return Err(invalid("max_tick_delta_secs must be positive"));
        }

        let mut seen = HashSet::new();
        for policy in &self.policies {
            if !seen.insert(policy.id.as_str()) {
                return Err(invalid(format!("duplicate policy id '{}'", policy.id)));
            }
            if !(policy.implementation_days > 0.0) {
                return Err(invalid(format!(
                    "policy '{}' implementation_days must be positive",
                    policy.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for event in &self.events {
            if !seen.insert(event.id.as_str()) {
                return Err(invalid(format!("duplicate event id '{}'", event.id)));
            }
            if !(event.duration_hours >= 0.0) {
                return Err(invalid(format!(
                    "event '{}' duration_hours must be non-negative",
                    event.id
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig { reason: reason.into() }
}
