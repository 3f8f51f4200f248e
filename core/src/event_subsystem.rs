//! City events — catalog-driven occurrences that perturb the city while active.
//!
//! Lifecycle:
//!   - Spawned randomly (or triggered manually) from the catalog with a
//!     fresh start timestamp. At most one instance per catalog entry, and
//!     at most `max_active` at once.
//!   - While active, the impact map is added every tick.
//!   - Timed events retire once `(now − started_at) in hours × acceleration`
//!     reaches `duration_hours`. The retiring tick applies no delta.
//!   - `duration_hours == 0` is permanent: only a reset removes it.
//!
//! Execution: every tick, after the policy stage. Lifecycle first, then
//! one spawn draw; a newly spawned event first applies on the next tick.

use crate::{
    city::CityState,
    error::SimResult,
    event::SimEvent,
    impact::ImpactMap,
    metric::MetricCategory,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::{CityEventId, MS_PER_HOUR},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A catalog entry. Read-only configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityEventDefinition {
    pub id:             CityEventId,
    pub title:          String,
    pub description:    String,
    pub severity:       Severity,
    pub category:       MetricCategory,
    pub impact:         ImpactMap,
    /// Hours; 0 means permanent.
    pub duration_hours: f64,
}

impl CityEventDefinition {
    pub fn is_permanent(&self) -> bool {
        self.duration_hours == 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveCityEvent {
    #[serde(flatten)]
    pub definition:  CityEventDefinition,
    pub instance_id: Uuid,
    pub started_at:  DateTime<Utc>,
    pub active:      bool,
    pub resolved:    bool,
}

impl ActiveCityEvent {
    /// Elapsed event hours, scaled by the acceleration in force now.
    pub fn elapsed_hours(&self, now: DateTime<Utc>, acceleration: f64) -> f64 {
        let elapsed_ms = (now - self.started_at).num_milliseconds() as f64;
        elapsed_ms / MS_PER_HOUR * acceleration
    }

    pub fn has_expired(&self, now: DateTime<Utc>, acceleration: f64) -> bool {
        !self.definition.is_permanent()
            && self.elapsed_hours(now, acceleration) >= self.definition.duration_hours
    }
}

/// Result of a manual trigger request.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTrigger {
    Started { instance_id: Uuid },
    UnknownEvent,
    AlreadyActive,
    AtCapacity,
}

pub struct EventSubsystem {
    catalog:           Vec<CityEventDefinition>,
    active:            Vec<ActiveCityEvent>,
    spawn_probability: f64,
    max_active:        usize,
}

impl EventSubsystem {
    pub fn new(catalog: Vec<CityEventDefinition>, spawn_probability: f64, max_active: usize) -> Self {
        Self {
            catalog,
            active: Vec::new(),
            spawn_probability,
            max_active,
        }
    }

    pub fn catalog(&self) -> &[CityEventDefinition] {
        &self.catalog
    }

    pub fn active(&self) -> &[ActiveCityEvent] {
        &self.active
    }

    pub fn is_active(&self, event_id: &str) -> bool {
        self.active.iter().any(|e| e.definition.id == event_id)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Start a catalog event now, under the same dedup and cap rules as
    /// random spawning.
    pub fn trigger(
        &mut self,
        event_id: &str,
        now: DateTime<Utc>,
        rng: &mut SubsystemRng,
    ) -> (EventTrigger, Option<SimEvent>) {
        if self.is_active(event_id) {
            return (EventTrigger::AlreadyActive, None);
        }
        let Some(definition) = self.catalog.iter().find(|e| e.id == event_id).cloned() else {
            return (EventTrigger::UnknownEvent, None);
        };
        if self.active.len() >= self.max_active {
            return (EventTrigger::AtCapacity, None);
        }
        let (instance_id, started) = self.start(definition, now, rng);
        (EventTrigger::Started { instance_id }, Some(started))
    }

    fn start(
        &mut self,
        definition: CityEventDefinition,
        now: DateTime<Utc>,
        rng: &mut SubsystemRng,
    ) -> (Uuid, SimEvent) {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let instance_id = uuid::Builder::from_random_bytes(bytes).into_uuid();

        log::info!(
            "city event {} started: {} ({:?}, {}h)",
            definition.id,
            definition.title,
            definition.severity,
            definition.duration_hours
        );
        let started = SimEvent::CityEventStarted {
            event_id: definition.id.clone(),
            instance_id,
            severity: definition.severity,
        };
        self.active.push(ActiveCityEvent {
            definition,
            instance_id,
            started_at: now,
            active:     true,
            resolved:   false,
        });
        (instance_id, started)
    }

    /// Apply or retire every active event.
    fn run_lifecycle(&mut self, ctx: &TickContext, city: &mut CityState) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let mut kept = Vec::with_capacity(self.active.len());

        for mut event in self.active.drain(..) {
            if event.resolved {
                continue;
            }
            if event.has_expired(ctx.now, ctx.acceleration) {
                event.resolved = true;
                event.active = false;
                log::info!("tick={} city event {} resolved", ctx.tick, event.definition.id);
                events.push(SimEvent::CityEventResolved {
                    tick:        ctx.tick,
                    event_id:    event.definition.id.clone(),
                    instance_id: event.instance_id,
                });
                continue;
            }
            event.definition.impact.apply(city);
            kept.push(event);
        }

        self.active = kept;
        events
    }

    /// One spawn draw per tick while below the cap.
    fn maybe_spawn(&mut self, ctx: &TickContext, rng: &mut SubsystemRng) -> Option<SimEvent> {
        if self.active.len() >= self.max_active {
            return None;
        }
        if !rng.chance(self.spawn_probability) {
            return None;
        }

        let candidates: Vec<&CityEventDefinition> = self
            .catalog
            .iter()
            .filter(|def| !self.active.iter().any(|a| a.definition.id == def.id))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = rng.next_u64_below(candidates.len() as u64) as usize;
        let definition = candidates[pick].clone();
        let (_, started) = self.start(definition, ctx.now, rng);
        Some(started)
    }
}

impl SimSubsystem for EventSubsystem {
    fn name(&self) -> &'static str { "event" }

    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = self.run_lifecycle(ctx, city);
        events.extend(self.maybe_spawn(ctx, rng));
        Ok(events)
    }
}
