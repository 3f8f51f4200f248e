//! The simulation engine — owns the city and every piece of mutable state.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Clock       — calendar advances by real elapsed × acceleration
//!   1. Pattern     — time-of-day nudges to traffic and energy
//!   2. Noise       — bounded random deltas, budget carry, domain clamp
//!   3. Policy      — implementation ramp, then per-tick impacts
//!   4. Event       — city event impacts, retirement, spawn draw
//!   5. Budget      — hourly accrual of revenue minus expenses
//!   6. Clamp       — every metric back into its domain
//!   7. History     — one sample per metric
//!
//! RULES:
//!   - The engine never spawns its own timer. The caller drives tick(now).
//!   - A tick either completes in full or is skipped in full.
//!   - Readers get copies; all mutation goes through engine methods.
//!   - All randomness flows through per-stage RNG streams from one seed.

use crate::{
    budget_subsystem::BudgetSubsystem,
    city::CityState,
    clock::{advance_calendar, SimClock},
    command::{CommandOutcome, PlayerCommand},
    config::SimConfig,
    error::SimResult,
    event::SimEvent,
    event_subsystem::{ActiveCityEvent, CityEventDefinition, EventSubsystem, EventTrigger},
    history::{DataPoint, MetricHistory},
    metric::Metric,
    noise_subsystem::NoiseSubsystem,
    pattern_subsystem::PatternSubsystem,
    policy_subsystem::{ActivePolicy, PolicyActivation, PolicySubsystem},
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    snapshot::{PolicyListing, SimSnapshot},
    subsystem::{SimSubsystem, TickContext},
    types::{RunId, Tick},
};
use chrono::{DateTime, Duration, Utc};

/// What a call to tick() did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Engine is paused; nothing changed.
    Paused,
    /// Real elapsed time was out of range; nothing changed except the
    /// elapsed-time reference, which moved to `now`.
    Skipped { delta_secs: f64 },
    Completed { tick: Tick, events: Vec<SimEvent> },
}

/// One RNG stream per stage, created once per engine.
struct StageRngs {
    pattern: SubsystemRng,
    noise:   SubsystemRng,
    policy:  SubsystemRng,
    event:   SubsystemRng,
    budget:  SubsystemRng,
}

impl StageRngs {
    fn new(bank: &RngBank) -> Self {
        Self {
            pattern: bank.for_subsystem(SubsystemSlot::Pattern),
            noise:   bank.for_subsystem(SubsystemSlot::Noise),
            policy:  bank.for_subsystem(SubsystemSlot::Policy),
            event:   bank.for_subsystem(SubsystemSlot::Event),
            budget:  bank.for_subsystem(SubsystemSlot::Budget),
        }
    }
}

pub struct SimEngine {
    pub run_id: RunId,
    clock:      SimClock,
    config:     SimConfig,
    city:       CityState,
    patterns:   PatternSubsystem,
    noise:      NoiseSubsystem,
    policies:   PolicySubsystem,
    events:     EventSubsystem,
    budget:     BudgetSubsystem,
    history:    MetricHistory,
    rngs:       StageRngs,
}

impl SimEngine {
    /// Build a fully wired engine. The engine starts running, with its
    /// elapsed-time reference at `now`.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig, now: DateTime<Utc>) -> SimResult<Self> {
        config.validate()?;
        let tuning = &config.tuning;
        let rng_bank = RngBank::new(seed);

        let engine = Self {
            clock:    SimClock::new(tuning.initial_acceleration, now),
            city:     config.initial_state.clone(),
            patterns: PatternSubsystem::new(),
            noise:    NoiseSubsystem::new(),
            policies: PolicySubsystem::new(config.policies.clone()),
            events:   EventSubsystem::new(
                config.events.clone(),
                tuning.event_spawn_probability,
                tuning.max_active_events,
            ),
            budget:   BudgetSubsystem::new(),
            history:  MetricHistory::new(tuning.history_capacity),
            rngs:     StageRngs::new(&rng_bank),
            config,
            run_id,
        };
        log::debug!("engine {} built with seed {seed}", engine.run_id);
        Ok(engine)
    }

    /// Engine on the built-in data/ configuration.
    pub fn build_test(run_id: RunId, seed: u64, now: DateTime<Utc>) -> SimResult<Self> {
        Self::build(run_id, seed, SimConfig::builtin()?, now)
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Execute one tick driven at wall-clock time `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> SimResult<TickOutcome> {
        if self.clock.paused {
            return Ok(TickOutcome::Paused);
        }

        let delta_secs = self.clock.take_elapsed(now);
        if delta_secs > self.config.tuning.max_tick_delta_secs || delta_secs < 0.0 {
            log::warn!("{}: skipping tick, real delta {delta_secs:.3}s out of range", self.run_id);
            return Ok(TickOutcome::Skipped { delta_secs });
        }

        let current_tick = self.clock.advance();
        let ctx = TickContext::new(current_tick, now, delta_secs, self.clock.acceleration);
        advance_calendar(&mut self.city.time, ctx.sim_hours);

        let mut tick_events = vec![SimEvent::TickStarted {
            tick:      current_tick,
            sim_hours: ctx.sim_hours,
        }];

        let stages: [(&mut dyn SimSubsystem, &mut SubsystemRng); 5] = [
            (&mut self.patterns, &mut self.rngs.pattern),
            (&mut self.noise, &mut self.rngs.noise),
            (&mut self.policies, &mut self.rngs.policy),
            (&mut self.events, &mut self.rngs.event),
            (&mut self.budget, &mut self.rngs.budget),
        ];
        for (stage, rng) in stages {
            let new_events = stage.update(&ctx, &mut self.city, rng)?;
            for event in &new_events {
                log::debug!("tick={current_tick} {}: {}", stage.name(), event.type_name());
            }
            tick_events.extend(new_events);
        }

        // Policy and event deltas land after the noise clamp.
        self.city.clamp_to_domain();
        self.history.record(now.timestamp_millis(), &self.city);

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        Ok(TickOutcome::Completed { tick: current_tick, events: tick_events })
    }

    /// Drive n ticks on a synthetic clock, one tick interval apart,
    /// starting from the current elapsed-time reference.
    /// Used for testing and headless fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        let step = Duration::milliseconds(self.config.tuning.tick_interval_ms as i64);
        let mut now = self.clock.last_update;
        let mut all_events = Vec::new();
        for _ in 0..n {
            now += step;
            if let TickOutcome::Completed { events, .. } = self.tick(now)? {
                all_events.extend(events);
            }
        }
        Ok(all_events)
    }

    // ── Mutation API ───────────────────────────────────────────

    pub fn activate_policy(&mut self, policy_id: &str) -> PolicyActivation {
        self.policies.activate(policy_id, &mut self.city)
    }

    pub fn trigger_event(&mut self, event_id: &str, now: DateTime<Utc>) -> EventTrigger {
        self.events.trigger(event_id, now, &mut self.rngs.event).0
    }

    /// Clamp to [0, max_acceleration]; returns the factor now in force.
    pub fn set_acceleration(&mut self, factor: f64) -> f64 {
        self.clock.set_acceleration(factor, self.config.tuning.max_acceleration)
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.clock.resume(now);
    }

    /// Back to the configured initial state: no policies, no events,
    /// empty history, tick count zero. Acceleration and pause state stay.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.city = self.config.initial_state.clone();
        self.policies.clear();
        self.events.clear();
        self.history.clear();
        self.clock.current_tick = 0;
        self.clock.last_update = now;
        log::info!("{}: simulation reset", self.run_id);
    }

    /// Apply a decoded player command. Returns the outcome and the
    /// events it produced.
    pub fn apply(
        &mut self,
        command: PlayerCommand,
        now: DateTime<Utc>,
    ) -> (CommandOutcome, Vec<SimEvent>) {
        match command {
            PlayerCommand::Pause => {
                self.pause();
                (CommandOutcome::Paused, vec![SimEvent::SimulationPaused])
            }
            PlayerCommand::Resume => {
                self.resume(now);
                (CommandOutcome::Resumed, vec![SimEvent::SimulationResumed])
            }
            PlayerCommand::SetAcceleration { factor } => {
                let effective = self.set_acceleration(factor);
                (
                    CommandOutcome::AccelerationSet { effective },
                    vec![SimEvent::AccelerationChanged { requested: factor, effective }],
                )
            }
            PlayerCommand::Reset => {
                self.reset(now);
                (CommandOutcome::Reset, vec![SimEvent::SimulationReset])
            }
            PlayerCommand::ActivatePolicy { policy_id } => {
                let outcome = self.activate_policy(&policy_id);
                let events = match &outcome {
                    PolicyActivation::Activated { cost } => vec![SimEvent::PolicyActivated {
                        policy_id,
                        cost:         *cost,
                        budget_after: self.city.economy.budget,
                    }],
                    _ => vec![],
                };
                (CommandOutcome::Policy(outcome), events)
            }
            PlayerCommand::TriggerEvent { event_id } => {
                let (outcome, event) = self.events.trigger(&event_id, now, &mut self.rngs.event);
                (CommandOutcome::Event(outcome), event.into_iter().collect())
            }
        }
    }

    // ── Read API (copies only) ─────────────────────────────────

    pub fn city(&self) -> CityState {
        self.city.clone()
    }

    pub fn active_policies(&self) -> Vec<ActivePolicy> {
        self.policies.active().to_vec()
    }

    pub fn active_events(&self) -> Vec<ActiveCityEvent> {
        self.events.active().to_vec()
    }

    /// Every catalog policy with whether it is currently active.
    pub fn available_policies(&self) -> Vec<PolicyListing> {
        self.policies
            .catalog()
            .iter()
            .map(|p| PolicyListing {
                active: self.policies.is_active(&p.id),
                policy: p.clone(),
            })
            .collect()
    }

    pub fn event_catalog(&self) -> Vec<CityEventDefinition> {
        self.events.catalog().to_vec()
    }

    /// Deep copy of every metric's history.
    pub fn history(&self) -> MetricHistory {
        self.history.clone()
    }

    pub fn series(&self, metric: Metric) -> Vec<DataPoint> {
        self.history
            .series(metric)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id:          self.run_id.clone(),
            tick:            self.clock.current_tick,
            paused:          self.clock.paused,
            acceleration:    self.clock.acceleration,
            city:            self.city(),
            active_policies: self.active_policies(),
            active_events:   self.active_events(),
        }
    }
}
