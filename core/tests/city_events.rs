//! City event lifecycle tests.
//!
//! Tests cover: per-tick impact while active, retirement at duration
//! scaled by acceleration, permanent events, the active cap, and manual
//! trigger outcomes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use citysim_core::{
    city::CityState,
    config::SimConfig,
    engine::SimEngine,
    error::SimResult,
    event::SimEvent,
    event_subsystem::{CityEventDefinition, EventSubsystem, EventTrigger, Severity},
    impact::ImpactMap,
    metric::{Metric, MetricCategory},
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
};
use std::collections::HashSet;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn festival(duration_hours: f64) -> CityEventDefinition {
    CityEventDefinition {
        id:             "fest".into(),
        title:          "Street Festival".into(),
        description:    "Crowds downtown".into(),
        severity:       Severity::Info,
        category:       MetricCategory::Social,
        impact:         ImpactMap::new().with(Metric::HappinessIndex, 1.0),
        duration_hours,
    }
}

fn ctx_at(tick: u64, hours_after_start: i64, acceleration: f64) -> TickContext {
    TickContext::new(tick, t0() + Duration::hours(hours_after_start), 1.0, acceleration)
}

/// Quiet stage: no random spawns.
fn stage(catalog: Vec<CityEventDefinition>) -> EventSubsystem {
    EventSubsystem::new(catalog, 0.0, 2)
}

#[test]
fn timed_event_applies_until_duration_then_retires() -> SimResult<()> {
    let mut events = stage(vec![festival(48.0)]);
    let mut rng = SubsystemRng::new(1, 3);
    let mut city = CityState::default();
    let happiness = city.social.happiness_index;

    let (outcome, started) = events.trigger("fest", t0(), &mut rng);
    assert!(matches!(outcome, EventTrigger::Started { .. }));
    assert!(matches!(started, Some(SimEvent::CityEventStarted { severity: Severity::Info, .. })));

    let emitted = events.update(&ctx_at(1, 47, 1.0), &mut city, &mut rng)?;
    assert!(emitted.is_empty());
    assert_eq!(city.social.happiness_index, happiness + 1.0, "47h: still active");

    let emitted = events.update(&ctx_at(2, 48, 1.0), &mut city, &mut rng)?;
    assert!(matches!(
        emitted.as_slice(),
        [SimEvent::CityEventResolved { tick: 2, event_id, .. }] if event_id == "fest"
    ));
    assert_eq!(city.social.happiness_index, happiness + 1.0, "retiring tick applies nothing");
    assert!(events.active().is_empty());

    events.update(&ctx_at(3, 49, 1.0), &mut city, &mut rng)?;
    assert_eq!(city.social.happiness_index, happiness + 1.0);
    Ok(())
}

#[test]
fn acceleration_shortens_event_lifetime() -> SimResult<()> {
    let mut events = stage(vec![festival(48.0)]);
    let mut rng = SubsystemRng::new(2, 3);
    let mut city = CityState::default();

    events.trigger("fest", t0(), &mut rng);
    let emitted = events.update(&ctx_at(1, 24, 2.0), &mut city, &mut rng)?;

    assert_eq!(emitted.len(), 1, "24 real hours at 2x = 48 event hours");
    assert!(events.active().is_empty());
    Ok(())
}

#[test]
fn permanent_event_never_retires() -> SimResult<()> {
    let mut events = stage(vec![festival(0.0)]);
    let mut rng = SubsystemRng::new(3, 3);
    let mut city = CityState::default();
    let happiness = city.social.happiness_index;

    events.trigger("fest", t0(), &mut rng);
    for (tick, hours) in [(1, 1), (2, 1_000), (3, 100_000)] {
        let emitted = events.update(&ctx_at(tick, hours, 10.0), &mut city, &mut rng)?;
        assert!(emitted.is_empty());
    }
    assert_eq!(events.active().len(), 1);
    assert_eq!(city.social.happiness_index, happiness + 3.0);
    Ok(())
}

#[test]
fn trigger_outcomes() -> SimResult<()> {
    let mut engine = SimEngine::build_test("event-trigger".into(), 4, t0())?;
    assert_eq!(engine.event_catalog().len(), 4);

    assert_eq!(engine.trigger_event("e9", t0()), EventTrigger::UnknownEvent);
    assert!(matches!(engine.trigger_event("e1", t0()), EventTrigger::Started { .. }));
    assert_eq!(engine.trigger_event("e1", t0()), EventTrigger::AlreadyActive);
    assert!(matches!(engine.trigger_event("e2", t0()), EventTrigger::Started { .. }));
    assert_eq!(engine.trigger_event("e3", t0()), EventTrigger::AtCapacity);

    let active = engine.active_events();
    assert_eq!(active.len(), 2);
    assert_ne!(active[0].instance_id, active[1].instance_id);
    assert!(active.iter().all(|e| e.active && !e.resolved && e.started_at == t0()));
    Ok(())
}

/// Even with a spawn on every tick, never more than two events are active
/// and never two instances of the same catalog entry.
#[test]
fn spawn_respects_cap_and_uniqueness() -> SimResult<()> {
    let mut config = SimConfig::builtin()?;
    config.tuning.event_spawn_probability = 1.0;
    let mut engine = SimEngine::build("event-cap".into(), 5, config, t0())?;

    let mut spawned = 0;
    for step in 1..=200 {
        let events = engine.run_ticks(1)?;
        spawned += events
            .iter()
            .filter(|e| matches!(e, SimEvent::CityEventStarted { .. }))
            .count();

        let active = engine.active_events();
        assert!(active.len() <= 2, "step {step}: {} active", active.len());
        let ids: HashSet<_> = active.iter().map(|e| e.definition.id.as_str()).collect();
        assert_eq!(ids.len(), active.len(), "step {step}: duplicate catalog entry");
    }
    assert_eq!(spawned, 2, "cap reached on the first two ticks and never freed");
    Ok(())
}
