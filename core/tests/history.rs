//! Metric history tests.
//!
//! Tests cover: fixed capacity, FIFO eviction order, one sample per
//! completed tick, and copies that do not alias engine state.

use chrono::{DateTime, Duration, TimeZone, Utc};
use citysim_core::{
    config::SimConfig,
    engine::SimEngine,
    metric::Metric,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn build(run_id: &str, seed: u64) -> SimEngine {
    SimEngine::build(run_id.into(), seed, SimConfig::default_test(), t0()).expect("build engine")
}

#[test]
fn one_sample_per_completed_tick() {
    let mut engine = build("hist-count", 1);
    engine.run_ticks(25).unwrap();

    let history = engine.history();
    for metric in Metric::ALL {
        assert_eq!(history.len(metric), 25, "{metric}");
    }

    let latest = history.latest(Metric::Budget).expect("budget sample");
    assert_eq!(latest.timestamp, (t0() + Duration::seconds(25)).timestamp_millis());
    assert_eq!(latest.value, engine.city().economy.budget);
}

/// After 1001 ticks the first sample has been evicted: index 0 holds the
/// second tick's timestamp and every series is capped at 1000.
#[test]
fn capacity_is_enforced_oldest_first() {
    let mut engine = build("hist-cap", 2);
    engine.run_ticks(1_001).unwrap();

    for metric in Metric::ALL {
        let series = engine.series(metric);
        assert_eq!(series.len(), 1_000, "{metric}");
        assert_eq!(
            series[0].timestamp,
            (t0() + Duration::seconds(2)).timestamp_millis(),
            "{metric}: oldest retained sample should be tick 2"
        );
        assert_eq!(
            series[999].timestamp,
            (t0() + Duration::seconds(1_001)).timestamp_millis()
        );
    }

    engine.run_ticks(500).unwrap();
    assert!(Metric::ALL.iter().all(|m| engine.series(*m).len() == 1_000));
}

#[test]
fn configured_capacity_is_honoured() {
    let mut config = SimConfig::default_test();
    config.tuning.history_capacity = 10;
    let mut engine = SimEngine::build("hist-small".into(), 3, config, t0()).unwrap();

    engine.run_ticks(35).unwrap();

    let series = engine.series(Metric::AirQualityIndex);
    assert_eq!(series.len(), 10);
    assert_eq!(series[0].timestamp, (t0() + Duration::seconds(26)).timestamp_millis());
}

/// A history copy never sees later ticks.
#[test]
fn history_copy_is_detached() {
    let mut engine = build("hist-copy", 4);
    engine.run_ticks(5).unwrap();

    let copy = engine.history();
    engine.run_ticks(5).unwrap();

    assert_eq!(copy.len(Metric::CongestionLevel), 5);
    assert_eq!(engine.history().len(Metric::CongestionLevel), 10);
}
