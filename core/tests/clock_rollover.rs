//! Calendar advance tests.
//!
//! Tests cover: hour/day/month/year rollover through the engine and
//! directly, acceleration scaling, and zero acceleration.

use chrono::{DateTime, Duration, TimeZone, Utc};
use citysim_core::{
    city::CalendarTime,
    clock::advance_calendar,
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    error::SimResult,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn config_at(time: CalendarTime) -> SimConfig {
    let mut config = SimConfig::default_test();
    config.initial_state.time = time;
    config
}

/// 23:30 on the last day of the year plus 90 simulated minutes lands at
/// 01:00 on the first day of the next year.
#[test]
fn year_end_rollover_through_engine() -> SimResult<()> {
    let config = config_at(CalendarTime { hour: 23.5, day: 30, month: 12, year: 2023 });
    let mut engine = SimEngine::build("rollover-test".into(), 1, config, t0())?;

    // 1.5 real seconds at 1x = 1.5 simulated hours.
    let outcome = engine.tick(t0() + Duration::milliseconds(1_500))?;
    assert!(matches!(outcome, TickOutcome::Completed { tick: 1, .. }), "{outcome:?}");

    assert_eq!(
        engine.city().time,
        CalendarTime { hour: 1.0, day: 1, month: 1, year: 2024 }
    );
    Ok(())
}

#[test]
fn year_end_rollover_direct() {
    let mut time = CalendarTime { hour: 23.5, day: 30, month: 12, year: 2023 };
    advance_calendar(&mut time, 1.5);
    assert_eq!(time, CalendarTime { hour: 1.0, day: 1, month: 1, year: 2024 });
}

#[test]
fn day_rollover_within_month() {
    let mut time = CalendarTime { hour: 22.0, day: 14, month: 6, year: 2023 };
    advance_calendar(&mut time, 5.0);
    assert_eq!(time, CalendarTime { hour: 3.0, day: 15, month: 6, year: 2023 });
}

#[test]
fn month_rollover_keeps_year() {
    let mut time = CalendarTime { hour: 20.0, day: 30, month: 6, year: 2023 };
    advance_calendar(&mut time, 6.0);
    assert_eq!(time, CalendarTime { hour: 2.0, day: 1, month: 7, year: 2023 });
}

/// Acceleration multiplies simulated time; zero acceleration freezes the calendar.
#[test]
fn acceleration_scales_simulated_hours() -> SimResult<()> {
    let config = config_at(CalendarTime { hour: 9.0, day: 15, month: 6, year: 2023 });
    let mut engine = SimEngine::build("accel-test".into(), 2, config, t0())?;

    engine.set_acceleration(4.0);
    engine.tick(t0() + Duration::seconds(2))?;
    assert_eq!(engine.city().time.hour, 17.0, "2s at 4x = 8 simulated hours");

    engine.set_acceleration(0.0);
    engine.tick(t0() + Duration::seconds(4))?;
    assert_eq!(engine.city().time.hour, 17.0, "0x freezes the calendar");
    Ok(())
}
