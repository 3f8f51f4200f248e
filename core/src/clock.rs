//! Simulation clock — owns tick count, acceleration, pause, and the
//! wall-clock reference used to measure each tick's real elapsed time.
//!
//! The clock never reads the system time. Callers pass `now` in, so a
//! test can drive the engine with any sequence of timestamps.

use crate::{city::CalendarTime, types::Tick};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    pub acceleration: f64,
    pub paused:       bool,
    /// Reference point for the next tick's real elapsed time.
    pub last_update:  DateTime<Utc>,
}

impl SimClock {
    pub fn new(acceleration: f64, now: DateTime<Utc>) -> Self {
        Self {
            current_tick: 0,
            acceleration,
            paused: false,
            last_update: now,
        }
    }

    /// Count one completed tick. Returns the new tick number.
    /// Panics if called while paused — callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    /// Real seconds since the last reference point; moves the reference to `now`.
    pub fn take_elapsed(&mut self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.last_update).num_milliseconds();
        self.last_update = now;
        elapsed_ms as f64 / 1000.0
    }

    pub fn pause(&mut self) { self.paused = true; }

    /// Resume and restart the elapsed-time reference, so the paused
    /// interval is never counted as one huge tick.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.paused = false;
        self.last_update = now;
    }

    /// Clamp to [0, max]. Non-finite input leaves the factor unchanged.
    pub fn set_acceleration(&mut self, factor: f64, max: f64) -> f64 {
        if factor.is_finite() {
            self.acceleration = factor.clamp(0.0, max);
        }
        self.acceleration
    }
}

/// Advance the calendar by `hours` of simulated time.
///
/// Whole days carry out of the hour, days past 30 carry into months,
/// months past 12 carry into years. Any number of each may carry per call.
pub fn advance_calendar(time: &mut CalendarTime, hours: f64) {
    time.hour += hours;
    if time.hour < 24.0 {
        return;
    }

    time.day += (time.hour / 24.0).floor() as u32;
    time.hour %= 24.0;

    while time.day > DAYS_PER_MONTH {
        time.day -= DAYS_PER_MONTH;
        time.month += 1;
    }
    while time.month > MONTHS_PER_YEAR {
        time.month -= MONTHS_PER_YEAR;
        time.year += 1;
    }
}
