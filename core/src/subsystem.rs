//! Stage trait and per-tick context.
//!
//! RULE: Every tick stage implements SimSubsystem.
//! The engine calls update() on each stage in a fixed order, every
//! completed tick. The order is documented in engine.rs.

use crate::{
    city::CityState,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    types::Tick,
};
use chrono::{DateTime, Utc};

/// Everything a stage may know about the tick being executed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickContext {
    pub tick:         Tick,
    /// Wall-clock time the tick was driven at.
    pub now:          DateTime<Utc>,
    /// Real seconds since the previous tick.
    pub delta_secs:   f64,
    pub acceleration: f64,
    /// `delta_secs × acceleration`.
    pub sim_hours:    f64,
}

impl TickContext {
    pub fn new(tick: Tick, now: DateTime<Utc>, delta_secs: f64, acceleration: f64) -> Self {
        Self {
            tick,
            now,
            delta_secs,
            acceleration,
            sim_hours: delta_secs * acceleration,
        }
    }
}

/// The contract every tick stage must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per completed tick by the engine.
    ///
    /// - `ctx`:  the tick being executed
    /// - `city`: the live city state; earlier stages have already run
    /// - `rng`:  this stage's deterministic RNG stream
    ///
    /// Returns events to add to the tick's event list.
    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}
