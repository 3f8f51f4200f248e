//! Shared primitive types used across the entire simulation.

/// A completed simulation tick. Skipped and paused ticks do not count.
pub type Tick = u64;

/// Stable catalog identifier for a policy (e.g. "p1").
pub type PolicyId = String;

/// Stable catalog identifier for a city event (e.g. "e1").
pub type CityEventId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Milliseconds since the Unix epoch, as recorded in metric history.
pub type TimestampMs = i64;

pub const MS_PER_HOUR: f64 = 3_600_000.0;
pub const HOURS_PER_DAY: f64 = 24.0;
