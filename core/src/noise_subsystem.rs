//! Noise — small bounded random fluctuations on every fluctuating metric.
//!
//! Execution: every tick, after the pattern stage.
//! All deltas are added first; budget is then carried by this tick's
//! revenue minus expenses; the full domain clamp runs last.
//!
//! RULE: Noise covers the flow metrics only. Stock and derived metrics
//! take none: peak demand (a high-water mark), treatment capacity and
//! green space (infrastructure), waste recycled, growth rate and
//! employment rate (moved only by policy and event impacts), and budget
//! (carried from revenue and expenses below).

use crate::{
    city::CityState,
    error::SimResult,
    event::SimEvent,
    metric::Metric,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
};

/// How a single metric fluctuates per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Noise {
    /// Uniform float delta in [min, max).
    Uniform(f64, f64),
    /// Uniform whole-number delta in [min, max].
    Integer(i64, i64),
    /// `step` added with probability `p`, otherwise nothing.
    Occasional { p: f64, step: f64 },
}

pub const NOISE_TABLE: [(Metric, Noise); 17] = [
    (Metric::CongestionLevel,      Noise::Uniform(-2.0, 2.0)),
    (Metric::VehiclesOnRoad,       Noise::Integer(-200, 200)),
    (Metric::PublicTransportUsage, Noise::Uniform(-1.0, 1.0)),
    (Metric::AccidentCount,        Noise::Occasional { p: 0.01, step: 1.0 }),
    (Metric::ElectricityUsage,     Noise::Uniform(-5.0, 8.0)),
    (Metric::RenewablePercentage,  Noise::Uniform(-0.5, 0.5)),
    (Metric::CarbonEmission,       Noise::Uniform(-2.0, 3.0)),
    (Metric::WaterConsumption,     Noise::Uniform(-3.0, 3.0)),
    (Metric::WaterQuality,         Noise::Uniform(-1.0, 1.0)),
    (Metric::ReservoirLevel,       Noise::Uniform(-0.5, 0.3)),
    (Metric::AirQualityIndex,      Noise::Uniform(-2.0, 2.0)),
    (Metric::NoiseLevel,           Noise::Uniform(-1.0, 1.0)),
    (Metric::Revenue,              Noise::Uniform(-0.5, 0.7)),
    (Metric::Expenses,             Noise::Uniform(-0.3, 0.6)),
    (Metric::HappinessIndex,       Noise::Uniform(-0.5, 0.5)),
    (Metric::CrimeRate,            Noise::Uniform(-0.1, 0.2)),
    (Metric::HealthIndex,          Noise::Uniform(-0.2, 0.2)),
];

impl Noise {
    pub fn sample(&self, rng: &mut SubsystemRng) -> f64 {
        match *self {
            Noise::Uniform(min, max) => rng.uniform(min, max),
            Noise::Integer(min, max) => rng.int_between(min, max),
            Noise::Occasional { p, step } => {
                if rng.chance(p) { step } else { 0.0 }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct NoiseSubsystem;

impl NoiseSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for NoiseSubsystem {
    fn name(&self) -> &'static str { "noise" }

    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        for (metric, noise) in NOISE_TABLE {
            city.add(metric, noise.sample(rng));
        }

        city.economy.budget += city.economy.revenue - city.economy.expenses;
        city.clamp_to_domain();

        log::debug!(
            "tick={} noise: budget={:.2} aqi={:.1}",
            ctx.tick,
            city.economy.budget,
            city.environment.air_quality_index
        );
        Ok(vec![])
    }
}
