//! Time-of-day patterns — rush hours, the night lull, the evening energy peak.
//!
//! Execution: every tick, first stage after the calendar advance.
//! Reads only `city.time.hour`; nudges traffic and energy by uniform
//! random amounts drawn from fixed bands. Each nudge clamps its own
//! field; the noise stage applies the full domain clamp afterwards.

use crate::{
    city::CityState,
    error::SimResult,
    event::SimEvent,
    metric::MAX_VEHICLES_ON_ROAD,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
};

/// Floor for vehicles on the road during the night lull.
pub const NIGHT_MIN_VEHICLES: f64 = 1_000.0;
/// Electricity usage bounds while a pattern band is active (MW).
pub const PATTERN_MAX_ELECTRICITY: f64 = 500.0;
pub const NIGHT_MIN_ELECTRICITY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficBand {
    MorningRush,
    EveningRush,
    Night,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyBand {
    EveningPeak,
    NightLow,
    Normal,
}

impl TrafficBand {
    pub fn at(hour: f64) -> Self {
        if (7.0..=9.0).contains(&hour) {
            Self::MorningRush
        } else if (16.0..=18.0).contains(&hour) {
            Self::EveningRush
        } else if hour >= 22.0 || hour <= 5.0 {
            Self::Night
        } else {
            Self::Normal
        }
    }
}

impl EnergyBand {
    pub fn at(hour: f64) -> Self {
        if (18.0..=22.0).contains(&hour) {
            Self::EveningPeak
        } else if (0.0..=5.0).contains(&hour) {
            Self::NightLow
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Default)]
pub struct PatternSubsystem;

impl PatternSubsystem {
    pub fn new() -> Self {
        Self
    }

    fn apply_traffic(&self, city: &mut CityState, rng: &mut SubsystemRng) {
        let traffic = &mut city.traffic;
        match TrafficBand::at(city.time.hour) {
            TrafficBand::MorningRush => {
                traffic.congestion_level =
                    (traffic.congestion_level + rng.uniform(10.0, 20.0)).clamp(0.0, 100.0);
                traffic.vehicles_on_road = (traffic.vehicles_on_road + rng.int_between(2_000, 4_000))
                    .clamp(0.0, MAX_VEHICLES_ON_ROAD);
            }
            TrafficBand::EveningRush => {
                traffic.congestion_level =
                    (traffic.congestion_level + rng.uniform(15.0, 25.0)).clamp(0.0, 100.0);
                traffic.vehicles_on_road = (traffic.vehicles_on_road + rng.int_between(3_000, 5_000))
                    .clamp(0.0, MAX_VEHICLES_ON_ROAD);
            }
            TrafficBand::Night => {
                traffic.congestion_level =
                    (traffic.congestion_level - rng.uniform(30.0, 40.0)).clamp(0.0, 100.0);
                traffic.vehicles_on_road = (traffic.vehicles_on_road - rng.int_between(6_000, 10_000))
                    .clamp(NIGHT_MIN_VEHICLES, MAX_VEHICLES_ON_ROAD);
            }
            TrafficBand::Normal => {}
        }
    }

    /// Returns the new peak demand when the evening peak raised it.
    fn apply_energy(&self, city: &mut CityState, rng: &mut SubsystemRng) -> Option<f64> {
        let energy = &mut city.energy;
        match EnergyBand::at(city.time.hour) {
            EnergyBand::EveningPeak => {
                energy.electricity_usage = (energy.electricity_usage + rng.uniform(30.0, 50.0))
                    .clamp(0.0, PATTERN_MAX_ELECTRICITY);
                if energy.electricity_usage > energy.peak_demand {
                    energy.peak_demand = energy.electricity_usage;
                    return Some(energy.peak_demand);
                }
                None
            }
            EnergyBand::NightLow => {
                energy.electricity_usage = (energy.electricity_usage - rng.uniform(100.0, 150.0))
                    .clamp(NIGHT_MIN_ELECTRICITY, PATTERN_MAX_ELECTRICITY);
                None
            }
            EnergyBand::Normal => None,
        }
    }
}

impl SimSubsystem for PatternSubsystem {
    fn name(&self) -> &'static str { "pattern" }

    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        self.apply_traffic(city, rng);
        let raised = self.apply_energy(city, rng);

        log::debug!(
            "tick={} pattern: hour={:.2} congestion={:.1} usage={:.1}",
            ctx.tick,
            city.time.hour,
            city.traffic.congestion_level,
            city.energy.electricity_usage
        );

        Ok(raised
            .map(|peak_demand| SimEvent::PeakDemandRaised { tick: ctx.tick, peak_demand })
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, SubsystemSlot};
    use chrono::Utc;

    const SEEDS: std::ops::Range<u64> = 0..50;

    fn city_at(hour: f64) -> CityState {
        let mut city = CityState::default();
        city.time.hour = hour;
        city
    }

    /// One pattern update on `city` with the given seed.
    fn run(city: &mut CityState, seed: u64) -> Vec<SimEvent> {
        let mut rng = RngBank::new(seed).for_subsystem(SubsystemSlot::Pattern);
        let ctx = TickContext::new(1, Utc::now(), 1.0, 1.0);
        PatternSubsystem::new().update(&ctx, city, &mut rng).unwrap()
    }

    #[test]
    fn morning_rush_raises_traffic_only() {
        for seed in SEEDS {
            let before = city_at(8.0);
            let mut city = before.clone();
            let events = run(&mut city, seed);

            let congestion = city.traffic.congestion_level - before.traffic.congestion_level;
            let vehicles = city.traffic.vehicles_on_road - before.traffic.vehicles_on_road;
            assert!((10.0..=20.0).contains(&congestion), "seed {seed}: {congestion}");
            assert!((2_000.0..=4_000.0).contains(&vehicles), "seed {seed}: {vehicles}");
            assert_eq!(vehicles.fract(), 0.0);
            assert_eq!(city.energy, before.energy, "08:00 is outside both energy bands");
            assert!(events.is_empty());
        }
    }

    #[test]
    fn evening_rush_raises_traffic_more() {
        for seed in SEEDS {
            let before = city_at(17.0);
            let mut city = before.clone();
            run(&mut city, seed);

            let congestion = city.traffic.congestion_level - before.traffic.congestion_level;
            let vehicles = city.traffic.vehicles_on_road - before.traffic.vehicles_on_road;
            assert!((15.0..=25.0).contains(&congestion), "seed {seed}: {congestion}");
            assert!((3_000.0..=5_000.0).contains(&vehicles), "seed {seed}: {vehicles}");
            assert_eq!(city.energy, before.energy);
        }
    }

    #[test]
    fn rush_hour_clamps_at_the_ceiling() {
        let mut city = city_at(17.0);
        city.traffic.congestion_level = 95.0;
        city.traffic.vehicles_on_road = 29_000.0;
        run(&mut city, 4);

        assert_eq!(city.traffic.congestion_level, 100.0);
        assert_eq!(city.traffic.vehicles_on_road, MAX_VEHICLES_ON_ROAD);
    }

    #[test]
    fn evening_peak_raises_usage_and_peak_demand() {
        for seed in SEEDS {
            let mut city = city_at(20.0);
            city.energy.electricity_usage = 310.0;
            city.energy.peak_demand = 300.0;
            let traffic_before = city.traffic.clone();
            let events = run(&mut city, seed);

            let usage = city.energy.electricity_usage;
            assert!((340.0..=360.0).contains(&usage), "seed {seed}: {usage}");
            assert_eq!(city.energy.peak_demand, usage, "peak follows a new high");
            assert_eq!(
                events,
                vec![SimEvent::PeakDemandRaised { tick: 1, peak_demand: usage }]
            );
            assert_eq!(city.traffic, traffic_before, "20:00 is outside the traffic bands");
        }
    }

    #[test]
    fn evening_peak_below_high_water_mark_keeps_peak() {
        let mut city = city_at(20.0);
        city.energy.electricity_usage = 310.0;
        city.energy.peak_demand = 480.0;
        let events = run(&mut city, 9);

        assert!(city.energy.electricity_usage < 480.0);
        assert_eq!(city.energy.peak_demand, 480.0);
        assert!(events.is_empty());
    }

    #[test]
    fn late_night_lowers_traffic() {
        for seed in SEEDS {
            let before = city_at(23.0);
            let mut city = before.clone();
            run(&mut city, seed);

            let congestion = before.traffic.congestion_level - city.traffic.congestion_level;
            let vehicles = before.traffic.vehicles_on_road - city.traffic.vehicles_on_road;
            assert!((30.0..=40.0).contains(&congestion), "seed {seed}: {congestion}");
            assert!((6_000.0..=10_000.0).contains(&vehicles), "seed {seed}: {vehicles}");
            assert_eq!(city.energy, before.energy, "23:00 is outside both energy bands");
        }
    }

    #[test]
    fn small_hours_hit_the_night_floors() {
        for seed in SEEDS {
            let mut city = city_at(3.0);
            city.traffic.congestion_level = 10.0;
            city.traffic.vehicles_on_road = 2_000.0;
            city.energy.electricity_usage = 60.0;
            run(&mut city, seed);

            assert_eq!(city.traffic.congestion_level, 0.0);
            assert_eq!(city.traffic.vehicles_on_road, NIGHT_MIN_VEHICLES);
            assert_eq!(city.energy.electricity_usage, NIGHT_MIN_ELECTRICITY);
        }
    }

    #[test]
    fn night_low_lowers_usage() {
        for seed in SEEDS {
            let before = city_at(3.0);
            let mut city = before.clone();
            run(&mut city, seed);

            let drop = before.energy.electricity_usage - city.energy.electricity_usage;
            assert!((100.0..=150.0).contains(&drop), "seed {seed}: {drop}");
            assert_eq!(city.energy.peak_demand, before.energy.peak_demand);
        }
    }

    #[test]
    fn bands_follow_the_clock() {
        assert_eq!(TrafficBand::at(8.0), TrafficBand::MorningRush);
        assert_eq!(TrafficBand::at(9.5), TrafficBand::Normal);
        assert_eq!(TrafficBand::at(17.2), TrafficBand::EveningRush);
        assert_eq!(TrafficBand::at(23.0), TrafficBand::Night);
        assert_eq!(TrafficBand::at(3.0), TrafficBand::Night);
        assert_eq!(TrafficBand::at(12.0), TrafficBand::Normal);

        assert_eq!(EnergyBand::at(20.0), EnergyBand::EveningPeak);
        assert_eq!(EnergyBand::at(4.0), EnergyBand::NightLow);
        assert_eq!(EnergyBand::at(23.0), EnergyBand::Normal);
    }
}
