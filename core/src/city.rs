//! City state — the single aggregate the engine mutates every tick.
//!
//! One typed record per metric category plus the simulated calendar.
//! `CityState::default()` is the documented initial state; reset restores
//! whatever the active config carries as `initial_state`.

use crate::metric::Metric;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrafficMetrics {
    /// 0-100
    pub congestion_level:       f64,
    /// 0-30000, whole vehicles
    pub vehicles_on_road:       f64,
    /// 0-100
    pub public_transport_usage: f64,
    pub accident_count:         f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnergyMetrics {
    /// MW
    pub electricity_usage:    f64,
    /// 0-100
    pub renewable_percentage: f64,
    /// MW
    pub peak_demand:          f64,
    /// tons
    pub carbon_emission:      f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterMetrics {
    /// million litres
    pub consumption:        f64,
    /// 0-100
    pub quality_index:      f64,
    /// million litres
    pub treatment_capacity: f64,
    /// 0-100
    pub reservoir_level:    f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentMetrics {
    /// 0-500
    pub air_quality_index:      f64,
    /// 0-100
    pub green_space_percentage: f64,
    /// tons
    pub waste_recycled:         f64,
    /// dB
    pub noise_level:            f64,
}

/// All figures in millions, except growth rate (percent).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyMetrics {
    pub budget:      f64,
    pub revenue:     f64,
    pub expenses:    f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialMetrics {
    /// 0-100
    pub happiness_index: f64,
    /// 0-100
    pub employment_rate: f64,
    /// per 1000 people
    pub crime_rate:      f64,
    /// 0-100
    pub health_index:    f64,
}

/// Simulated calendar. Months are a fixed 30 days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarTime {
    /// Fractional hour in [0, 24).
    pub hour:  f64,
    /// 1-30
    pub day:   u32,
    /// 1-12
    pub month: u32,
    pub year:  i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityState {
    pub traffic:     TrafficMetrics,
    pub energy:      EnergyMetrics,
    pub water:       WaterMetrics,
    pub environment: EnvironmentMetrics,
    pub economy:     EconomyMetrics,
    pub social:      SocialMetrics,
    pub time:        CalendarTime,
}

impl Default for CityState {
    fn default() -> Self {
        Self {
            traffic: TrafficMetrics {
                congestion_level:       45.0,
                vehicles_on_road:       12_500.0,
                public_transport_usage: 35.0,
                accident_count:         3.0,
            },
            energy: EnergyMetrics {
                electricity_usage:    250.0,
                renewable_percentage: 20.0,
                peak_demand:          320.0,
                carbon_emission:      450.0,
            },
            water: WaterMetrics {
                consumption:        150.0,
                quality_index:      85.0,
                treatment_capacity: 200.0,
                reservoir_level:    70.0,
            },
            environment: EnvironmentMetrics {
                air_quality_index:      75.0,
                green_space_percentage: 25.0,
                waste_recycled:         120.0,
                noise_level:            65.0,
            },
            economy: EconomyMetrics {
                budget:      350.0,
                revenue:     45.0,
                expenses:    40.0,
                growth_rate: 2.5,
            },
            social: SocialMetrics {
                happiness_index: 68.0,
                employment_rate: 92.0,
                crime_rate:      8.5,
                health_index:    75.0,
            },
            time: CalendarTime {
                hour:  9.0,
                day:   15,
                month: 6,
                year:  2023,
            },
        }
    }
}

impl CityState {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CongestionLevel      => self.traffic.congestion_level,
            Metric::VehiclesOnRoad       => self.traffic.vehicles_on_road,
            Metric::PublicTransportUsage => self.traffic.public_transport_usage,
            Metric::AccidentCount        => self.traffic.accident_count,
            Metric::ElectricityUsage     => self.energy.electricity_usage,
            Metric::RenewablePercentage  => self.energy.renewable_percentage,
            Metric::PeakDemand           => self.energy.peak_demand,
            Metric::CarbonEmission       => self.energy.carbon_emission,
            Metric::WaterConsumption     => self.water.consumption,
            Metric::WaterQuality         => self.water.quality_index,
            Metric::TreatmentCapacity    => self.water.treatment_capacity,
            Metric::ReservoirLevel       => self.water.reservoir_level,
            Metric::AirQualityIndex      => self.environment.air_quality_index,
            Metric::GreenSpacePercentage => self.environment.green_space_percentage,
            Metric::WasteRecycled        => self.environment.waste_recycled,
            Metric::NoiseLevel           => self.environment.noise_level,
            Metric::Budget               => self.economy.budget,
            Metric::Revenue              => self.economy.revenue,
            Metric::Expenses             => self.economy.expenses,
            Metric::GrowthRate           => self.economy.growth_rate,
            Metric::HappinessIndex       => self.social.happiness_index,
            Metric::EmploymentRate       => self.social.employment_rate,
            Metric::CrimeRate            => self.social.crime_rate,
            Metric::HealthIndex          => self.social.health_index,
        }
    }

    pub fn value_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::CongestionLevel      => &mut self.traffic.congestion_level,
            Metric::VehiclesOnRoad       => &mut self.traffic.vehicles_on_road,
            Metric::PublicTransportUsage => &mut self.traffic.public_transport_usage,
            Metric::AccidentCount        => &mut self.traffic.accident_count,
            Metric::ElectricityUsage     => &mut self.energy.electricity_usage,
            Metric::RenewablePercentage  => &mut self.energy.renewable_percentage,
            Metric::PeakDemand           => &mut self.energy.peak_demand,
            Metric::CarbonEmission       => &mut self.energy.carbon_emission,
            Metric::WaterConsumption     => &mut self.water.consumption,
            Metric::WaterQuality         => &mut self.water.quality_index,
            Metric::TreatmentCapacity    => &mut self.water.treatment_capacity,
            Metric::ReservoirLevel       => &mut self.water.reservoir_level,
            Metric::AirQualityIndex      => &mut self.environment.air_quality_index,
            Metric::GreenSpacePercentage => &mut self.environment.green_space_percentage,
            Metric::WasteRecycled        => &mut self.environment.waste_recycled,
            Metric::NoiseLevel           => &mut self.environment.noise_level,
            Metric::Budget               => &mut self.economy.budget,
            Metric::Revenue              => &mut self.economy.revenue,
            Metric::Expenses             => &mut self.economy.expenses,
            Metric::GrowthRate           => &mut self.economy.growth_rate,
            Metric::HappinessIndex       => &mut self.social.happiness_index,
            Metric::EmploymentRate       => &mut self.social.employment_rate,
            Metric::CrimeRate            => &mut self.social.crime_rate,
            Metric::HealthIndex          => &mut self.social.health_index,
        }
    }

    pub fn add(&mut self, metric: Metric, delta: f64) {
        *self.value_mut(metric) += delta;
    }

    /// Clamp every metric into its domain. Run after all additive
    /// updates of a stage, never between them.
    pub fn clamp_to_domain(&mut self) {
        for metric in Metric::ALL {
            let value = self.value_mut(metric);
            *value = metric.domain().clamp(*value);
        }
    }

    /// First metric found outside its domain, if any.
    pub fn out_of_domain(&self) -> Option<(Metric, f64)> {
        Metric::ALL
            .into_iter()
            .map(|m| (m, self.value(m)))
            .find(|(m, v)| !m.domain().contains(*v))
    }

    pub fn is_within_domain(&self) -> bool {
        self.out_of_domain().is_none()
    }
}
