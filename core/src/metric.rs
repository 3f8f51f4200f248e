//! Metric catalogue — every numeric field of the city state, by name.
//!
//! RULE: Code that touches "some metric" goes through `Metric`.
//! Nothing indexes CityState by string at tick time; string keys are
//! resolved once, when configuration is loaded.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Traffic,
    Energy,
    Water,
    Environment,
    Economy,
    Social,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 6] = [
        Self::Traffic,
        Self::Energy,
        Self::Water,
        Self::Environment,
        Self::Economy,
        Self::Social,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Traffic     => "traffic",
            Self::Energy      => "energy",
            Self::Water       => "water",
            Self::Environment => "environment",
            Self::Economy     => "economy",
            Self::Social      => "social",
        }
    }

    /// Metrics belonging to this category, in recording order.
    pub fn metrics(self) -> impl Iterator<Item = Metric> {
        Metric::ALL.into_iter().filter(move |m| m.category() == self)
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Valid range of a metric. Enforced by `CityState::clamp_to_domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// [0, 100]
    Percent,
    /// [0, 500]
    AirQuality,
    /// [0, 30000]
    Vehicles,
    /// [0, ∞)
    NonNegative,
    /// No bound. Economy figures may go negative.
    Unbounded,
}

pub const MAX_AIR_QUALITY_INDEX: f64 = 500.0;
pub const MAX_VEHICLES_ON_ROAD: f64 = 30_000.0;

impl Domain {
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Self::Percent     => (0.0, 100.0),
            Self::AirQuality  => (0.0, MAX_AIR_QUALITY_INDEX),
            Self::Vehicles    => (0.0, MAX_VEHICLES_ON_ROAD),
            Self::NonNegative => (0.0, f64::INFINITY),
            Self::Unbounded   => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.bounds();
        value.clamp(lo, hi)
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&value)
    }
}

/// One numeric field of the city state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    // ── Traffic ────────────────────────────────────
    #[serde(rename = "traffic.congestion_level")]
    CongestionLevel,
    #[serde(rename = "traffic.vehicles_on_road")]
    VehiclesOnRoad,
    #[serde(rename = "traffic.public_transport_usage")]
    PublicTransportUsage,
    #[serde(rename = "traffic.accident_count")]
    AccidentCount,

    // ── Energy ─────────────────────────────────────
    #[serde(rename = "energy.electricity_usage")]
    ElectricityUsage,
    #[serde(rename = "energy.renewable_percentage")]
    RenewablePercentage,
    #[serde(rename = "energy.peak_demand")]
    PeakDemand,
    #[serde(rename = "energy.carbon_emission")]
    CarbonEmission,

    // ── Water ──────────────────────────────────────
    #[serde(rename = "water.consumption")]
    WaterConsumption,
    #[serde(rename = "water.quality_index")]
    WaterQuality,
    #[serde(rename = "water.treatment_capacity")]
    TreatmentCapacity,
    #[serde(rename = "water.reservoir_level")]
    ReservoirLevel,

    // ── Environment ────────────────────────────────
    #[serde(rename = "environment.air_quality_index")]
    AirQualityIndex,
    #[serde(rename = "environment.green_space_percentage")]
    GreenSpacePercentage,
    #[serde(rename = "environment.waste_recycled")]
    WasteRecycled,
    #[serde(rename = "environment.noise_level")]
    NoiseLevel,

    // ── Economy ────────────────────────────────────
    #[serde(rename = "economy.budget")]
    Budget,
    #[serde(rename = "economy.revenue")]
    Revenue,
    #[serde(rename = "economy.expenses")]
    Expenses,
    #[serde(rename = "economy.growth_rate")]
    GrowthRate,

    // ── Social ─────────────────────────────────────
    #[serde(rename = "social.happiness_index")]
    HappinessIndex,
    #[serde(rename = "social.employment_rate")]
    EmploymentRate,
    #[serde(rename = "social.crime_rate")]
    CrimeRate,
    #[serde(rename = "social.health_index")]
    HealthIndex,
}

impl Metric {
    /// Every metric, grouped by category in `MetricCategory::ALL` order.
    pub const ALL: [Metric; 24] = [
        Self::CongestionLevel,
        Self::VehiclesOnRoad,
        Self::PublicTransportUsage,
        Self::AccidentCount,
        Self::ElectricityUsage,
        Self::RenewablePercentage,
        Self::PeakDemand,
        Self::CarbonEmission,
        Self::WaterConsumption,
        Self::WaterQuality,
        Self::TreatmentCapacity,
        Self::ReservoirLevel,
        Self::AirQualityIndex,
        Self::GreenSpacePercentage,
        Self::WasteRecycled,
        Self::NoiseLevel,
        Self::Budget,
        Self::Revenue,
        Self::Expenses,
        Self::GrowthRate,
        Self::HappinessIndex,
        Self::EmploymentRate,
        Self::CrimeRate,
        Self::HealthIndex,
    ];

    pub fn category(&self) -> MetricCategory {
        use MetricCategory::*;
        match self {
            Self::CongestionLevel
            | Self::VehiclesOnRoad
            | Self::PublicTransportUsage
            | Self::AccidentCount => Traffic,
            Self::ElectricityUsage
            | Self::RenewablePercentage
            | Self::PeakDemand
            | Self::CarbonEmission => Energy,
            Self::WaterConsumption
            | Self::WaterQuality
            | Self::TreatmentCapacity
            | Self::ReservoirLevel => Water,
            Self::AirQualityIndex
            | Self::GreenSpacePercentage
            | Self::WasteRecycled
            | Self::NoiseLevel => Environment,
            Self::Budget
            | Self::Revenue
            | Self::Expenses
            | Self::GrowthRate => Economy,
            Self::HappinessIndex
            | Self::EmploymentRate
            | Self::CrimeRate
            | Self::HealthIndex => Social,
        }
    }

    /// Field name within the category, as used in catalog files.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::CongestionLevel      => "congestion_level",
            Self::VehiclesOnRoad       => "vehicles_on_road",
            Self::PublicTransportUsage => "public_transport_usage",
            Self::AccidentCount        => "accident_count",
            Self::ElectricityUsage     => "electricity_usage",
            Self::RenewablePercentage  => "renewable_percentage",
            Self::PeakDemand           => "peak_demand",
            Self::CarbonEmission       => "carbon_emission",
            Self::WaterConsumption     => "consumption",
            Self::WaterQuality         => "quality_index",
            Self::TreatmentCapacity    => "treatment_capacity",
            Self::ReservoirLevel       => "reservoir_level",
            Self::AirQualityIndex      => "air_quality_index",
            Self::GreenSpacePercentage => "green_space_percentage",
            Self::WasteRecycled        => "waste_recycled",
            Self::NoiseLevel           => "noise_level",
            Self::Budget               => "budget",
            Self::Revenue              => "revenue",
            Self::Expenses             => "expenses",
            Self::GrowthRate           => "growth_rate",
            Self::HappinessIndex       => "happiness_index",
            Self::EmploymentRate       => "employment_rate",
            Self::CrimeRate            => "crime_rate",
            Self::HealthIndex          => "health_index",
        }
    }

    /// "category.field", matching the serde representation.
    pub fn key(&self) -> String {
        format!("{}.{}", self.category().name(), self.field_name())
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::CongestionLevel
            | Self::PublicTransportUsage
            | Self::RenewablePercentage
            | Self::WaterQuality
            | Self::ReservoirLevel
            | Self::GreenSpacePercentage
            | Self::HappinessIndex
            | Self::EmploymentRate
            | Self::HealthIndex => Domain::Percent,
            Self::AirQualityIndex => Domain::AirQuality,
            Self::VehiclesOnRoad  => Domain::Vehicles,
            Self::AccidentCount
            | Self::ElectricityUsage
            | Self::PeakDemand
            | Self::CarbonEmission
            | Self::WaterConsumption
            | Self::TreatmentCapacity
            | Self::WasteRecycled
            | Self::NoiseLevel
            | Self::CrimeRate => Domain::NonNegative,
            Self::Budget
            | Self::Revenue
            | Self::Expenses
            | Self::GrowthRate => Domain::Unbounded,
        }
    }

    /// Resolve a (category, field) pair from configuration.
    pub fn from_parts(category: MetricCategory, field: &str) -> SimResult<Metric> {
        category
            .metrics()
            .find(|m| m.field_name() == field)
            .ok_or_else(|| SimError::UnknownMetric {
                category: category.name().to_string(),
                field:    field.to_string(),
            })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category().name(), self.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_four_metrics() {
        for category in MetricCategory::ALL {
            assert_eq!(category.metrics().count(), 4, "category {category}");
        }
    }

    #[test]
    fn serde_key_matches_display() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.key()));
        }
    }

    #[test]
    fn from_parts_rejects_unknown_field() {
        assert_eq!(
            Metric::from_parts(MetricCategory::Water, "reservoir_level").unwrap(),
            Metric::ReservoirLevel
        );
        assert!(Metric::from_parts(MetricCategory::Water, "congestion_level").is_err());
    }
}
