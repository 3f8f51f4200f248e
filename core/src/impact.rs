//! Impact maps — sparse additive deltas over city metrics.
//!
//! Catalog files write impacts in the nested shape of the city state:
//!
//! ```json
//! { "traffic": { "congestion_level": -15 }, "economy": { "expenses": 5 } }
//! ```
//!
//! They are resolved to `(Metric, delta)` pairs on load, so applying an
//! impact at tick time is a plain loop with no lookups that can fail.

use crate::{
    city::CityState,
    error::SimError,
    metric::{Metric, MetricCategory},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactDelta {
    pub metric: Metric,
    pub delta:  f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImpactMap", into = "RawImpactMap")]
pub struct ImpactMap {
    deltas: Vec<ImpactDelta>,
}

type RawImpactMap = BTreeMap<MetricCategory, BTreeMap<String, f64>>;

impl ImpactMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated metric accumulates.
    pub fn with(mut self, metric: Metric, delta: f64) -> Self {
        match self.deltas.iter_mut().find(|d| d.metric == metric) {
            Some(existing) => existing.delta += delta,
            None => self.deltas.push(ImpactDelta { metric, delta }),
        }
        self
    }

    pub fn deltas(&self) -> &[ImpactDelta] {
        &self.deltas
    }

    pub fn delta_for(&self, metric: Metric) -> Option<f64> {
        self.deltas.iter().find(|d| d.metric == metric).map(|d| d.delta)
    }

    /// Add every delta to the city state. No clamping happens here.
    pub fn apply(&self, city: &mut CityState) {
        for d in &self.deltas {
            city.add(d.metric, d.delta);
        }
    }
}

impl TryFrom<RawImpactMap> for ImpactMap {
    type Error = SimError;

    fn try_from(raw: RawImpactMap) -> Result<Self, Self::Error> {
        let mut map = ImpactMap::new();
        for (category, fields) in raw {
            for (field, delta) in fields {
                map = map.with(Metric::from_parts(category, &field)?, delta);
            }
        }
        Ok(map)
    }
}

impl From<ImpactMap> for RawImpactMap {
    fn from(map: ImpactMap) -> Self {
        let mut raw = RawImpactMap::new();
        for d in map.deltas {
            raw.entry(d.metric.category())
                .or_default()
                .insert(d.metric.field_name().to_string(), d.delta);
        }
        raw
    }
}
