//! Metric history — a bounded rolling sample buffer per metric, for charting.
//!
//! RULE: Strict FIFO. When a series is over capacity the oldest
//! sample is evicted; nothing else ever removes samples.

use crate::{city::CityState, metric::Metric, types::TimestampMs};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub timestamp: TimestampMs,
    pub value:     f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricHistory {
    capacity: usize,
    series:   BTreeMap<Metric, VecDeque<DataPoint>>,
}

impl MetricHistory {
    /// One empty series per metric.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            series: Metric::ALL
                .into_iter()
                .map(|m| (m, VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY))))
                .collect(),
        }
    }

    /// Append the current value of every metric under one timestamp.
    pub fn record(&mut self, timestamp: TimestampMs, city: &CityState) {
        for metric in Metric::ALL {
            let series = self.series.entry(metric).or_default();
            series.push_back(DataPoint { timestamp, value: city.value(metric) });
            while series.len() > self.capacity {
                series.pop_front();
            }
        }
    }

    pub fn series(&self, metric: Metric) -> Option<&VecDeque<DataPoint>> {
        self.series.get(&metric)
    }

    pub fn len(&self, metric: Metric) -> usize {
        self.series(metric).map_or(0, VecDeque::len)
    }

    /// True when no sample has been recorded for any metric.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(VecDeque::is_empty)
    }

    pub fn latest(&self, metric: Metric) -> Option<DataPoint> {
        self.series(metric).and_then(|s| s.back().copied())
    }

    pub fn clear(&mut self) {
        for series in self.series.values_mut() {
            series.clear();
        }
    }
}
