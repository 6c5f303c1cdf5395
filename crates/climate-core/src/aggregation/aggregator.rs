use log::debug;

use super::RollingAverageBuffer;
use crate::config::{ConfigError, NodeConfig};
use crate::metrics::Metric;

/// Point-in-time capture of every metric's rolling average.
///
/// Taken when an uplink is built and discarded after encoding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    averages: [Option<f32>; Metric::COUNT],
}

impl TelemetrySnapshot {
    pub const fn empty() -> Self {
        Self {
            averages: [None; Metric::COUNT],
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f32> {
        self.averages[metric.index()]
    }

    /// Builder-style setter, mostly useful for tests and tools.
    pub fn with(mut self, metric: Metric, average: Option<f32>) -> Self {
        self.averages[metric.index()] = average;
        self
    }
}

/// Owns one rolling window per metric and turns them into snapshots.
///
/// Samples arrive at each sensor's native cadence; averages are read out
/// whenever a snapshot is requested. No rounding happens here.
#[derive(Debug, Clone)]
pub struct TelemetryAggregator {
    buffers: [RollingAverageBuffer; Metric::COUNT],
}

impl TelemetryAggregator {
    /// Build windows sized for one uplink interval of each metric.
    pub fn new(config: &NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let buffers =
            Metric::ALL.map(|metric| RollingAverageBuffer::new(config.window_capacity(metric)));

        Ok(Self { buffers })
    }

    /// Feed one reading. Invalid values (NaN, infinite) are dropped.
    pub fn feed(&mut self, metric: Metric, value: f32) {
        if !self.buffers[metric.index()].feed(value) {
            debug!("Dropping invalid {:?} sample", metric);
        }
    }

    pub fn average(&self, metric: Metric) -> Option<f32> {
        self.buffers[metric.index()].average()
    }

    pub fn buffer(&self, metric: Metric) -> &RollingAverageBuffer {
        &self.buffers[metric.index()]
    }

    /// Capture the current average of every metric without mutating anything.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::empty();
        for metric in Metric::ALL {
            snapshot = snapshot.with(metric, self.average(metric));
        }
        snapshot
    }
}
