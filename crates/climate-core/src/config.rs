//! Node configuration
//!
//! Timing constants for sampling, uplink and calibration. The defaults are
//! the reference configuration; a provisioning tool may ship a different set
//! as a `postcard` blob.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::aggregation::MAX_WINDOW;
use crate::metrics::Metric;

/// Largest provisioning blob `to_slice` can produce.
pub const CONFIG_BLOB_MAX: usize = 64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
    #[error("window for {metric:?} needs {capacity} samples, at most {max} supported")]
    WindowTooLarge {
        metric: Metric,
        capacity: usize,
        max: usize,
    },
    #[error("failed to encode configuration")]
    Encode,
    #[error("failed to decode configuration")]
    Decode,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    pub uplink_interval_ms: u32,
    pub first_uplink_delay_ms: u32,
    pub radio_retry_ms: u32,
    /// Humidity tag cadence, shared by temperature
    pub humidity_interval_ms: u32,
    pub co2_interval_ms: u32,
    pub voc_interval_ms: u32,
    pub pressure_interval_ms: u32,
    /// Battery module cadence, shared by voltage and charge level
    pub battery_interval_ms: u32,
    pub calibration_delay_ms: u32,
    pub calibration_step_ms: u32,
    pub calibration_cycles: u8,
    /// CO2 module cadence while a calibration session is running
    pub co2_service_interval_ms: u32,
    pub indicator_pulse_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            uplink_interval_ms: 10 * 60 * 1000,
            first_uplink_delay_ms: 10 * 1000,
            radio_retry_ms: 100,
            humidity_interval_ms: 60 * 1000,
            co2_interval_ms: 2 * 60 * 1000,
            voc_interval_ms: 5 * 60 * 1000,
            pressure_interval_ms: 5 * 60 * 1000,
            battery_interval_ms: 5 * 60 * 1000,
            calibration_delay_ms: 2 * 60 * 1000,
            calibration_step_ms: 60 * 1000,
            calibration_cycles: 32,
            co2_service_interval_ms: 60 * 1000,
            indicator_pulse_ms: 200,
        }
    }
}

impl NodeConfig {
    /// Native update cadence of the sensor feeding `metric`.
    pub const fn metric_interval_ms(&self, metric: Metric) -> u32 {
        match metric {
            Metric::Voltage | Metric::ChargeLevel => self.battery_interval_ms,
            Metric::Temperature | Metric::Humidity => self.humidity_interval_ms,
            Metric::Co2 => self.co2_interval_ms,
            Metric::Voc => self.voc_interval_ms,
            Metric::Pressure => self.pressure_interval_ms,
        }
    }

    /// Rolling window length for `metric`: one uplink interval worth of samples.
    ///
    /// Returns 0 when the metric interval is zero; `validate` rejects that.
    pub const fn window_capacity(&self, metric: Metric) -> usize {
        let interval = self.metric_interval_ms(metric);
        if interval == 0 {
            return 0;
        }
        self.uplink_interval_ms.div_ceil(interval) as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("uplink_interval_ms", self.uplink_interval_ms),
            ("humidity_interval_ms", self.humidity_interval_ms),
            ("co2_interval_ms", self.co2_interval_ms),
            ("voc_interval_ms", self.voc_interval_ms),
            ("pressure_interval_ms", self.pressure_interval_ms),
            ("battery_interval_ms", self.battery_interval_ms),
            ("calibration_step_ms", self.calibration_step_ms),
            ("calibration_cycles", self.calibration_cycles as u32),
            ("co2_service_interval_ms", self.co2_service_interval_ms),
            ("radio_retry_ms", self.radio_retry_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }

        for metric in Metric::STATUS_ORDER {
            let capacity = self.window_capacity(metric);
            if capacity > MAX_WINDOW {
                return Err(ConfigError::WindowTooLarge {
                    metric,
                    capacity,
                    max: MAX_WINDOW,
                });
            }
        }

        Ok(())
    }

    /// Decode and validate a provisioning blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode into `buf`, returning the used prefix.
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    pub const fn uplink_interval(&self) -> Duration {
        Duration::from_millis(self.uplink_interval_ms as u64)
    }

    pub const fn first_uplink_delay(&self) -> Duration {
        Duration::from_millis(self.first_uplink_delay_ms as u64)
    }

    pub const fn radio_retry(&self) -> Duration {
        Duration::from_millis(self.radio_retry_ms as u64)
    }

    pub const fn co2_interval(&self) -> Duration {
        Duration::from_millis(self.co2_interval_ms as u64)
    }

    pub const fn co2_service_interval(&self) -> Duration {
        Duration::from_millis(self.co2_service_interval_ms as u64)
    }

    pub const fn calibration_delay(&self) -> Duration {
        Duration::from_millis(self.calibration_delay_ms as u64)
    }

    pub const fn calibration_step(&self) -> Duration {
        Duration::from_millis(self.calibration_step_ms as u64)
    }

    pub const fn indicator_pulse(&self) -> Duration {
        Duration::from_millis(self.indicator_pulse_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_window_capacities() {
        let config = NodeConfig::default();
        assert_eq!(config.window_capacity(Metric::Humidity), 10);
        assert_eq!(config.window_capacity(Metric::Temperature), 10);
        assert_eq!(config.window_capacity(Metric::Co2), 5);
        assert_eq!(config.window_capacity(Metric::Voc), 2);
        assert_eq!(config.window_capacity(Metric::Pressure), 2);
        assert_eq!(config.window_capacity(Metric::Voltage), 2);
        assert_eq!(config.window_capacity(Metric::ChargeLevel), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_rounds_up() {
        let config = NodeConfig {
            uplink_interval_ms: 10 * 60 * 1000,
            co2_interval_ms: 3 * 60 * 1000,
            ..NodeConfig::default()
        };
        assert_eq!(config.window_capacity(Metric::Co2), 4);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = NodeConfig {
            voc_interval_ms: 0,
            ..NodeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval {
                name: "voc_interval_ms"
            })
        );
    }

    #[test]
    fn test_rejects_oversized_window() {
        let config = NodeConfig {
            humidity_interval_ms: 10 * 1000,
            ..NodeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::WindowTooLarge {
                metric: Metric::Temperature,
                capacity: 60,
                max: MAX_WINDOW,
            })
        );
    }

    #[test]
    fn test_provisioning_blob() {
        let config = NodeConfig {
            uplink_interval_ms: 5 * 60 * 1000,
            calibration_cycles: 8,
            ..NodeConfig::default()
        };
        let mut buf = [0u8; CONFIG_BLOB_MAX];
        let used = config.to_slice(&mut buf).unwrap().len();

        let decoded = NodeConfig::from_bytes(&buf[..used]).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_invalid_blob_is_rejected() {
        assert_eq!(NodeConfig::from_bytes(&[0x01]), Err(ConfigError::Decode));

        let bad = NodeConfig {
            calibration_cycles: 0,
            ..NodeConfig::default()
        };
        let mut buf = [0u8; CONFIG_BLOB_MAX];
        let used = bad.to_slice(&mut buf).unwrap().len();
        assert_eq!(
            NodeConfig::from_bytes(&buf[..used]),
            Err(ConfigError::ZeroInterval {
                name: "calibration_cycles"
            })
        );
    }
}
