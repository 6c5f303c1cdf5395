//! Sensor readings as delivered by the sensor collaborators
//!
//! Drivers for the humidity, VOC and barometer tags, the CO2 module and the
//! battery module live outside the core. Each reports either a value or a
//! [`SensorError`]; [`SensorUpdate::readings`] turns a report into per-metric
//! values in the units the aggregator works in.

use heapless::Vec;
use thiserror_no_std::Error;

use crate::metrics::Metric;

pub const HUMIDITY_TAG: &str = "humidity tag";
pub const VOC_TAG: &str = "VOC tag";
pub const BAROMETER_TAG: &str = "barometer tag";
pub const CO2_MODULE: &str = "CO2 module";
pub const BATTERY_MODULE: &str = "battery module";

/// Pascal per hectopascal.
const PA_PER_HPA: f32 = 100.0;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} read failed")]
    ReadFailed { sensor: &'static str },
    #[error("{sensor} returned an invalid value")]
    InvalidValue { sensor: &'static str },
}

pub type Reading<T> = Result<T, SensorError>;

/// One report from a sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorUpdate {
    /// Relative humidity in % and temperature in °C
    HumidityTag {
        humidity: Reading<f32>,
        temperature: Reading<f32>,
    },
    /// Total VOC in ppb
    VocTag(Reading<u16>),
    /// Air pressure in Pa
    Barometer(Reading<f32>),
    /// CO2 concentration in ppm
    Co2(Reading<f32>),
    /// Battery voltage in V and charge level in %
    Battery {
        voltage: Reading<f32>,
        charge: Reading<u8>,
    },
}

impl SensorUpdate {
    /// Tag used in log lines for the collaborator that sent this report.
    pub const fn source(&self) -> &'static str {
        match self {
            SensorUpdate::HumidityTag { .. } => "HUMIDITY TAG",
            SensorUpdate::VocTag(_) => "VOC TAG",
            SensorUpdate::Barometer(_) => "BAROMETER TAG",
            SensorUpdate::Co2(_) => "CO2 MODULE",
            SensorUpdate::Battery { .. } => "BATTERY MODULE",
        }
    }

    /// Per-metric readings carried by this report, pressure in hPa.
    ///
    /// Non-finite floats are reported as [`SensorError::InvalidValue`].
    pub fn readings(self) -> Vec<(Metric, Reading<f32>), 2> {
        let mut out = Vec::new();
        let mut push = |metric, reading| {
            let _ = out.push((metric, reading));
        };

        match self {
            SensorUpdate::HumidityTag {
                humidity,
                temperature,
            } => {
                push(Metric::Temperature, finite(HUMIDITY_TAG, temperature));
                push(Metric::Humidity, finite(HUMIDITY_TAG, humidity));
            }
            SensorUpdate::VocTag(ppb) => push(Metric::Voc, ppb.map(f32::from)),
            SensorUpdate::Barometer(pascal) => push(
                Metric::Pressure,
                finite(BAROMETER_TAG, pascal).map(|pa| pa / PA_PER_HPA),
            ),
            SensorUpdate::Co2(ppm) => push(Metric::Co2, finite(CO2_MODULE, ppm)),
            SensorUpdate::Battery { voltage, charge } => {
                push(Metric::Voltage, finite(BATTERY_MODULE, voltage));
                push(Metric::ChargeLevel, charge.map(f32::from));
            }
        }
        out
    }
}

fn finite(sensor: &'static str, reading: Reading<f32>) -> Reading<f32> {
    match reading {
        Ok(v) if !v.is_finite() => Err(SensorError::InvalidValue { sensor }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barometer_converts_to_hpa() {
        let readings = SensorUpdate::Barometer(Ok(101_325.0)).readings();
        assert_eq!(readings.len(), 1);
        let (metric, value) = readings[0];
        assert_eq!(metric, Metric::Pressure);
        assert!((value.unwrap() - 1013.25).abs() < 1e-3);
    }

    #[test]
    fn test_humidity_tag_reports_both_metrics_independently() {
        let failed = Err(SensorError::ReadFailed {
            sensor: HUMIDITY_TAG,
        });
        let readings = SensorUpdate::HumidityTag {
            humidity: Ok(45.5),
            temperature: failed,
        }
        .readings();

        assert_eq!(readings[0], (Metric::Temperature, failed));
        assert_eq!(readings[1], (Metric::Humidity, Ok(45.5)));
    }

    #[test]
    fn test_nan_is_invalid() {
        let readings = SensorUpdate::Co2(Ok(f32::NAN)).readings();
        assert_eq!(
            readings[0].1,
            Err(SensorError::InvalidValue { sensor: CO2_MODULE })
        );
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(SensorUpdate::Co2(Ok(400.0)).source(), "CO2 MODULE");
        let battery = SensorUpdate::Battery {
            voltage: Ok(3.0),
            charge: Ok(50),
        };
        assert_eq!(battery.source(), "BATTERY MODULE");
    }

    #[test]
    fn test_integer_readings_widen() {
        let readings = SensorUpdate::Battery {
            voltage: Ok(3.3),
            charge: Ok(87),
        }
        .readings();
        assert_eq!(readings[1], (Metric::ChargeLevel, Ok(87.0)));

        let readings = SensorUpdate::VocTag(Ok(120)).readings();
        assert_eq!(readings[0], (Metric::Voc, Ok(120.0)));
    }
}
