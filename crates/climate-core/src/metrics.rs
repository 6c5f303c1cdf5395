//! Metric catalogue
//!
//! Every quantity the node measures, together with the naming and precision
//! rules the console and the display use for it.

use serde::{Deserialize, Serialize};

/// A measured quantity tracked by the node.
///
/// The discriminant doubles as the index into per-metric tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Battery voltage in volts
    Voltage,
    /// Battery charge level in percent
    ChargeLevel,
    /// Air temperature in °C
    Temperature,
    /// Relative humidity in percent
    Humidity,
    /// CO2 concentration in ppm
    Co2,
    /// Total VOC in ppb
    Voc,
    /// Air pressure in hPa
    Pressure,
}

impl Metric {
    /// Number of metrics.
    pub const COUNT: usize = 7;

    /// All metrics in index order.
    pub const ALL: [Metric; Self::COUNT] = [
        Metric::Voltage,
        Metric::ChargeLevel,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Co2,
        Metric::Voc,
        Metric::Pressure,
    ];

    /// All metrics in the order the status command reports them.
    pub const STATUS_ORDER: [Metric; Self::COUNT] = [
        Metric::Voltage,
        Metric::ChargeLevel,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pressure,
        Metric::Co2,
        Metric::Voc,
    ];

    /// Index into per-metric arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used by the status command.
    pub const fn status_name(self) -> &'static str {
        match self {
            Self::Voltage => "Voltage",
            Self::ChargeLevel => "Charge level",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Co2 => "CO2",
            Self::Voc => "VOC",
            Self::Pressure => "Air pressure",
        }
    }

    /// Label shown above the value on a display page.
    pub const fn page_label(self) -> &'static str {
        match self {
            Self::Voltage | Self::ChargeLevel => "Battery",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Co2 => "CO2",
            Self::Voc => "TVOC",
            Self::Pressure => "Air pressure",
        }
    }

    /// Unit suffix drawn after the value.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::ChargeLevel | Self::Humidity => " %",
            Self::Temperature => " \u{b0}C",
            Self::Co2 => " ppm",
            Self::Voc => " ppb",
            Self::Pressure => " hPa",
        }
    }

    /// Number of decimal places used when a value is printed or drawn.
    pub const fn precision(self) -> usize {
        match self {
            Self::Voltage => 2,
            Self::Temperature => 1,
            _ => 0,
        }
    }
}
