//! Collaborator traits
//!
//! The core never touches hardware directly. Sensor drivers push readings in
//! through [`NodeContext`](crate::node::NodeContext) callbacks; everything the
//! core drives (radio, CO2 module service commands, LEDs, LCD, console) goes
//! out through these traits.

use embassy_time::Duration;

use crate::display::Frame;
use crate::uplink::UplinkPayload;

/// LoRa radio transport.
pub trait Radio {
    /// Whether the modem can accept a message right now.
    fn is_ready(&self) -> bool;

    /// Queue a report for transmission. Delivery is reported through
    /// [`RadioEvent`](crate::events::RadioEvent)s.
    fn send(&mut self, payload: &UplinkPayload);
}

/// Calibration modes the CO2 module supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Background calibration with the module's noise filter applied
    BackgroundFiltered,
}

/// Service interface of the CO2 module (readings arrive separately).
pub trait Co2Module {
    /// Issue one calibration command. Fire-and-forget: no result is reported.
    fn calibrate(&mut self, mode: CalibrationMode);

    /// Change how often the module measures.
    fn set_update_interval(&mut self, interval: Duration);
}

/// The three LEDs on the LCD module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    /// Radio error / generic attention
    Red,
    /// User activity and sending
    Green,
    /// CO2 calibration
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    On,
    BlinkSlow,
    BlinkFast,
}

pub trait Leds {
    fn set_led(&mut self, led: Led, mode: LedMode);

    /// Light `led` once for `duration`, then return to its previous mode.
    fn pulse_led(&mut self, led: Led, duration: Duration);
}

/// LCD collaborator. Pixel rendering and fonts live on the other side.
pub trait Display {
    fn is_ready(&self) -> bool;

    fn render(&mut self, frame: &Frame);
}

/// Diagnostic text output consumed by the command processor.
pub trait Console {
    fn print_line(&mut self, line: &str);
}

/// Everything a [`NodeContext`](crate::node::NodeContext) drives.
pub trait Board: Radio + Co2Module + Leds + Display + Console {}

impl<T: Radio + Co2Module + Leds + Display + Console> Board for T {}
