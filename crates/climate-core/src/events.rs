//! Inbound events for the node context
//!
//! Button, radio and console drivers may run in interrupt context or on
//! another executor. They post into [`NODE_EVENTS`]; the single task that
//! owns the [`NodeContext`](crate::node::NodeContext) drains it through
//! [`handle_event`](crate::node::NodeContext::handle_event).

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use crate::display::ButtonEvent;
use crate::sensors::SensorUpdate;

/// Channel capacity for inbound node events
pub const NODE_EVENT_CAPACITY: usize = 8;

/// Largest downlink message kept from the radio
pub const MAX_DOWNLINK_LEN: usize = 64;

/// Global channel for events consumed by the node context
pub static NODE_EVENTS: Channel<CriticalSectionRawMutex, NodeEvent, NODE_EVENT_CAPACITY> =
    Channel::new();

/// LoRa modem notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    Error,
    SendStarted,
    SendDone,
    Ready,
    JoinSuccess,
    JoinError,
    /// Downlink payload, truncated to [`MAX_DOWNLINK_LEN`]
    MessageReceived(Vec<u8, MAX_DOWNLINK_LEN>),
}

/// Diagnostic console commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Send a report immediately
    Send,
    /// Print the current averages
    Status,
}

impl Command {
    /// Parse a console line such as `AT$SEND` or `$STATUS`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let line = line
            .strip_prefix("AT")
            .or_else(|| line.strip_prefix("at"))
            .unwrap_or(line);

        if line.eq_ignore_ascii_case("$SEND") {
            Some(Command::Send)
        } else if line.eq_ignore_ascii_case("$STATUS") {
            Some(Command::Status)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    Button(ButtonEvent),
    Radio(RadioEvent),
    Command(Command),
    Sensor(SensorUpdate),
}
