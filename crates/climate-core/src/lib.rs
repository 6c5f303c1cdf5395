//! Hardware-independent core library for the climate node
//!
//! This crate contains all platform-agnostic logic of the battery-powered
//! climate sensor node: streaming aggregation of sensor readings into
//! per-uplink averages, the 12-byte uplink encoding, the CO2 background
//! calibration state machine, display page navigation, and the cooperative
//! task model that ties them together.
//!
//! Hardware (sensor tags, CO2 module, LoRa radio, LCD, LEDs, console) is
//! reached only through the collaborator traits in [`hal`], so the crate
//! compiles on both the node and desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod aggregation;
pub mod calibration;
pub mod config;
pub mod diagnostics;
pub mod display;
pub mod events;
pub mod hal;
pub mod metrics;
pub mod node;
pub mod scheduler;
pub mod sensors;
pub mod uplink;

pub use config::{ConfigError, NodeConfig};
pub use metrics::Metric;
pub use node::NodeContext;
