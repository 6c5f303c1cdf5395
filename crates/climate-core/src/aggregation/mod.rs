pub mod aggregator;
pub mod rolling;

pub use aggregator::{TelemetryAggregator, TelemetrySnapshot};
pub use rolling::RollingAverageBuffer;

/// Largest rolling window any metric may use
///
/// The reference configuration needs at most 10 (humidity and temperature:
/// a 10-minute uplink at a 1-minute cadence).
pub const MAX_WINDOW: usize = 16;
