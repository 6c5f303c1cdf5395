//! Uplink wire format
//!
//! A report is exactly [`PAYLOAD_LEN`] bytes:
//!
//! | Bytes | Field       | Encoding                                      |
//! |-------|-------------|-----------------------------------------------|
//! | 0     | header      | [`Header`] value                              |
//! | 1     | voltage     | `ceil(V * 30)`, low 8 bits                    |
//! | 2     | charge      | integer percent, low 8 bits                   |
//! | 3-4   | temperature | `round(°C * 10)` as i16, big-endian, saturated |
//! | 5     | humidity    | `%RH * 2`, low 8 bits                         |
//! | 6-7   | CO2         | ppm as u16, big-endian, clamped to 65534      |
//! | 8-9   | VOC         | ppb, low 16 bits, big-endian                  |
//! | 10-11 | pressure    | hPa, low 16 bits, big-endian                  |
//!
//! Fields whose average is missing keep the sentinel [`NO_DATA`] in every
//! byte they occupy.

pub mod encoder;
pub mod payload;

pub use encoder::UplinkEncoder;
pub use payload::{Header, NO_DATA, PAYLOAD_LEN, UplinkPayload};
