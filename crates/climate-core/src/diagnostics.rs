//! Console text produced by the node
//!
//! Lines are formatted into fixed-size buffers and handed to the
//! [`Console`](crate::hal::Console) collaborator by the node context.

use core::fmt::Write;

use heapless::String;

use crate::aggregation::TelemetrySnapshot;
use crate::display::frame::format_value;
use crate::metrics::Metric;
use crate::uplink::{PAYLOAD_LEN, UplinkPayload};

/// Longest line any formatter here produces, a hex-dumped downlink included.
pub const LINE_MAX: usize = 160;

pub type Line = String<LINE_MAX>;

pub const JOIN_OK: &str = "$JOIN_OK";
pub const JOIN_ERROR: &str = "$JOIN_ERROR";

/// `"$SEND: <hex>"`, emitted after every uplink.
pub fn send_line(payload: &UplinkPayload) -> String<{ 7 + PAYLOAD_LEN * 2 }> {
    let mut line = String::new();
    let _ = line.push_str("$SEND: ");
    let _ = line.push_str(payload.to_hex().as_str());
    line
}

/// One `"<Name>: <value>"` line of the status report, `-` when missing.
pub fn status_line(metric: Metric, average: Option<f32>) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "{}: {}",
        metric.status_name(),
        format_value(average, metric.precision())
    );
    line
}

/// `"<SOURCE>: <Name>: <value><unit>"`, logged for every accepted reading.
pub fn reading_line(source: &str, metric: Metric, value: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "{}: {}: {}{}",
        source,
        metric.status_name(),
        format_value(Some(value), metric.precision()),
        metric.unit()
    );
    line
}

/// The full status report in console order.
pub fn status_lines(snapshot: &TelemetrySnapshot) -> impl Iterator<Item = Line> + '_ {
    Metric::STATUS_ORDER
        .iter()
        .map(|&metric| status_line(metric, snapshot.get(metric)))
}

/// `"LoRa received msg: ..."` for a downlink, or `None` for an empty one.
///
/// Printable payloads are shown as text, anything else as lowercase hex.
pub fn received_line(message: &[u8]) -> Option<Line> {
    if message.is_empty() {
        return None;
    }

    let mut line = Line::new();
    let _ = line.push_str("LoRa received msg: ");
    match core::str::from_utf8(message) {
        Ok(text) => {
            for c in text.chars() {
                if line.push(c).is_err() {
                    break;
                }
            }
        }
        Err(_) => {
            for byte in message {
                if write!(line, "{:02x}", byte).is_err() {
                    break;
                }
            }
        }
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uplink::Header;

    #[test]
    fn test_send_line() {
        let payload = UplinkPayload::new(Header::Update);
        assert_eq!(
            send_line(&payload).as_str(),
            "$SEND: 01ffffffffffffffffffffff"
        );
    }

    #[test]
    fn test_status_lines_order_and_precision() {
        let snapshot = TelemetrySnapshot::empty()
            .with(Metric::Voltage, Some(3.3))
            .with(Metric::Temperature, Some(21.44))
            .with(Metric::Pressure, Some(1013.4));

        let lines: std::vec::Vec<_> = status_lines(&snapshot).collect();
        let lines: std::vec::Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            lines,
            [
                "Voltage: 3.30",
                "Charge level: -",
                "Temperature: 21.4",
                "Humidity: -",
                "Air pressure: 1013",
                "CO2: -",
                "VOC: -",
            ]
        );
    }

    #[test]
    fn test_reading_line_has_source_and_unit() {
        let line = reading_line("HUMIDITY TAG", Metric::Humidity, 45.2);
        assert_eq!(line.as_str(), "HUMIDITY TAG: Humidity: 45 %");

        let line = reading_line("BATTERY MODULE", Metric::Voltage, 3.3);
        assert_eq!(line.as_str(), "BATTERY MODULE: Voltage: 3.30V");
    }

    #[test]
    fn test_received_line() {
        assert_eq!(
            received_line(b"hello").unwrap().as_str(),
            "LoRa received msg: hello"
        );
        assert_eq!(
            received_line(&[0xde, 0xad, 0xff]).unwrap().as_str(),
            "LoRa received msg: deadff"
        );
        assert!(received_line(&[]).is_none());
    }
}
