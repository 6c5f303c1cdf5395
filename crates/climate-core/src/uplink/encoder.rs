use log::debug;

use super::payload::{Header, UplinkPayload};
use crate::aggregation::TelemetrySnapshot;
use crate::metrics::Metric;

/// Largest CO2 value sent; 0xFFFF stays reserved for "no data".
const CO2_MAX_PPM: f32 = 65534.0;

/// Builds uplink reports and tracks the boot/update header.
///
/// The first report of a run carries [`Header::Boot`]; every later one
/// carries [`Header::Update`]. The switch is one-way.
#[derive(Debug, Clone)]
pub struct UplinkEncoder {
    header: Header,
}

impl Default for UplinkEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl UplinkEncoder {
    pub const fn new() -> Self {
        Self {
            header: Header::Boot,
        }
    }

    /// Header the next call to [`encode`](Self::encode) will use.
    pub const fn next_header(&self) -> Header {
        self.header
    }

    /// Encode a snapshot and advance the header to [`Header::Update`].
    pub fn encode(&mut self, snapshot: &TelemetrySnapshot) -> UplinkPayload {
        let payload = encode_snapshot(self.header, snapshot);
        self.header = Header::Update;
        payload
    }
}

/// Stateless encoding of one snapshot under an explicit header.
pub fn encode_snapshot(header: Header, snapshot: &TelemetrySnapshot) -> UplinkPayload {
    let mut payload = UplinkPayload::new(header);

    if let Some(voltage) = snapshot.get(Metric::Voltage) {
        payload.set_u8(1, wrap_u8(libm::ceilf(voltage * 30.0)));
    }

    if let Some(charge) = snapshot.get(Metric::ChargeLevel) {
        payload.set_u8(2, wrap_u8(charge));
    }

    if let Some(temperature) = snapshot.get(Metric::Temperature) {
        // Float-to-int `as` saturates, which bounds the field to ±3276.7 °C.
        let tenths = libm::roundf(temperature * 10.0) as i16;
        payload.set_be(3, tenths.to_be_bytes());
    }

    if let Some(humidity) = snapshot.get(Metric::Humidity) {
        payload.set_u8(5, wrap_u8(humidity * 2.0));
    }

    if let Some(co2) = snapshot.get(Metric::Co2) {
        let ppm = co2.min(CO2_MAX_PPM) as u16;
        payload.set_be(6, ppm.to_be_bytes());
    }

    if let Some(voc) = snapshot.get(Metric::Voc) {
        payload.set_be(8, wrap_u16(voc).to_be_bytes());
    }

    if let Some(pressure) = snapshot.get(Metric::Pressure) {
        payload.set_be(10, wrap_u16(pressure).to_be_bytes());
    }

    debug!("Encoded uplink {:?}: {:02x?}", header, payload.as_bytes());
    payload
}

/// Truncate toward zero, then keep the low 8 bits.
fn wrap_u8(value: f32) -> u8 {
    (value as i64) as u8
}

/// Truncate toward zero, then keep the low 16 bits.
fn wrap_u16(value: f32) -> u16 {
    (value as i64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uplink::{NO_DATA, PAYLOAD_LEN};

    const REFERENCE: [u8; PAYLOAD_LEN] = [
        0x00, 0x63, 0x57, 0x00, 0xD6, 0x5A, 0x03, 0x2C, 0x00, 0x78, 0x03, 0xF5,
    ];

    fn reference_snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot::empty()
            .with(Metric::Voltage, Some(3.3))
            .with(Metric::ChargeLevel, Some(87.0))
            .with(Metric::Temperature, Some(21.4))
            .with(Metric::Humidity, Some(45.0))
            .with(Metric::Co2, Some(812.0))
            .with(Metric::Voc, Some(120.0))
            .with(Metric::Pressure, Some(1013.0))
    }

    #[test]
    fn test_reference_report() {
        let mut encoder = UplinkEncoder::new();
        let payload = encoder.encode(&reference_snapshot());
        assert_eq!(payload.as_bytes(), &REFERENCE);
        assert_eq!(payload.to_hex().as_str(), "00635700d65a032c007803f5");
    }

    #[test]
    fn test_missing_temperature_keeps_sentinel() {
        let snapshot = reference_snapshot().with(Metric::Temperature, None);
        let payload = encode_snapshot(Header::Boot, &snapshot);
        let mut expected = REFERENCE;
        expected[3..5].fill(NO_DATA);
        assert_eq!(payload.as_bytes(), &expected);
    }

    #[test]
    fn test_empty_snapshot_is_all_sentinel() {
        let payload = encode_snapshot(Header::Update, &TelemetrySnapshot::empty());
        assert_eq!(payload.as_bytes()[0], 0x01);
        assert!(payload.as_bytes()[1..].iter().all(|b| *b == NO_DATA));
    }

    #[test]
    fn test_co2_is_clamped() {
        let snapshot = TelemetrySnapshot::empty().with(Metric::Co2, Some(70000.0));
        let payload = encode_snapshot(Header::Boot, &snapshot);
        assert_eq!(&payload.as_bytes()[6..8], &[0xFF, 0xFE]);
    }

    #[test]
    fn test_header_is_sticky() {
        let mut encoder = UplinkEncoder::new();
        assert_eq!(encoder.next_header(), Header::Boot);
        assert_eq!(encoder.encode(&reference_snapshot()).as_bytes()[0], 0x00);
        for _ in 0..10 {
            assert_eq!(encoder.encode(&reference_snapshot()).as_bytes()[0], 0x01);
        }
        let empty = encoder.encode(&TelemetrySnapshot::empty());
        assert_eq!(empty.as_bytes()[0], 0x01);
    }

    #[test]
    fn test_negative_temperature_rounds() {
        let snapshot = TelemetrySnapshot::empty().with(Metric::Temperature, Some(-5.25));
        let payload = encode_snapshot(Header::Boot, &snapshot);
        // round(-52.5) = -53 = 0xFFCB
        assert_eq!(&payload.as_bytes()[3..5], &[0xFF, 0xCB]);
    }

    #[test]
    fn test_temperature_saturates() {
        let snapshot = TelemetrySnapshot::empty().with(Metric::Temperature, Some(5000.0));
        let payload = encode_snapshot(Header::Boot, &snapshot);
        assert_eq!(&payload.as_bytes()[3..5], &[0x7F, 0xFF]);
    }

    #[test]
    fn test_unclamped_fields_wrap() {
        let snapshot = TelemetrySnapshot::empty()
            .with(Metric::Voltage, Some(9.0))
            .with(Metric::Humidity, Some(130.0))
            .with(Metric::Pressure, Some(70000.0));
        let payload = encode_snapshot(Header::Boot, &snapshot);
        assert_eq!(payload.as_bytes()[1], 14); // 270 mod 256
        assert_eq!(payload.as_bytes()[5], 4); // 260 mod 256
        assert_eq!(&payload.as_bytes()[10..12], &[0x11, 0x70]); // 70000 mod 65536
    }

    #[test]
    fn test_fractional_values_truncate() {
        let snapshot = TelemetrySnapshot::empty()
            .with(Metric::ChargeLevel, Some(87.9))
            .with(Metric::Voc, Some(120.7))
            .with(Metric::Humidity, Some(45.3));
        let payload = encode_snapshot(Header::Boot, &snapshot);
        assert_eq!(payload.as_bytes()[2], 87);
        assert_eq!(&payload.as_bytes()[8..10], &[0x00, 0x78]);
        assert_eq!(payload.as_bytes()[5], 90);
    }
}
