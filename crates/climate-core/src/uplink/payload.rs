use core::fmt::Write;

use heapless::String;

/// Size of one uplink report in bytes.
pub const PAYLOAD_LEN: usize = 12;

/// Sentinel byte meaning "no data" for the field it belongs to.
pub const NO_DATA: u8 = 0xFF;

/// First byte of every report.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// First report after power-up
    Boot = 0x00,
    /// Every later report
    Update = 0x01,
}

/// An encoded 12-byte uplink report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UplinkPayload {
    bytes: [u8; PAYLOAD_LEN],
}

impl UplinkPayload {
    /// A report with the given header and every field marked missing.
    pub const fn new(header: Header) -> Self {
        let mut bytes = [NO_DATA; PAYLOAD_LEN];
        bytes[0] = header as u8;
        Self { bytes }
    }

    pub const fn from_bytes(bytes: [u8; PAYLOAD_LEN]) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.bytes
    }

    pub(crate) fn set_u8(&mut self, offset: usize, value: u8) {
        self.bytes[offset] = value;
    }

    pub(crate) fn set_be(&mut self, offset: usize, value: [u8; 2]) {
        self.bytes[offset..offset + 2].copy_from_slice(&value);
    }

    /// Lowercase hex rendering for the diagnostic console.
    pub fn to_hex(&self) -> String<{ PAYLOAD_LEN * 2 }> {
        let mut hex = String::new();
        for byte in self.bytes {
            // 24 characters always fit.
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }
}
