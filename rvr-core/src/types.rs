//! Shared types, error enum, and the decoded measurement record for rvr-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by rvr-core.
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("invalid payload length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("unknown radar variant: {0}")]
    UnknownVariant(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;

// ---------------------------------------------------------------------------
// Measurement record
// ---------------------------------------------------------------------------

/// One approaching object reported by the radar.
///
/// Only ever built for a slot whose `level` is nonzero; level 0 means the
/// slot is empty and is filtered out by the decoders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarMeasurement {
    /// Persistent track id. `None` for formats that carry no identity.
    pub threat_id: Option<u8>,
    /// Threat severity, 1..=3 on the bit-packed format.
    pub level: u8,
    /// Closing speed in km/h.
    pub speed: f64,
    /// Distance behind the rider in meters.
    pub distance: f64,
}

impl RadarMeasurement {
    pub(crate) fn new(threat_id: Option<u8>, level: u8, speed: f64, distance: f64) -> Self {
        debug_assert!(level > 0, "empty threat slots are never emitted");
        RadarMeasurement {
            threat_id,
            level,
            speed,
            distance,
        }
    }
}

impl std::fmt::Display for RadarMeasurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.threat_id {
            Some(id) => write!(f, "#{id:<3}")?,
            None => write!(f, "#-  ")?,
        }
        write!(
            f,
            " level={} distance={:.1}m speed={:.1}km/h",
            self.level, self.distance, self.speed
        )
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, whitespace between
/// byte pairs is ignored.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| Some((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?))
        .collect()
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("00050A14"), Some(vec![0x00, 0x05, 0x0A, 0x14]));
        assert_eq!(hex_decode("00 05 0a 14"), Some(vec![0x00, 0x05, 0x0A, 0x14]));
        assert_eq!(hex_decode(""), Some(vec![]));
        assert_eq!(hex_decode("abc"), None); // odd length
        assert_eq!(hex_decode("ZZZZ"), None); // invalid chars
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0x05, 0x0A, 0x14]), "00050A14");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_measurement_display() {
        let m = RadarMeasurement::new(Some(5), 1, 20.0, 10.0);
        assert_eq!(m.to_string(), "#5   level=1 distance=10.0m speed=20.0km/h");

        let m = RadarMeasurement::new(None, 2, 10.944, 3.125);
        assert_eq!(m.to_string(), "#-   level=2 distance=3.1m speed=10.9km/h");
    }

    #[test]
    fn test_invalid_length_message() {
        let err = RadarError::InvalidLength {
            expected: 8,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid payload length: expected 8 bytes, got 3"
        );
    }
}
