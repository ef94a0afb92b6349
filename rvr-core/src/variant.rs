//! Supported radar device families and their notification characteristics.

use std::fmt;
use std::str::FromStr;

use uuid::{uuid, Uuid};

use crate::decode::{decode_bit_packed, decode_byte_aligned, Decoded};
use crate::types::{RadarError, Result};

/// Radar measurement characteristic of the Garmin Varia family.
pub const GARMIN_VARIA_CHARACTERISTIC: Uuid = uuid!("6a4e3203-667b-11e3-949a-0800200c9a66");

/// Radar measurement characteristic of the Bryton Gardia family.
pub const BRYTON_GARDIA_CHARACTERISTIC: Uuid = uuid!("f3641401-00b0-4240-ba50-05ca45bf8abc");

/// Wire format spoken by a radar.
///
/// - `ByteAligned`: Garmin Varia RVR315, RTL515/516, RCT715 and compatible
///   (Magene L508).
/// - `BitPacked`: Bryton Gardia R300.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RadarVariant {
    #[default]
    ByteAligned,
    BitPacked,
}

impl RadarVariant {
    pub const ALL: [RadarVariant; 2] = [RadarVariant::ByteAligned, RadarVariant::BitPacked];

    /// Characteristic that carries this variant's measurement notifications.
    pub fn characteristic_id(&self) -> Uuid {
        match self {
            RadarVariant::ByteAligned => GARMIN_VARIA_CHARACTERISTIC,
            RadarVariant::BitPacked => BRYTON_GARDIA_CHARACTERISTIC,
        }
    }

    /// Canonical config/CLI name.
    pub fn name(&self) -> &'static str {
        match self {
            RadarVariant::ByteAligned => "garmin-varia",
            RadarVariant::BitPacked => "bryton-gardia",
        }
    }

    /// Decode one notification payload with this variant's wire format.
    pub fn decode(&self, data: &[u8]) -> Result<Decoded> {
        match self {
            RadarVariant::ByteAligned => Ok(decode_byte_aligned(data)),
            RadarVariant::BitPacked => decode_bit_packed(data),
        }
    }
}

impl fmt::Display for RadarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RadarVariant {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "garmin-varia" | "garmin" | "varia" | "byte-aligned" => Ok(RadarVariant::ByteAligned),
            "bryton-gardia" | "bryton" | "gardia" | "bit-packed" => Ok(RadarVariant::BitPacked),
            _ => Err(RadarError::UnknownVariant(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
