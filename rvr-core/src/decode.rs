//! Decode radar notification payloads into measurement records.
//!
//! Two wire formats are supported:
//! - Byte-aligned (Garmin Varia): `[frame, (id, distance, speed)*]`, raw
//!   integer meters and km/h, one 3-byte group per threat.
//! - Bit-packed (Bryton Gardia): fixed 8 bytes
//!   `[page, level, side, dist1, dist2, dist3, speed1, speed2]` carrying four
//!   threat slots in 2-bit level, 6-bit distance and 4-bit speed fields.

use log::trace;

use crate::types::*;

/// Bytes per threat group in the byte-aligned format.
pub const BYTE_ALIGNED_GROUP_LEN: usize = 3;

/// Level reported for every byte-aligned threat. That format has no
/// severity field; a present group is a present threat.
pub const BYTE_ALIGNED_LEVEL: u8 = 1;

/// Exact length of a bit-packed payload.
pub const BIT_PACKED_LEN: usize = 8;

/// Number of threat slots in a bit-packed payload.
pub const BIT_PACKED_SLOTS: usize = 4;

/// Slots surfaced as measurements. Slots 3 and 4 are decoded but the
/// device family only ever reports two threats.
pub const BIT_PACKED_SURFACED_SLOTS: usize = 2;

/// Meters per raw distance unit (6-bit field).
pub const DISTANCE_SCALE_M: f64 = 3.125;

/// km/h per raw speed unit (4-bit field): 3.04 m/s steps.
pub const SPEED_SCALE_KMH: f64 = 3.04 * 3.6;

// ---------------------------------------------------------------------------
// Decode outcome
// ---------------------------------------------------------------------------

/// Successful decode result.
///
/// `Incomplete` is distinct from an empty measurement list: it means the
/// payload was cut short and should be discarded, while an empty list means
/// "no threats this tick". Faults are the `Err` side of [`Result`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Measurements(Vec<RadarMeasurement>),
    Incomplete,
}

impl Decoded {
    /// Decoded measurements, or `None` for a truncated payload.
    pub fn measurements(&self) -> Option<&[RadarMeasurement]> {
        match self {
            Decoded::Measurements(m) => Some(m),
            Decoded::Incomplete => None,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Decoded::Incomplete)
    }
}

impl FromIterator<RadarMeasurement> for Decoded {
    fn from_iter<I: IntoIterator<Item = RadarMeasurement>>(iter: I) -> Self {
        Decoded::Measurements(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Byte-aligned format
// ---------------------------------------------------------------------------

/// Decode a byte-aligned payload of `1 + 3*i` bytes.
///
/// Each group is `(threat_id, distance_m, speed_kmh)`, taken verbatim. A
/// trailing partial group (seen right after connecting) yields
/// [`Decoded::Incomplete`]. An empty payload, or a lone framing byte,
/// decodes to no threats.
pub fn decode_byte_aligned(data: &[u8]) -> Decoded {
    let Some(groups) = data.get(1..) else {
        return Decoded::Measurements(Vec::new());
    };

    if groups.len() % BYTE_ALIGNED_GROUP_LEN != 0 {
        return Decoded::Incomplete;
    }

    groups
        .chunks_exact(BYTE_ALIGNED_GROUP_LEN)
        .map(|group| {
            let (threat_id, distance, speed) = (group[0], group[1], group[2]);
            RadarMeasurement::new(
                Some(threat_id),
                BYTE_ALIGNED_LEVEL,
                f64::from(speed),
                f64::from(distance),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bit-packed format
// ---------------------------------------------------------------------------

/// One of the four threat slots of a bit-packed payload, unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThreatSlot {
    /// 2-bit threat level, 0 = empty slot.
    pub level: u8,
    /// 6-bit distance, units of [`DISTANCE_SCALE_M`].
    pub raw_distance: u8,
    /// 4-bit speed, units of [`SPEED_SCALE_KMH`].
    pub raw_speed: u8,
}

impl ThreatSlot {
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// Distance in meters.
    pub fn distance(&self) -> f64 {
        f64::from(self.raw_distance) * DISTANCE_SCALE_M
    }

    /// Speed in km/h.
    pub fn speed(&self) -> f64 {
        f64::from(self.raw_speed) * SPEED_SCALE_KMH
    }

    fn to_measurement(self) -> Option<RadarMeasurement> {
        if self.is_empty() {
            return None;
        }
        Some(RadarMeasurement::new(
            None,
            self.level,
            self.speed(),
            self.distance(),
        ))
    }
}

/// A parsed bit-packed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPackedFrame {
    pub page: u8,
    /// Side indicator byte. Not decoded further.
    pub threat_side: u8,
    pub slots: [ThreatSlot; BIT_PACKED_SLOTS],
}

impl BitPackedFrame {
    /// Parse an 8-byte payload. Any other length is a fault.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let bytes: &[u8; BIT_PACKED_LEN] =
            data.try_into().map_err(|_| RadarError::InvalidLength {
                expected: BIT_PACKED_LEN,
                actual: data.len(),
            })?;

        let [page, levels, threat_side, dist1, dist2, dist3, speed1, speed2] = *bytes;

        // Fields are packed least-significant slot first, so each group of
        // bytes reads as one little-endian word split into equal-width fields.
        let levels = u32::from(levels);
        let distances = u32::from_le_bytes([dist1, dist2, dist3, 0]);
        let speeds = u32::from(u16::from_le_bytes([speed1, speed2]));

        let mut slots = [ThreatSlot::default(); BIT_PACKED_SLOTS];
        for (n, slot) in slots.iter_mut().enumerate() {
            *slot = ThreatSlot {
                level: field(levels, n, 2),
                raw_distance: field(distances, n, 6),
                raw_speed: field(speeds, n, 4),
            };
        }

        trace!(
            "page={page} side={threat_side} levels={:?} distances={:?} speeds={:?}",
            slots.map(|s| s.level),
            slots.map(|s| s.distance()),
            slots.map(|s| s.speed()),
        );

        Ok(BitPackedFrame {
            page,
            threat_side,
            slots,
        })
    }

    /// Measurements for the surfaced slots with a nonzero level, in slot order.
    pub fn measurements(&self) -> Vec<RadarMeasurement> {
        self.slots[..BIT_PACKED_SURFACED_SLOTS]
            .iter()
            .filter_map(|slot| slot.to_measurement())
            .collect()
    }
}

/// Extract field `index` of `width` bits from a packed word.
fn field(word: u32, index: usize, width: usize) -> u8 {
    ((word >> (index * width)) & ((1u32 << width) - 1)) as u8
}

/// Decode an 8-byte bit-packed payload.
pub fn decode_bit_packed(data: &[u8]) -> Result<Decoded> {
    let frame = BitPackedFrame::parse(data)?;
    Ok(Decoded::Measurements(frame.measurements()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
