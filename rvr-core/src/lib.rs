//! rvr-core: Pure decode library for bicycle rear-view radar notifications.
//!
//! No async, no transport — just the wire formats. This crate is the shared
//! core used by `rvr-service` (session + facade) and `rvr-replay` (CLI).

pub mod config;
pub mod decode;
pub mod types;
pub mod variant;

// Re-export commonly used types at crate root
pub use decode::{decode_bit_packed, decode_byte_aligned, BitPackedFrame, Decoded, ThreatSlot};
pub use types::*;
pub use variant::RadarVariant;
