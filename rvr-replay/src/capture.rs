//! Capture file input for replaying radar notifications.
//!
//! One notification per line, hex encoded:
//! - `00050A14`               payload only
//! - `12.504 00050A14`        timestamp (seconds, with a decimal point) then payload
//! - `*00050A14;`             dump-style framing
//!
//! Blank lines and `#` comments are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use rvr_core::{hex_decode, RadarError};

/// One captured notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub timestamp: Option<f64>,
    pub payload: Vec<u8>,
}

/// Reads a capture file into notifications.
pub struct CaptureReader {
    path: PathBuf,
}

impl CaptureReader {
    pub fn new(path: &Path) -> Self {
        CaptureReader {
            path: path.to_path_buf(),
        }
    }

    /// Read every notification in the file. Unparseable lines are logged and
    /// skipped.
    pub fn read_all(&self) -> Result<Vec<Notification>, RadarError> {
        let content = fs::read_to_string(&self.path)?;
        let mut notifications = Vec::new();

        for (i, line) in content.lines().enumerate() {
            match parse_capture_line(line) {
                Ok(Some(n)) => notifications.push(n),
                Ok(None) => {}
                Err(e) => log::warn!("{}:{}: {e}", self.path.display(), i + 1),
            }
        }

        Ok(notifications)
    }
}

/// Parse one capture line. `Ok(None)` for blank and comment lines.
pub fn parse_capture_line(line: &str) -> Result<Option<Notification>, RadarError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (timestamp, hex) = match line.split_once(char::is_whitespace) {
        // A bare "00" is a payload byte, so timestamps need a decimal point.
        Some((first, rest)) if first.contains('.') => match first.parse::<f64>() {
            Ok(ts) => (Some(ts), rest.trim()),
            Err(_) => (None, line),
        },
        _ => (None, line),
    };

    let hex = hex
        .strip_prefix('*')
        .and_then(|h| h.strip_suffix(';'))
        .unwrap_or(hex);

    let payload = hex_decode(hex).ok_or_else(|| RadarError::InvalidHex(hex.to_string()))?;
    Ok(Some(Notification { timestamp, payload }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
