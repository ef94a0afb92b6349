//! rvr-replay: Replay captured radar notifications through a radar session.
//!
//! Each captured payload is pushed through the same session/decoder path a
//! live radar would use, and the decoded threats are printed per delivery.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;

use rvr_core::config::{self, OutputFormat};
use rvr_core::{hex_encode, RadarError, RadarMeasurement, RadarVariant};
use rvr_service::{RearViewRadarService, ReplayError, ReplayTransport};

mod capture;

use capture::{CaptureReader, Notification};

#[derive(Parser)]
#[command(
    name = "rvr-replay",
    version,
    about = "Decode captured bicycle radar notifications"
)]
struct Cli {
    /// Capture file with one hex payload per line
    file: PathBuf,

    /// Radar family: garmin-varia (byte-aligned) or bryton-gardia (bit-packed)
    #[arg(short, long)]
    variant: Option<RadarVariant>,

    /// Print one JSON object per delivery
    #[arg(long)]
    json: bool,

    /// Config file (default: ~/.rvr/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum ReplayToolError {
    #[error("{0}")]
    Capture(#[from] RadarError),
    #[error("{0}")]
    Transport(#[from] ReplayError),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-delivery JSON line.
#[derive(Serialize)]
struct Tick<'a> {
    timestamp: Option<f64>,
    threats: &'a [RadarMeasurement],
}

#[derive(Debug, Default, PartialEq)]
struct ReplayStats {
    deliveries: usize,
    observed: usize,
    faults: usize,
}

impl ReplayStats {
    /// Deliveries dropped as truncated (no observer call, no fault).
    fn incomplete(&self) -> usize {
        self.deliveries - self.observed - self.faults
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ReplayToolError> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    let variant = cli.variant.unwrap_or(config.radar.variant);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    let notifications = CaptureReader::new(&cli.file).read_all()?;
    info!(
        "Replaying {} notifications from {} as {variant}",
        notifications.len(),
        cli.file.display()
    );

    let stats = replay(variant, &config.radar.name, &notifications, format).await?;
    info!(
        "{} deliveries, {} decoded, {} incomplete, {} faults",
        stats.deliveries,
        stats.observed,
        stats.incomplete(),
        stats.faults
    );
    Ok(())
}

async fn replay(
    variant: RadarVariant,
    name: &str,
    notifications: &[Notification],
    format: OutputFormat,
) -> Result<ReplayStats, ReplayToolError> {
    let transport = Arc::new(ReplayTransport::new());
    let service = RearViewRadarService::with_name(Arc::clone(&transport), variant, name);

    let latest: Arc<Mutex<Option<Vec<RadarMeasurement>>>> = Arc::default();
    let sink = Arc::clone(&latest);
    service.set_radar_measurement_handler(move |measurements| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(measurements.to_vec());
        }
    });

    service.enable_radar_measurement_notifications().await?;

    let characteristic = variant.characteristic_id();
    let mut stats = ReplayStats::default();

    for notification in notifications {
        stats.deliveries += 1;
        match transport.deliver(characteristic, &notification.payload) {
            Ok(()) => {}
            Err(ReplayError::Decode(e)) => {
                warn!("{}", fault_message(stats.deliveries, notification, &e));
                stats.faults += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        let decoded = latest.lock().ok().and_then(|mut slot| slot.take());
        if let Some(measurements) = decoded {
            stats.observed += 1;
            print_tick(notification.timestamp, &measurements, format)?;
        }
    }

    service.disable_radar_measurement_notifications().await?;
    Ok(stats)
}

/// Warning line for a rejected delivery, echoing the payload bytes.
fn fault_message(delivery: usize, notification: &Notification, err: &RadarError) -> String {
    let at = notification
        .timestamp
        .map(|t| format!(" at {t:.3}"))
        .unwrap_or_default();
    format!(
        "delivery {delivery}{at}: {err} [{}]",
        hex_encode(&notification.payload)
    )
}

fn print_tick(
    timestamp: Option<f64>,
    measurements: &[RadarMeasurement],
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let tick = Tick {
                timestamp,
                threats: measurements,
            };
            println!("{}", serde_json::to_string(&tick)?);
        }
        OutputFormat::Text => {
            let prefix = timestamp.map(|t| format!("{t:.3} ")).unwrap_or_default();
            if measurements.is_empty() {
                println!("{prefix}clear");
            }
            for m in measurements {
                println!("{prefix}{m}");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use capture::parse_capture_line;

    fn notifications(lines: &[&str]) -> Vec<Notification> {
        lines
            .iter()
            .filter_map(|l| parse_capture_line(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_replay_byte_aligned_counts() {
        let input = notifications(&["0.1 0005", "0.2 00050A14", "0.3 00"]);
        let stats = replay(RadarVariant::ByteAligned, "test", &input, OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                deliveries: 3,
                observed: 2,
                faults: 0
            }
        );
        assert_eq!(stats.incomplete(), 1);
    }

    #[tokio::test]
    async fn test_replay_bit_packed_faults_are_counted() {
        let input = notifications(&["0001000400000200", "000100", "0000000000000000"]);
        let stats = replay(RadarVariant::BitPacked, "test", &input, OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(stats.deliveries, 3);
        assert_eq!(stats.observed, 2);
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.incomplete(), 0);
    }

    #[test]
    fn test_tick_json_shape() {
        let input = notifications(&["0001000400000200"]);
        let decoded = RadarVariant::BitPacked.decode(&input[0].payload).unwrap();
        let tick = Tick {
            timestamp: Some(1.5),
            threats: decoded.measurements().unwrap(),
        };
        let json = serde_json::to_value(&tick).unwrap();
        assert_eq!(json["timestamp"], 1.5);
        assert_eq!(json["threats"][0]["threat_id"], serde_json::Value::Null);
        assert_eq!(json["threats"][0]["level"], 1);
        assert_eq!(json["threats"][0]["distance"], 12.5);
    }

    #[test]
    fn test_fault_message_echoes_payload() {
        let input = notifications(&["2.25 0001ab", "0001ab"]);
        let err = RadarVariant::BitPacked.decode(&input[0].payload).unwrap_err();

        assert_eq!(
            fault_message(4, &input[0], &err),
            "delivery 4 at 2.250: invalid payload length: expected 8 bytes, got 3 [0001AB]"
        );
        assert_eq!(
            fault_message(5, &input[1], &err),
            "delivery 5: invalid payload length: expected 8 bytes, got 3 [0001AB]"
        );
    }

    #[test]
    fn test_cli_parses_variant() {
        let cli = Cli::parse_from(["rvr-replay", "ride.cap", "--variant", "bryton", "--json"]);
        assert_eq!(cli.variant, Some(RadarVariant::BitPacked));
        assert!(cli.json);
        assert_eq!(cli.file, PathBuf::from("ride.cap"));
    }
}
