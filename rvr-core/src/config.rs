//! Configuration file management for rvr.
//!
//! Reads/writes `~/.rvr/config.yaml` with the radar variant to decode and
//! the output format used by the replay tool. Characteristic identifiers
//! are fixed per variant and are not configurable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::RadarError;
use crate::variant::RadarVariant;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub radar: RadarConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarConfig {
    pub variant: RadarVariant,
    /// Free-form label used in log lines.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// How decoded measurements are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(RadarError::Config(format!("unknown output format: {other}"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            radar: RadarConfig {
                variant: RadarVariant::default(),
                name: "rear".into(),
            },
            output: OutputConfig {
                format: OutputFormat::default(),
            },
        }
    }
}

/// Get the config directory path (`~/.rvr/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".rvr")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.rvr/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            log::warn!("could not read {}: {e}, using defaults", path.display());
            Config::default()
        }
    }
}

/// Save config to `~/.rvr/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, RadarError> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), RadarError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| RadarError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| RadarError::Config(e.to_string()))
}

/// Parse simple YAML-like config text. Unknown keys and bad values are
/// skipped with a warning and leave the default in place.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<&str> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = strip_comment(val.trim());

        if !is_indented {
            current_section = if val.is_empty() { Some(key) } else { None };
            continue;
        }

        let Some(value) = parse_string_value(val) else {
            continue;
        };

        match (current_section, key) {
            (Some("radar"), "variant") => match value.parse() {
                Ok(variant) => config.radar.variant = variant,
                Err(e) => log::warn!("config: {e}"),
            },
            (Some("radar"), "name") => config.radar.name = value,
            (Some("output"), "format") => match value.parse() {
                Ok(format) => config.output.format = format,
                Err(e) => log::warn!("config: {e}"),
            },
            (section, key) => log::debug!("config: ignoring {section:?}.{key}"),
        }
    }

    config
}

fn strip_comment(val: &str) -> &str {
    if val.starts_with('"') || val.starts_with('\'') {
        return val;
    }
    match val.split_once(" #") {
        Some((v, _)) => v.trim_end(),
        None => val,
    }
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let lines = [
        "# rvr configuration".to_string(),
        String::new(),
        "radar:".into(),
        format!("  variant: \"{}\"", config.radar.variant),
        format!("  name: \"{}\"", config.radar.name),
        String::new(),
        "output:".into(),
        format!("  format: \"{}\"", config.output.format),
    ];

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.radar.variant, RadarVariant::ByteAligned);
        assert_eq!(config.radar.name, "rear");
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
radar:
  variant: "bryton-gardia"
  name: 'commuter'

output:
  format: json   # one JSON array per notification
"#;
        let config = parse_config(text);
        assert_eq!(config.radar.variant, RadarVariant::BitPacked);
        assert_eq!(config.radar.name, "commuter");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_bad_values_keep_defaults() {
        let text = r#"
radar:
  variant: "sonar"
  name: null

output:
  format: xml
"#;
        assert_eq!(parse_config(text), Config::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            radar: RadarConfig {
                variant: RadarVariant::BitPacked,
                name: "gravel".into(),
            },
            output: OutputConfig {
                format: OutputFormat::Json,
            },
        };
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.yaml"));
        assert_eq!(config, Config::default());
    }
}
