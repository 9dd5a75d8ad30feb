// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Daemon settings.
//!
//! Runtime settings (cadence, listen address, sensor and actuator wiring)
//! live in a TOML file. The fan curve itself is persisted separately as
//! JSON by the store, because the web frontend overwrites it at runtime.
//! Default path: `/etc/fancurved/config.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default settings file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/fancurved/config.toml";

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default delivery interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default serial device name pattern scanned for under `/dev`.
pub const DEFAULT_DEVICE_PATTERN: &str = "ttyUSB";

/// Default serial baud rate; must match the microcontroller's.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default sysfs thermal zone used when IPMI is unavailable.
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

// ---------------------------------------------------------------------------
// Settings types
// ---------------------------------------------------------------------------

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Daemon settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Temperature source settings.
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Actuator transport settings.
    #[serde(default)]
    pub actuator: ActuatorConfig,
}

/// Daemon-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Delivery loop cadence, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory holding the persisted curve documents.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Optional directory of frontend assets served at the root.
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            state_dir: default_state_dir(),
            assets_dir: None,
        }
    }
}

/// Temperature source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// IPMI sensor names whose readings are averaged into one value.
    #[serde(default = "default_ipmi_sensors")]
    pub ipmi_sensors: Vec<String>,

    /// Thermal zone file read when IPMI is unavailable.
    #[serde(default = "default_thermal_zone")]
    pub thermal_zone: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ipmi_sensors: default_ipmi_sensors(),
            thermal_zone: default_thermal_zone(),
        }
    }
}

/// How computed speeds reach the microcontroller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ActuatorConfig {
    /// Newline-terminated decimal over a serial port found by scanning
    /// `/dev` for a matching device name.
    Serial {
        #[serde(default = "default_device_pattern")]
        device_pattern: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },

    /// Decimal string POSTed as a `text/plain` body.
    Http { url: String },
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self::Serial {
            device_pattern: DEFAULT_DEVICE_PATTERN.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load settings from a TOML file, or return the defaults if the file
/// doesn't exist.
pub fn load_settings(path: &Path) -> io::Result<Settings> {
    if !path.exists() {
        log::info!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse settings: {e}"),
        )
    })?;

    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Resolve the settings file path from CLI arg or default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_ipmi_sensors() -> Vec<String> {
    vec!["CPU1 Temp".to_string(), "CPU2 Temp".to_string()]
}

fn default_thermal_zone() -> PathBuf {
    PathBuf::from(DEFAULT_THERMAL_ZONE)
}

fn default_device_pattern() -> String {
    DEFAULT_DEVICE_PATTERN.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
