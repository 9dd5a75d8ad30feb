// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Temperature sources.
//!
//! The daemon prefers IPMI readings (averaged across the configured CPU
//! sensors, obtained via `ipmitool`) and falls back to a sysfs thermal
//! zone when IPMI is unavailable.

use crate::config::SensorConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Supplies the current temperature in degrees Celsius.
pub trait TemperatureSource: Send + Sync {
    fn read_temperature(&self) -> Result<f64>;
}

// ---------------------------------------------------------------------------
// IPMI
// ---------------------------------------------------------------------------

/// Averages readings from named IPMI sensors via `ipmitool sensor get`.
pub struct IpmiSensor {
    sensors: Vec<String>,
}

impl IpmiSensor {
    pub fn new(sensors: Vec<String>) -> Self {
        Self { sensors }
    }

    fn read_sensor(&self, name: &str) -> Result<f64> {
        let output = Command::new("ipmitool")
            .args(["sensor", "get", name])
            .output()
            .with_context(|| format!("failed to run ipmitool for sensor '{name}'"))?;

        if !output.status.success() {
            bail!("ipmitool exited with {} for sensor '{name}'", output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_sensor_reading(&stdout)
            .with_context(|| format!("no reading found for sensor '{name}'"))
    }
}

impl TemperatureSource for IpmiSensor {
    fn read_temperature(&self) -> Result<f64> {
        if self.sensors.is_empty() {
            bail!("no IPMI sensors configured");
        }

        let mut sum = 0.0;
        for name in &self.sensors {
            sum += self.read_sensor(name)?;
        }
        Ok(sum / self.sensors.len() as f64)
    }
}

/// Parse the `Sensor Reading` line of `ipmitool sensor get` output.
fn parse_sensor_reading(output: &str) -> Option<f64> {
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !key.contains("Sensor Reading") {
            continue;
        }
        let reading = value.trim().split_whitespace().next()?;
        return reading.parse().ok();
    }
    None
}

// ---------------------------------------------------------------------------
// Thermal zone
// ---------------------------------------------------------------------------

/// Reads a sysfs thermal zone file (millidegrees Celsius).
pub struct ThermalZoneSensor {
    path: PathBuf,
}

impl ThermalZoneSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemperatureSource for ThermalZoneSensor {
    fn read_temperature(&self) -> Result<f64> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let millic: i64 = contents
            .trim()
            .parse()
            .with_context(|| format!("failed to parse temperature in {}", self.path.display()))?;
        Ok(millic as f64 / 1000.0)
    }
}

// ---------------------------------------------------------------------------
// Combined system sensor
// ---------------------------------------------------------------------------

/// The daemon's temperature source: IPMI first, thermal zone fallback.
pub struct SystemSensor {
    ipmi: IpmiSensor,
    thermal: ThermalZoneSensor,
}

impl SystemSensor {
    pub fn from_config(config: &SensorConfig) -> Self {
        Self {
            ipmi: IpmiSensor::new(config.ipmi_sensors.clone()),
            thermal: ThermalZoneSensor::new(config.thermal_zone.clone()),
        }
    }
}

impl TemperatureSource for SystemSensor {
    fn read_temperature(&self) -> Result<f64> {
        match self.ipmi.read_temperature() {
            Ok(temp) => Ok(temp),
            Err(e) => {
                log::debug!("IPMI read failed ({e:#}), falling back to thermal zone");
                self.thermal.read_temperature()
            }
        }
    }
}
