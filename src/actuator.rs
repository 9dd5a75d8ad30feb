// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Actuator transports.
//!
//! The microcontroller accepts a single integer speed percentage, either
//! as a newline-terminated decimal over serial or as a plain-text HTTP
//! POST body. Both transports are interchangeable behind [`ActuatorSink`];
//! connections are not pooled, each send opens the transport from scratch.

use crate::config::ActuatorConfig;
use anyhow::{Context, Result, bail};
use reqwest::header::CONTENT_TYPE;
use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Delivers an integer fan speed percentage (0-100) to the actuator.
pub trait ActuatorSink: Send + Sync {
    /// Deliver one speed value. Failures are reported to the caller and
    /// never retried here; the delivery cadence handles retry.
    fn send(&self, speed_percent: u8) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Serial
// ---------------------------------------------------------------------------

/// Serial transport: first matching device under `/dev`, fixed baud rate.
pub struct SerialActuator {
    device_pattern: String,
    baud_rate: u32,
}

impl SerialActuator {
    pub fn new(device_pattern: String, baud_rate: u32) -> Self {
        Self {
            device_pattern,
            baud_rate,
        }
    }

    /// Scan `/dev` for the first device whose name contains the pattern.
    fn discover_device(&self) -> Result<PathBuf> {
        let mut matches = Vec::new();
        for entry in fs::read_dir("/dev").context("failed to read /dev")? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            if entry
                .file_name()
                .to_string_lossy()
                .contains(&self.device_pattern)
            {
                matches.push(entry.path());
            }
        }

        matches.sort();
        matches.into_iter().next().with_context(|| {
            format!("no device matching '{}' found in /dev", self.device_pattern)
        })
    }
}

impl ActuatorSink for SerialActuator {
    async fn send(&self, speed_percent: u8) -> Result<()> {
        let path = self.discover_device()?;
        let mut port = serialport::new(path.to_string_lossy(), self.baud_rate)
            .timeout(Duration::from_secs(2))
            .open()
            .with_context(|| format!("failed to open serial port {}", path.display()))?;

        port.write_all(format!("{speed_percent}\n").as_bytes())
            .with_context(|| format!("failed to write to serial port {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// HTTP transport: POST the speed as a plain-text decimal body.
pub struct HttpActuator {
    url: String,
    client: reqwest::Client,
}

impl HttpActuator {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

impl ActuatorSink for HttpActuator {
    async fn send(&self, speed_percent: u8) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(speed_percent.to_string())
            .send()
            .await
            .with_context(|| format!("failed to POST fan speed to {}", self.url))?;

        if !response.status().is_success() {
            bail!("actuator at {} returned {}", self.url, response.status());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transport selection
// ---------------------------------------------------------------------------

/// The transport selected by daemon settings.
pub enum Actuator {
    Serial(SerialActuator),
    Http(HttpActuator),
}

impl Actuator {
    pub fn from_config(config: &ActuatorConfig) -> Self {
        match config {
            ActuatorConfig::Serial {
                device_pattern,
                baud_rate,
            } => Actuator::Serial(SerialActuator::new(device_pattern.clone(), *baud_rate)),
            ActuatorConfig::Http { url } => Actuator::Http(HttpActuator::new(url.clone())),
        }
    }
}

impl ActuatorSink for Actuator {
    async fn send(&self, speed_percent: u8) -> Result<()> {
        match self {
            Actuator::Serial(serial) => serial.send(speed_percent).await,
            Actuator::Http(http) => http.send(speed_percent).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_device_no_match() {
        let actuator = SerialActuator::new("no-such-device-xyzzy".to_string(), 115_200);
        let err = actuator.discover_device().unwrap_err();
        assert!(err.to_string().contains("no-such-device-xyzzy"));
    }

    #[test]
    fn test_from_config_picks_transport() {
        let serial = Actuator::from_config(&ActuatorConfig::default());
        assert!(matches!(serial, Actuator::Serial(_)));

        let http = Actuator::from_config(&ActuatorConfig::Http {
            url: "http://esp32.local/fan-speed".to_string(),
        });
        assert!(matches!(http, Actuator::Http(_)));
    }
}
