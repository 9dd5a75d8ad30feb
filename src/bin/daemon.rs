// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! fancurved: fan curve control daemon. Serves the curve-editor web API
//! and periodically pushes the computed fan speed to the microcontroller.

use clap::Parser;
use fan_curve_daemon::actuator::Actuator;
use fan_curve_daemon::config::{self, Settings};
use fan_curve_daemon::delivery;
use fan_curve_daemon::sensor::SystemSensor;
use fan_curve_daemon::server::{self, AppState};
use fan_curve_daemon::store::CurveStore;
use std::sync::Arc;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "fancurved", about = "Fan curve control daemon")]
struct Cli {
    /// Path to the settings file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the HTTP listen address.
    #[arg(short, long)]
    listen: Option<String>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(Some(&cli.config));
    let settings = config::load_settings(&config_path).unwrap_or_else(|e| {
        log::warn!("Could not load settings: {e}, using defaults");
        Settings::default()
    });

    let listen_addr = cli
        .listen
        .clone()
        .unwrap_or_else(|| settings.daemon.listen_addr.clone());

    let store = Arc::new(CurveStore::open(&settings.daemon.state_dir));
    let sensor = Arc::new(SystemSensor::from_config(&settings.sensor));
    let actuator = Arc::new(Actuator::from_config(&settings.actuator));

    let shutdown = Arc::new(Notify::new());

    // Signal handler
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Received shutdown signal");
        shutdown_signal.notify_waiters();
    });

    // Delivery loop, concurrent with the HTTP server below.
    let loop_handle = tokio::spawn(delivery::run(
        store.clone(),
        sensor.clone(),
        actuator.clone(),
        settings.daemon.interval_ms,
        shutdown.clone(),
    ));

    let state = AppState {
        store,
        sensor,
        actuator,
    };
    server::serve(
        &listen_addr,
        state,
        settings.daemon.assets_dir.clone(),
        shutdown,
    )
    .await?;

    loop_handle.await?;
    log::info!("Daemon stopped");
    Ok(())
}
