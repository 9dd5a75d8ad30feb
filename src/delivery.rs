// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! The periodic delivery loop.
//!
//! Every tick: load the current curve, read the temperature, evaluate the
//! curve, and push the rounded speed to the actuator. Any I/O failure is
//! logged and abandons the rest of the tick; the next tick retries from
//! scratch, so there is no backoff state to manage. The loop only stops
//! when the shutdown notifier fires.

use crate::actuator::ActuatorSink;
use crate::curve;
use crate::sensor::TemperatureSource;
use crate::store::CurveStore;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{self, Duration};

/// Run the delivery loop until `shutdown` is notified.
pub async fn run<S, A>(
    store: Arc<CurveStore>,
    sensor: Arc<S>,
    actuator: Arc<A>,
    interval_ms: u64,
    shutdown: Arc<Notify>,
) where
    S: TemperatureSource,
    A: ActuatorSink,
{
    let mut interval = time::interval(Duration::from_millis(interval_ms));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                deliver_once(&store, sensor.as_ref(), actuator.as_ref()).await;
            }
            _ = shutdown.notified() => {
                log::info!("Delivery loop shutting down");
                break;
            }
        }
    }
}

/// One delivery attempt: read temperature, evaluate, send.
///
/// Also used directly for the best-effort push after a curve update; it
/// is not synchronized with the periodic loop, and interleaved sends are
/// acceptable (the actuator keeps the last value written).
pub async fn deliver_once<S, A>(store: &CurveStore, sensor: &S, actuator: &A)
where
    S: TemperatureSource,
    A: ActuatorSink,
{
    let curve = store.get().await;

    let temperature = match sensor.read_temperature() {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to read temperature: {e:#}");
            return;
        }
    };

    let percent = curve::speed_percent(curve.evaluate(temperature));

    match actuator.send(percent).await {
        Ok(()) => log::info!("Delivered fan speed {percent}% for {temperature:.1}C"),
        Err(e) => log::error!("Failed to deliver fan speed: {e:#}"),
    }
}
