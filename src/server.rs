// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! HTTP API for curve editing and monitoring.
//!
//! Three endpoints back the curve-editor frontend: `POST
//! /api/generate-curve` replaces the curve and returns the sampled view,
//! `GET /api/config` returns the stored curve, and `GET /api/getFanSpeed`
//! returns the instantaneous speed as plain text. Errors from the
//! background delivery never surface here; the only client-visible
//! failures are malformed bodies and internal I/O errors.

use crate::actuator::ActuatorSink;
use crate::curve::{self, FanCurve, SampledCurve};
use crate::delivery;
use crate::sensor::TemperatureSource;
use crate::store::CurveStore;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Shared state handed to every handler.
pub struct AppState<S, A> {
    pub store: Arc<CurveStore>,
    pub sensor: Arc<S>,
    pub actuator: Arc<A>,
}

impl<S, A> Clone for AppState<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sensor: self.sensor.clone(),
            actuator: self.actuator.clone(),
        }
    }
}

/// Build the API router. When an assets directory is given it is served
/// at the root, below the API routes.
pub fn router<S, A>(state: AppState<S, A>, assets_dir: Option<PathBuf>) -> Router
where
    S: TemperatureSource + 'static,
    A: ActuatorSink + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/api/generate-curve", post(generate_curve::<S, A>))
        .route("/api/config", get(get_config::<S, A>))
        .route("/api/getFanSpeed", get(get_fan_speed::<S, A>))
        .with_state(state)
        .layer(cors);

    if let Some(dir) = assets_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}

/// Bind and serve the API until `shutdown` is notified.
pub async fn serve<S, A>(
    listen_addr: &str,
    state: AppState<S, A>,
    assets_dir: Option<PathBuf>,
    shutdown: Arc<Notify>,
) -> io::Result<()>
where
    S: TemperatureSource + 'static,
    A: ActuatorSink + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state, assets_dir))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Replace the curve, persist it, and return the sampled view. One
/// delivery attempt is spawned detached so the response never waits on
/// the actuator.
async fn generate_curve<S, A>(
    State(state): State<AppState<S, A>>,
    Json(config): Json<FanCurve>,
) -> Result<Json<SampledCurve>, StatusCode>
where
    S: TemperatureSource + 'static,
    A: ActuatorSink + 'static,
{
    let sampled = state.store.set(config).await.map_err(|e| {
        log::error!("Failed to persist curve config: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let store = state.store.clone();
    let sensor = state.sensor.clone();
    let actuator = state.actuator.clone();
    tokio::spawn(async move {
        delivery::deliver_once(&store, sensor.as_ref(), actuator.as_ref()).await;
    });

    Ok(Json(sampled))
}

async fn get_config<S, A>(State(state): State<AppState<S, A>>) -> Json<FanCurve>
where
    S: TemperatureSource + 'static,
    A: ActuatorSink + 'static,
{
    Json(state.store.get().await)
}

/// The instantaneous speed for the current temperature, as a plain-text
/// integer.
async fn get_fan_speed<S, A>(State(state): State<AppState<S, A>>) -> Result<String, StatusCode>
where
    S: TemperatureSource + 'static,
    A: ActuatorSink + 'static,
{
    let curve = state.store.get().await;
    let temperature = state.sensor.read_temperature().map_err(|e| {
        log::error!("Failed to read temperature: {e:#}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let percent = curve::speed_percent(curve.evaluate(temperature));
    Ok(percent.to_string())
}
