// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! The route table is built once by [`build_router`] and handed to
//! [`start_server`] by value.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cita_config::model::ServerConfig;
use cita_core::{CitaError, OptionStore, PluginAdapter};
use cita_scheduling::SchedulingService;

use crate::handlers;

pub const HEALTH_PATH: &str = "/health";
pub const APPOINTMENTS_PATH: &str = "/medical/v1/appointments";
pub const CALENDAR_PATH: &str = "/medical/v1/calendar";
pub const SETTINGS_PATH: &str = "/custom/v1/settings";

/// Health state for the `/health` endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Adapter checked on each health request.
    pub storage: Arc<dyn PluginAdapter>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub scheduling: Arc<SchedulingService>,
    pub options: Arc<dyn OptionStore>,
    pub health: HealthState,
}

/// Build the application router.
///
/// | method | path |
/// |---|---|
/// | GET | `/health` |
/// | POST, GET | `/medical/v1/appointments` |
/// | GET | `/medical/v1/calendar` |
/// | GET, POST | `/custom/v1/settings` |
pub fn build_router(state: GatewayState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route(HEALTH_PATH, get(handlers::get_health))
        .route(
            APPOINTMENTS_PATH,
            post(handlers::create_appointment).get(handlers::list_appointments),
        )
        .route(CALENDAR_PATH, get(handlers::get_calendar))
        .route(
            SETTINGS_PATH,
            get(handlers::get_settings).post(handlers::post_settings),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Bind to the configured host:port and serve `router` until `shutdown`
/// is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), CitaError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CitaError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CitaError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
