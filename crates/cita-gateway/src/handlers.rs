// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the appointment, settings, and health routes.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use cita_core::{Appointment, AppointmentDay, CitaError, HealthStatus, HomeSettings};
use cita_scheduling::AppointmentRequest;

use crate::server::GatewayState;

/// `data` member of an error body.
#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub status: u16,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    pub data: ErrorData,
}

/// A failed request, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn invalid_param(name: &str, reason: impl std::fmt::Display) -> Self {
        CitaError::InvalidParam {
            name: name.to_string(),
            reason: reason.to_string(),
        }
        .into()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<CitaError> for ApiError {
    fn from(err: CitaError) -> Self {
        let status =
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = err.code();
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            // Server-side detail stays in the log.
            error!(error = %err, code, "request failed");
            match err {
                CitaError::Storage { .. } => "the appointment store is unavailable".to_string(),
                _ => "internal error".to_string(),
            }
        };
        Self {
            status,
            code,
            message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_json",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
            data: ErrorData {
                status: self.status.as_u16(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Parse an optional numeric query parameter; empty counts as absent.
fn parse_param<T>(name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::invalid_param(name, format!("`{value}`: {e}"))),
    }
}

/// Query string for GET /medical/v1/appointments.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query string for GET /medical/v1/calendar.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub month: Option<String>,
    pub year: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Storage adapter health.
    pub storage: String,
}

/// POST /medical/v1/appointments
pub async fn create_appointment(
    State(state): State<GatewayState>,
    payload: Result<Json<AppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Json(request) = payload?;
    let appointment = state.scheduling.create_appointment(request).await?;
    Ok(Json(appointment))
}

/// GET /medical/v1/appointments
pub async fn list_appointments(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let page = parse_param::<u32>("page", params.page.as_deref())?;
    let limit = parse_param::<u32>("limit", params.limit.as_deref())?;
    let appointments = state.scheduling.list_appointments(page, limit).await?;
    Ok(Json(appointments))
}

/// GET /medical/v1/calendar
///
/// Month and year default to the current ones; years after the current
/// year are rejected.
pub async fn get_calendar(
    State(state): State<GatewayState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<Vec<AppointmentDay>>, ApiError> {
    let today = state.scheduling.now().date();
    let month = parse_param::<u32>("month", params.month.as_deref())?.unwrap_or(today.month());
    let year = parse_param::<i32>("year", params.year.as_deref())?.unwrap_or(today.year());
    if year > today.year() {
        return Err(ApiError::invalid_param(
            "year",
            format!("must not be after {}, got {year}", today.year()),
        ));
    }
    debug!(year, month, "calendar requested");
    let days = state.scheduling.calendar(year, month).await?;
    Ok(Json(days))
}

/// GET /custom/v1/settings
pub async fn get_settings(
    State(state): State<GatewayState>,
) -> Result<Json<HomeSettings>, ApiError> {
    Ok(Json(HomeSettings::load(state.options.as_ref()).await?))
}

/// POST /custom/v1/settings
pub async fn post_settings(
    State(state): State<GatewayState>,
    payload: Result<Json<HomeSettings>, JsonRejection>,
) -> Result<Json<HomeSettings>, ApiError> {
    let Json(settings) = payload?;
    settings.save(state.options.as_ref()).await?;
    Ok(Json(settings))
}

/// GET /health
///
/// 200 while storage answers, 503 otherwise.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (status, storage) = match state.health.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        storage,
    };
    (status, Json(body)).into_response()
}
