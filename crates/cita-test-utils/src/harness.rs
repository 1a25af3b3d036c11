// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::NaiveDateTime;
use tower::ServiceExt;

use cita_config::model::{SchedulingConfig, StorageConfig};
use cita_core::types::SCHEDULED_FORMAT;
use cita_core::{Appointment, CitaError};
use cita_gateway::{GatewayState, HealthState, build_router};
use cita_scheduling::{AppointmentRequest, SchedulingService};
use cita_storage::SqliteStorage;

/// Fixed "now" used unless a test picks another one.
pub const DEFAULT_NOW: &str = "2026-01-15 09:00:00";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    now: String,
    scheduling: SchedulingConfig,
    cors_permissive: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            now: DEFAULT_NOW.to_string(),
            scheduling: SchedulingConfig::default(),
            cors_permissive: false,
        }
    }

    /// Pin the service clock to `now` (`YYYY-MM-DD HH:MM:SS`).
    pub fn with_now(mut self, now: &str) -> Self {
        self.now = now.to_string();
        self
    }

    /// Override listing page sizes.
    pub fn with_page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.scheduling = SchedulingConfig {
            default_page_size,
            max_page_size,
        };
        self
    }

    pub fn with_permissive_cors(mut self) -> Self {
        self.cors_permissive = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, CitaError> {
        let now = NaiveDateTime::parse_from_str(&self.now, SCHEDULED_FORMAT).map_err(|_| {
            CitaError::InvalidFormat {
                value: self.now.clone(),
            }
        })?;

        let temp_dir =
            tempfile::TempDir::new().map_err(|e| CitaError::Storage { source: e.into() })?;
        let storage = Arc::new(
            SqliteStorage::open(StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            })
            .await?,
        );

        let scheduling = Arc::new(
            SchedulingService::from_config(storage.clone(), &self.scheduling)
                .with_clock(Arc::new(move || now)),
        );
        let state = GatewayState {
            scheduling: scheduling.clone(),
            options: storage.clone(),
            health: HealthState {
                start_time: std::time::Instant::now(),
                storage: storage.clone(),
            },
        };
        let router = build_router(state, self.cors_permissive);

        Ok(TestHarness {
            storage,
            scheduling,
            router,
            _temp_dir: temp_dir,
        })
    }
}

/// Status, headers, and decoded JSON body of a routed request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    /// `Value::Null` for an empty body.
    pub body: serde_json::Value,
}

/// A complete test environment over a temp SQLite database.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub scheduling: Arc<SchedulingService>,
    /// Router with the production route table.
    pub router: Router,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder
            .body(body.unwrap_or_else(Body::empty))
            .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, &[]).await
    }

    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.request(
            Method::POST,
            uri,
            Some(Body::from(body.to_string())),
            &[(header::CONTENT_TYPE.as_str(), "application/json")],
        )
        .await
    }

    /// Book an appointment directly through the service.
    pub async fn book(&self, scheduled: &str, kind: &str) -> Result<Appointment, CitaError> {
        self.scheduling
            .create_appointment(AppointmentRequest {
                name: Some("Test Patient".to_string()),
                email: Some("patient@example.com".to_string()),
                phone: Some("555-0100".to_string()),
                reason: Some("Routine visit".to_string()),
                scheduled: Some(scheduled.to_string()),
                kind: Some(kind.to_string()),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_fixed_clock() {
        let harness = TestHarness::builder()
            .with_now("2030-05-05 12:00:00")
            .build()
            .await
            .unwrap();
        assert_eq!(
            harness.scheduling.now().format(SCHEDULED_FORMAT).to_string(),
            "2030-05-05 12:00:00"
        );
    }

    #[tokio::test]
    async fn invalid_now_is_rejected() {
        let result = TestHarness::builder().with_now("soon").build().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn get_returns_json() {
        let harness = TestHarness::builder().build().await.unwrap();
        let response = harness.get("/health").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "ok");
    }
}
