// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduling service: validates, conflict-checks, and persists
//! appointments, and derives monthly availability.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use cita_config::model::SchedulingConfig;
use cita_config::validation::PAGE_SIZE_CEILING;
use cita_core::types::SCHEDULED_FORMAT;
use cita_core::{
    Appointment, AppointmentDay, AppointmentStore, AppointmentType, CitaError, NewAppointment, Page,
};

use crate::calendar;
use crate::validation::{
    is_valid_email, parse_scheduled, required_text, sanitize_text, sanitize_textarea,
};

/// Source of the current wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall time, matching the naive `scheduled` values clients send.
pub fn local_clock() -> Clock {
    Arc::new(|| chrono::Local::now().naive_local())
}

/// Raw create-appointment input, as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub reason: Option<String>,
    pub scheduled: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub struct SchedulingService {
    store: Arc<dyn AppointmentStore>,
    clock: Clock,
    default_page_size: u32,
    max_page_size: u32,
}

impl SchedulingService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self::from_config(store, &SchedulingConfig::default())
    }

    pub fn from_config(store: Arc<dyn AppointmentStore>, config: &SchedulingConfig) -> Self {
        let max_page_size = config.max_page_size.clamp(1, PAGE_SIZE_CEILING);
        Self {
            store,
            clock: local_clock(),
            default_page_size: config.default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    /// Replace the clock used for the in-past check and calendar defaults.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn store(&self) -> &Arc<dyn AppointmentStore> {
        &self.store
    }

    /// Validate and book an appointment.
    ///
    /// Gates run in order: sanitize required fields, scheduled format,
    /// not in the past, type, free slot. The first failing gate decides the
    /// error.
    pub async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<Appointment, CitaError> {
        let candidate = self.validate(&request)?;
        let scheduled = candidate.scheduled.format(SCHEDULED_FORMAT).to_string();

        if self.store.has_overlap(candidate.scheduled).await? {
            info!(%scheduled, "appointment rejected: slot reserved");
            return Err(CitaError::SlotReserved { scheduled });
        }

        match self.store.insert_if_free(&candidate).await {
            Ok(appointment) => {
                info!(id = appointment.id, %scheduled, "appointment booked");
                Ok(appointment)
            }
            Err(e @ CitaError::SlotReserved { .. }) => {
                warn!(%scheduled, "slot claimed by a concurrent request");
                Err(e)
            }
            Err(e) => {
                error!(%scheduled, error = %e, "failed to persist appointment");
                Err(e)
            }
        }
    }

    fn validate(&self, request: &AppointmentRequest) -> Result<NewAppointment, CitaError> {
        let name = required_text("name", request.name.as_deref())?;

        let email = request.email.as_deref().unwrap_or_default().trim().to_string();
        if email.is_empty() {
            return Err(CitaError::MissingParam {
                name: "email".to_string(),
            });
        }
        if !is_valid_email(&email) {
            return Err(CitaError::InvalidEmail { value: email });
        }

        let reason = sanitize_textarea(request.reason.as_deref().unwrap_or_default());
        if reason.is_empty() {
            return Err(CitaError::MissingParam {
                name: "reason".to_string(),
            });
        }

        let phone = sanitize_text(request.phone.as_deref().unwrap_or_default());

        let raw_scheduled = request
            .scheduled
            .as_deref()
            .ok_or_else(|| CitaError::MissingParam {
                name: "scheduled".to_string(),
            })?;
        let scheduled = parse_scheduled(raw_scheduled)?;
        if scheduled < self.now() {
            debug!(scheduled = raw_scheduled, "appointment rejected: in the past");
            return Err(CitaError::InPast {
                scheduled: raw_scheduled.to_string(),
            });
        }

        let kind = AppointmentType::parse_optional(request.kind.as_deref())?;

        Ok(NewAppointment {
            name,
            email,
            phone,
            reason,
            scheduled,
            kind,
        })
    }

    /// Resolve optional paging input: page defaults to 1, limit to the
    /// configured default; both are clamped into range.
    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> Page {
        Page {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(self.default_page_size)
                .clamp(1, self.max_page_size),
        }
    }

    pub async fn list_appointments(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Appointment>, CitaError> {
        let page = self.page(page, limit);
        debug!(page = page.page, limit = page.limit, "listing appointments");
        self.store.list(page).await
    }

    /// Availability grid for `year`-`month`.
    pub async fn calendar(&self, year: i32, month: u32) -> Result<Vec<AppointmentDay>, CitaError> {
        let (start, end) = calendar::month_bounds(year, month)?;
        let scheduled = self.store.list_scheduled_in_range(start, end).await?;
        debug!(year, month, reserved = scheduled.len(), "building calendar");
        calendar::build_calendar(year, month, &scheduled)
    }
}
