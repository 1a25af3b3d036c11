// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle, the appointment store, and the option store.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::CitaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Appointment, NewAppointment, Page};

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), CitaError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CitaError>;
}

/// Persistence of appointment records and slot queries.
///
/// A slot is the half-open interval `[scheduled, scheduled + 1h)`.
#[async_trait]
pub trait AppointmentStore: Send + Sync + 'static {
    /// Persist a record and return it with its newly assigned id.
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, CitaError>;

    /// Overlap check and insert as one atomic step.
    ///
    /// Fails with [`CitaError::SlotReserved`] when an existing slot
    /// intersects the new one.
    async fn insert_if_free(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CitaError>;

    /// True iff an existing slot intersects `[start, start + 1h)`.
    async fn has_overlap(&self, start: NaiveDateTime) -> Result<bool, CitaError>;

    /// Records ordered by scheduled time ascending.
    async fn list(&self, page: Page) -> Result<Vec<Appointment>, CitaError>;

    /// All scheduled times with `start <= scheduled <= end`.
    async fn list_scheduled_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, CitaError>;

    /// Total number of stored appointments.
    async fn count(&self) -> Result<u64, CitaError>;
}

/// Generic string key/value persistence.
///
/// Callers should go through a typed accessor such as
/// [`crate::settings::HomeSettings`] rather than using raw keys.
#[async_trait]
pub trait OptionStore: Send + Sync + 'static {
    /// Read the raw value stored under `key`.
    async fn get_option(&self, key: &str) -> Result<Option<String>, CitaError>;

    /// Insert or replace the value stored under `key`.
    async fn set_option(&self, key: &str, value: &str) -> Result<(), CitaError>;
}
