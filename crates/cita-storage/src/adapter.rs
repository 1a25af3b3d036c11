// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::OnceCell;
use tracing::debug;

use cita_config::model::StorageConfig;
use cita_core::{
    Appointment, AppointmentStore, CitaError, HealthStatus, NewAppointment, OptionStore, Page,
    PluginAdapter, StorageAdapter,
};
use cita_core::types::SCHEDULED_FORMAT;

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the query modules. The
/// database is opened by [`StorageAdapter::initialize`]; every other
/// operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](StorageAdapter::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, CitaError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    /// The configured database path.
    pub fn database_path(&self) -> &str {
        &self.config.database_path
    }

    fn db(&self) -> Result<&Database, CitaError> {
        self.db.get().ok_or_else(|| CitaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CitaError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CitaError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CitaError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CitaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CitaError> {
        self.db()?.checkpoint().await
    }
}

#[async_trait]
impl AppointmentStore for SqliteStorage {
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, CitaError> {
        queries::appointments::insert_appointment(self.db()?, appointment).await
    }

    async fn insert_if_free(&self, appointment: &NewAppointment) -> Result<Appointment, CitaError> {
        queries::appointments::insert_appointment_if_free(self.db()?, appointment)
            .await?
            .ok_or_else(|| CitaError::SlotReserved {
                scheduled: appointment.scheduled.format(SCHEDULED_FORMAT).to_string(),
            })
    }

    async fn has_overlap(&self, start: NaiveDateTime) -> Result<bool, CitaError> {
        queries::appointments::has_overlap(self.db()?, start).await
    }

    async fn list(&self, page: Page) -> Result<Vec<Appointment>, CitaError> {
        queries::appointments::list_appointments(self.db()?, page).await
    }

    async fn list_scheduled_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, CitaError> {
        queries::appointments::list_scheduled_between(self.db()?, start, end).await
    }

    async fn count(&self) -> Result<u64, CitaError> {
        queries::appointments::count_appointments(self.db()?).await
    }
}

#[async_trait]
impl OptionStore for SqliteStorage {
    async fn get_option(&self, key: &str) -> Result<Option<String>, CitaError> {
        queries::options::get_option(self.db()?, key).await
    }

    async fn set_option(&self, key: &str, value: &str) -> Result<(), CitaError> {
        queries::options::set_option(self.db()?, key, value).await
    }
}
