// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! `Database` is the single writer: query modules take `&Database` and go
//! through [`Database::connection`]. Do NOT open additional connections for writes.

use std::path::Path;

use cita_core::CitaError;
use tracing::{debug, info};

use crate::migrations;

/// Convert a tokio-rusqlite error into `CitaError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CitaError {
    CitaError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, CitaError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    ///
    /// Creates the parent directory when it does not exist yet.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, CitaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CitaError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CitaError::Storage {
                source: Box::new(e),
            })?;

        let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal_mode};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;"
            ))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        debug!(path, journal_mode, "database pragmas applied");

        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        info!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), CitaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), CitaError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}
