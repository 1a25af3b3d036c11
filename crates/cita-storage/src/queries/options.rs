// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named option records.

use cita_core::CitaError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

/// Read an option value by name.
pub async fn get_option(db: &Database, name: &str) -> Result<Option<String>, CitaError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM options WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create or replace an option value.
pub async fn set_option(db: &Database, name: &str, value: &str) -> Result<(), CitaError> {
    let name = name.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO options (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![name, value],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
