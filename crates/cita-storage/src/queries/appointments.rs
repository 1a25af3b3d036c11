// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment operations.
//!
//! `scheduled` is stored as `YYYY-MM-DD HH:MM:SS` text, which sorts in time
//! order, so range and overlap checks are plain text comparisons on the
//! indexed column.

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use cita_core::CitaError;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::database::Database;
use cita_core::types::{Appointment, AppointmentType, NewAppointment, Page, SCHEDULED_FORMAT};

const SELECT_COLUMNS: &str = "SELECT id, name, email, phone, reason, scheduled, type FROM appointments";

fn format_scheduled(value: NaiveDateTime) -> String {
    value.format(SCHEDULED_FORMAT).to_string()
}

/// Years whose `%Y` rendering is four plain digits, so text order matches
/// time order.
fn in_text_range(value: NaiveDateTime) -> bool {
    (0..=9999).contains(&value.year())
}

/// Format a timestamp for storage, refusing values the text column cannot
/// order.
fn storable(value: NaiveDateTime) -> Result<String, CitaError> {
    if !in_text_range(value) {
        return Err(CitaError::InvalidFormat {
            value: value.to_string(),
        });
    }
    Ok(format_scheduled(value))
}

fn parse_scheduled(raw: &str, column: usize) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(raw, SCHEDULED_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn row_to_appointment(row: &Row<'_>) -> Result<Appointment, rusqlite::Error> {
    let scheduled: String = row.get(5)?;
    let kind: Option<String> = row.get(6)?;
    Ok(Appointment {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        reason: row.get(4)?,
        scheduled: parse_scheduled(&scheduled, 5)?,
        // Unrecognized stored values read back as untyped.
        kind: kind.and_then(|k| k.parse::<AppointmentType>().ok()),
    })
}

/// Exclusive bounds on an existing `scheduled` value whose slot intersects
/// `[start, start + 1h)`.
///
/// `existing < start + 1h && existing + 1h > start` is the same as
/// `start - 1h < existing < start + 1h`. A bound that leaves the storable
/// range is left open: `""` sorts below and `"~"` above every stored value.
fn overlap_window(start: NaiveDateTime) -> Result<(String, String), CitaError> {
    storable(start)?;
    let hour = TimeDelta::hours(1);
    let lower = start
        .checked_sub_signed(hour)
        .filter(|t| in_text_range(*t))
        .map(format_scheduled)
        .unwrap_or_default();
    let upper = start
        .checked_add_signed(hour)
        .filter(|t| in_text_range(*t))
        .map(format_scheduled)
        .unwrap_or_else(|| "~".to_string());
    Ok((lower, upper))
}

fn overlap_exists(conn: &Connection, lower: &str, upper: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT 1 FROM appointments WHERE scheduled > ?1 AND scheduled < ?2 LIMIT 1",
        params![lower, upper],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn insert_row(
    conn: &Connection,
    appointment: &NewAppointment,
    scheduled: &str,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO appointments (name, email, phone, reason, scheduled, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            appointment.name,
            appointment.email,
            appointment.phone,
            appointment.reason,
            scheduled,
            appointment.kind.map(|k| k.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an appointment. Returns the stored record with its new id.
pub async fn insert_appointment(
    db: &Database,
    appointment: &NewAppointment,
) -> Result<Appointment, CitaError> {
    let scheduled = storable(appointment.scheduled)?;
    let appointment = appointment.clone();
    db.connection()
        .call(move |conn| {
            let id = insert_row(conn, &appointment, &scheduled)?;
            Ok(appointment.with_id(id))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert an appointment unless its slot overlaps an existing one.
///
/// The overlap check and the insert run in one `BEGIN IMMEDIATE` transaction,
/// so a concurrent writer cannot claim the slot in between. Returns `None`
/// when the slot is taken.
pub async fn insert_appointment_if_free(
    db: &Database,
    appointment: &NewAppointment,
) -> Result<Option<Appointment>, CitaError> {
    let scheduled = storable(appointment.scheduled)?;
    let (lower, upper) = overlap_window(appointment.scheduled)?;
    let appointment = appointment.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if overlap_exists(&tx, &lower, &upper)? {
                tx.rollback()?;
                return Ok(None);
            }
            let id = insert_row(&tx, &appointment, &scheduled)?;
            tx.commit()?;
            Ok(Some(appointment.with_id(id)))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether any stored slot intersects `[start, start + 1h)`.
pub async fn has_overlap(db: &Database, start: NaiveDateTime) -> Result<bool, CitaError> {
    let (lower, upper) = overlap_window(start)?;
    db.connection()
        .call(move |conn| overlap_exists(conn, &lower, &upper))
        .await
        .map_err(crate::database::map_tr_err)
}

/// List one page of appointments ordered by scheduled time (ties by id).
pub async fn list_appointments(db: &Database, page: Page) -> Result<Vec<Appointment>, CitaError> {
    let limit = i64::from(page.limit);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY scheduled ASC, id ASC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset], row_to_appointment)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Scheduled times with `start <= scheduled <= end`, ascending.
pub async fn list_scheduled_between(
    db: &Database,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<NaiveDateTime>, CitaError> {
    let start = format_scheduled(start);
    let end = format_scheduled(end);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT scheduled FROM appointments
                 WHERE scheduled >= ?1 AND scheduled <= ?2
                 ORDER BY scheduled ASC",
            )?;
            let rows = stmt.query_map(params![start, end], |row| {
                let raw: String = row.get(0)?;
                parse_scheduled(&raw, 0)
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of stored appointments.
pub async fn count_appointments(db: &Database) -> Result<u64, CitaError> {
    db.connection()
        .call(|conn| {
            conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await
        .map(|n| u64::try_from(n).unwrap_or_default())
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, SCHEDULED_FORMAT).unwrap()
    }

    fn make_appointment(scheduled: &str) -> NewAppointment {
        NewAppointment {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555-0100".to_string(),
            reason: "Annual checkup".to_string(),
            scheduled: at(scheduled),
            kind: Some(AppointmentType::Checkup),
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_roundtrips() {
        let (db, _dir) = setup_db().await;

        let first = insert_appointment(&db, &make_appointment("2099-01-01 10:00:00"))
            .await
            .unwrap();
        let second = insert_appointment(&db, &make_appointment("2099-01-02 10:00:00"))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let listed = list_appointments(&db, Page { page: 1, limit: 10 })
            .await
            .unwrap();
        assert_eq!(listed, vec![first, second]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn untyped_appointment_stores_null_type() {
        let (db, _dir) = setup_db().await;
        let mut appointment = make_appointment("2099-01-01 10:00:00");
        appointment.kind = None;
        insert_appointment(&db, &appointment).await.unwrap();

        let stored: Option<String> = db
            .connection()
            .call(|conn| conn.query_row("SELECT type FROM appointments", [], |row| row.get(0)))
            .await
            .unwrap();
        assert!(stored.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn overlap_uses_one_hour_slots() {
        let (db, _dir) = setup_db().await;
        insert_appointment(&db, &make_appointment("2099-01-01 10:00:00"))
            .await
            .unwrap();

        assert!(has_overlap(&db, at("2099-01-01 10:00:00")).await.unwrap());
        assert!(has_overlap(&db, at("2099-01-01 10:30:00")).await.unwrap());
        assert!(has_overlap(&db, at("2099-01-01 09:00:01")).await.unwrap());
        assert!(has_overlap(&db, at("2099-01-01 10:59:59")).await.unwrap());
        // Adjacent slots touch but do not share an instant.
        assert!(!has_overlap(&db, at("2099-01-01 11:00:00")).await.unwrap());
        assert!(!has_overlap(&db, at("2099-01-01 09:00:00")).await.unwrap());
        assert!(!has_overlap(&db, at("2099-01-01 11:01:00")).await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn overlap_across_midnight() {
        let (db, _dir) = setup_db().await;
        insert_appointment(&db, &make_appointment("2099-01-01 23:30:00"))
            .await
            .unwrap();
        assert!(has_overlap(&db, at("2099-01-02 00:15:00")).await.unwrap());
        assert!(!has_overlap(&db, at("2099-01-02 00:30:00")).await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn insert_if_free_rejects_overlap() {
        let (db, _dir) = setup_db().await;
        let first = insert_appointment_if_free(&db, &make_appointment("2099-01-01 10:00:00"))
            .await
            .unwrap();
        assert!(first.is_some());

        let clash = insert_appointment_if_free(&db, &make_appointment("2099-01-01 10:30:00"))
            .await
            .unwrap();
        assert!(clash.is_none());
        assert_eq!(count_appointments(&db).await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_overlapping_inserts_admit_one() {
        let (db, _dir) = setup_db().await;
        let a = make_appointment("2099-03-03 08:00:00");
        let b = make_appointment("2099-03-03 08:20:00");

        let (ra, rb) = futures::join!(
            insert_appointment_if_free(&db, &a),
            insert_appointment_if_free(&db, &b)
        );
        let admitted = [ra.unwrap(), rb.unwrap()]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(count_appointments(&db).await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_paginates_by_scheduled() {
        let (db, _dir) = setup_db().await;
        // Insert out of order so ordering comes from the query, not insertion.
        for day in (1..=12).rev() {
            insert_appointment(&db, &make_appointment(&format!("2099-05-{day:02} 09:00:00")))
                .await
                .unwrap();
        }

        let page = list_appointments(&db, Page { page: 2, limit: 5 })
            .await
            .unwrap();
        let days: Vec<String> = page
            .iter()
            .map(|a| a.scheduled.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["06", "07", "08", "09", "10"]);

        let last = list_appointments(&db, Page { page: 3, limit: 5 })
            .await
            .unwrap();
        assert_eq!(last.len(), 2);

        let beyond = list_appointments(&db, Page { page: 9, limit: 5 })
            .await
            .unwrap();
        assert!(beyond.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_start_is_rejected_without_closing_the_connection() {
        let (db, _dir) = setup_db().await;

        let err = has_overlap(&db, NaiveDateTime::MAX).await.unwrap_err();
        assert_eq!(err.code(), "invalid_format");

        let mut far = make_appointment("2099-01-01 10:00:00");
        far.scheduled = at("2099-01-01 10:00:00").with_year(20_000).unwrap();
        let err = insert_appointment_if_free(&db, &far).await.unwrap_err();
        assert_eq!(err.code(), "invalid_format");
        let err = insert_appointment(&db, &far).await.unwrap_err();
        assert_eq!(err.code(), "invalid_format");

        // The worker thread is still serving calls.
        let booked = insert_appointment_if_free(&db, &make_appointment("2099-01-01 10:00:00"))
            .await
            .unwrap();
        assert!(booked.is_some());
        assert_eq!(count_appointments(&db).await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn overlap_window_is_open_at_the_edges_of_the_range() {
        let (db, _dir) = setup_db().await;
        insert_appointment(&db, &make_appointment("9999-12-31 23:30:00"))
            .await
            .unwrap();
        insert_appointment(&db, &make_appointment("0000-01-01 00:10:00"))
            .await
            .unwrap();

        assert!(has_overlap(&db, at("9999-12-31 23:45:00")).await.unwrap());
        assert!(has_overlap(&db, at("0000-01-01 00:00:00")).await.unwrap());
        assert!(!has_overlap(&db, at("9999-12-31 22:30:00")).await.unwrap());
        db.close().await.unwrap();
    }

    proptest::proptest! {
        #[test]
        fn text_window_matches_interval_overlap(
            existing_offset in -10_000i64..10_000,
            start_offset in -10_000i64..10_000,
        ) {
            let base = at("2099-12-31 20:00:00");
            let existing = base + TimeDelta::seconds(existing_offset);
            let start = base + TimeDelta::seconds(start_offset);
            let hour = TimeDelta::hours(1);

            let intervals_overlap = existing < start + hour && existing + hour > start;
            let (lower, upper) = overlap_window(start).unwrap();
            let stored = format_scheduled(existing);
            let window_hit = stored.as_str() > lower.as_str() && stored.as_str() < upper.as_str();

            proptest::prop_assert_eq!(window_hit, intervals_overlap);
        }
    }

    #[tokio::test]
    async fn range_is_inclusive() {
        let (db, _dir) = setup_db().await;
        for scheduled in [
            "2024-01-31 23:00:00",
            "2024-02-01 00:00:00",
            "2024-02-15 13:45:00",
            "2024-02-29 23:59:59",
            "2024-03-01 00:00:00",
        ] {
            insert_appointment(&db, &make_appointment(scheduled))
                .await
                .unwrap();
        }

        let found = list_scheduled_between(
            &db,
            at("2024-02-01 00:00:00"),
            at("2024-02-29 23:59:59"),
        )
        .await
        .unwrap();
        assert_eq!(
            found,
            vec![
                at("2024-02-01 00:00:00"),
                at("2024-02-15 13:45:00"),
                at("2024-02-29 23:59:59"),
            ]
        );
        db.close().await.unwrap();
    }
}
