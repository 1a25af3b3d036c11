// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly availability grid.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use cita_core::{AppointmentDay, AppointmentHour, CitaError, SlotStatus};

pub const HOURS_PER_DAY: u32 = 24;

fn invalid_month(year: i32, month: u32) -> CitaError {
    CitaError::InvalidParam {
        name: "month".to_string(),
        reason: format!("{year}-{month} is not a calendar month"),
    }
}

/// First day of `year`-`month`.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CitaError> {
    if year < 1 {
        return Err(CitaError::InvalidParam {
            name: "year".to_string(),
            reason: format!("must be at least 1, got {year}"),
        });
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid_month(year, month))
}

/// Number of days in `year`-`month`, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CitaError> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| invalid_month(year, month))?;
    u32::try_from(next.signed_duration_since(first).num_days())
        .map_err(|_| invalid_month(year, month))
}

/// Inclusive `[first 00:00:00, last 23:59:59]` bounds of the month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDateTime, NaiveDateTime), CitaError> {
    let first = first_of_month(year, month)?;
    let days = days_in_month(year, month)?;
    let last = first
        .with_day(days)
        .ok_or_else(|| invalid_month(year, month))?;
    let end_of_day =
        NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(|| invalid_month(year, month))?;
    Ok((first.and_time(NaiveTime::MIN), last.and_time(end_of_day)))
}

/// Build the per-day, per-hour grid for a month.
///
/// An hour is reserved when any of `scheduled` starts inside it; minutes and
/// seconds are ignored. Timestamps outside the month are skipped.
pub fn build_calendar(
    year: i32,
    month: u32,
    scheduled: &[NaiveDateTime],
) -> Result<Vec<AppointmentDay>, CitaError> {
    let first = first_of_month(year, month)?;
    let days = days_in_month(year, month)?;

    let reserved: HashSet<(u32, u32)> = scheduled
        .iter()
        .filter(|ts| ts.year() == year && ts.month() == month)
        .map(|ts| (ts.day(), ts.hour()))
        .collect();

    Ok(first
        .iter_days()
        .take(days as usize)
        .map(|date| AppointmentDay {
            date,
            hours: (0..HOURS_PER_DAY)
                .map(|hour| AppointmentHour {
                    hour,
                    status: if reserved.contains(&(date.day(), hour)) {
                        SlotStatus::Reserved
                    } else {
                        SlotStatus::Available
                    },
                })
                .collect(),
        })
        .collect())
}
