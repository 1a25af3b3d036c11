// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the scheduling service, and the gateway.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CitaError;

/// Wire and storage format of an appointment's scheduled time.
pub const SCHEDULED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format of a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Kind of visit requested for an appointment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentType {
    #[strum(serialize = "visit")]
    Visit,
    #[strum(serialize = "consultation")]
    Consultation,
    #[strum(to_string = "follow", serialize = "follow-up")]
    #[serde(rename = "follow", alias = "follow-up")]
    FollowUp,
    #[strum(serialize = "checkup")]
    Checkup,
}

impl AppointmentType {
    /// Parse an optional raw type value.
    ///
    /// Absent or empty input yields `None`; anything else must name a variant.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, CitaError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse::<Self>()
                .map(Some)
                .map_err(|_| CitaError::InvalidType {
                    value: value.to_string(),
                }),
        }
    }

    /// Value written to the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visit => "visit",
            Self::Consultation => "consultation",
            Self::FollowUp => "follow",
            Self::Checkup => "checkup",
        }
    }
}

/// An appointment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reason: String,
    pub scheduled: NaiveDateTime,
    pub kind: Option<AppointmentType>,
}

impl NewAppointment {
    /// Attach the store-assigned id.
    pub fn with_id(self, id: i64) -> Appointment {
        Appointment {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            reason: self.reason,
            scheduled: self.scheduled,
            kind: self.kind,
        }
    }
}

/// A persisted appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Store-assigned identifier.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reason: String,
    /// Start of the one-hour slot claimed by this appointment.
    #[serde(with = "scheduled_format")]
    pub scheduled: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: Option<AppointmentType>,
}

/// Availability of one calendar hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Reserved,
    Available,
}

/// One on-the-hour entry of the calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentHour {
    /// Hour of day, 0..=23.
    #[serde(serialize_with = "serialize_hour")]
    pub hour: u32,
    pub status: SlotStatus,
}

/// A calendar date with its 24 hourly slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentDay {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub hours: Vec<AppointmentHour>,
}

/// Requested page of the appointment listing, already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,
    /// Page size, 1..=100.
    pub limit: u32,
}

impl Page {
    /// Row offset of the first record on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

fn serialize_hour<S: serde::Serializer>(hour: &u32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{hour:02}:00:00"))
}

fn serialize_date<S: serde::Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format(DATE_FORMAT))
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod scheduled_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::SCHEDULED_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(SCHEDULED_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, SCHEDULED_FORMAT).map_err(serde::de::Error::custom)
    }
}
