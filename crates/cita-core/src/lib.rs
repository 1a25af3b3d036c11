// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cita appointment scheduling service.
//!
//! This crate provides the domain types, the error type, and the store traits
//! shared by the storage backend, the scheduling service, and the gateway.

pub mod error;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CitaError;
pub use settings::HomeSettings;
pub use types::{
    Appointment, AppointmentDay, AppointmentHour, AppointmentType, HealthStatus, NewAppointment,
    Page, SlotStatus,
};

pub use traits::{AppointmentStore, OptionStore, PluginAdapter, StorageAdapter};
