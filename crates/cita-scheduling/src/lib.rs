// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment scheduling for Cita.
//!
//! [`SchedulingService`] runs the create pipeline (sanitize, parse, past
//! check, type check, conflict check, insert), paginated listing, and the
//! monthly availability grid on top of any [`cita_core::AppointmentStore`].

pub mod calendar;
pub mod service;
pub mod validation;

pub use calendar::{build_calendar, days_in_month};
pub use service::{AppointmentRequest, Clock, SchedulingService, local_clock};
