// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Cita scheduling service.
//!
//! Exposes appointment booking, listing, and the availability calendar
//! under `/medical/v1`, home settings under `/custom/v1`, and `/health`.
//! Every error renders as `{"code", "message", "data": {"status"}}`.

pub mod handlers;
pub mod server;

pub use handlers::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, build_router, start_server};
