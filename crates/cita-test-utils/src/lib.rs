// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cita integration tests.
//!
//! [`TestHarness`] wires a temp SQLite database, a scheduling service with a
//! fixed clock, and the HTTP router, so tests drive the real stack without
//! binding a socket.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TestResponse};
