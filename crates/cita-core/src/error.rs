// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cita scheduling service.

use thiserror::Error;

/// The primary error type used across store traits and service operations.
///
/// Every variant maps to a stable machine-readable code via [`CitaError::code`]
/// and an HTTP-style status via [`CitaError::status`].
#[derive(Debug, Error)]
pub enum CitaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The scheduled value is not a real `YYYY-MM-DD HH:MM:SS` timestamp.
    #[error("invalid scheduled value `{value}`, expected YYYY-MM-DD HH:MM:SS")]
    InvalidFormat { value: String },

    /// The scheduled time lies before the current instant.
    #[error("scheduled time {scheduled} is in the past")]
    InPast { scheduled: String },

    /// The appointment type is not one of the known variants.
    #[error("the value '{value}' is not a valid appointment type")]
    InvalidType { value: String },

    /// Another appointment already claims an overlapping hour.
    #[error("the selected time {scheduled} is already reserved")]
    SlotReserved { scheduled: String },

    /// A required request field is absent or empty.
    #[error("missing required parameter `{name}`")]
    MissingParam { name: String },

    /// The email field does not look like an email address.
    #[error("invalid email address `{value}`")]
    InvalidEmail { value: String },

    /// A request parameter is outside its allowed range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CitaError {
    /// Machine-readable error code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Internal(_) => "internal_error",
            Self::Storage { .. } => "persistence_failure",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::InPast { .. } => "in_past",
            Self::InvalidType { .. } => "invalid_type",
            Self::SlotReserved { .. } => "slot_reserved",
            Self::MissingParam { .. } => "missing_param",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::InvalidParam { .. } => "invalid_param",
        }
    }

    /// HTTP-style status: 400 for caller faults and conflicts, 500 otherwise.
    pub fn status(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }

    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::Storage { .. } | Self::Internal(_)
        )
    }
}
