// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input sanitizers and validators for appointment requests.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use cita_core::CitaError;
use cita_core::types::SCHEDULED_FORMAT;

/// Email syntax: a dot-atom local part and a dotted domain whose labels do
/// not start or end with a hyphen.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$",
    )
    .unwrap()
});

const SCHEDULED_LEN: usize = "YYYY-MM-DD HH:MM:SS".len();

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// The year is exactly four digits and the parsed value must format back to
/// exactly `raw`. This rejects signed or extended years, impossible dates,
/// missing zero padding, and trailing text.
pub fn parse_scheduled(raw: &str) -> Result<NaiveDateTime, CitaError> {
    let invalid = || CitaError::InvalidFormat {
        value: raw.to_string(),
    };
    if raw.len() != SCHEDULED_LEN || !raw.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let parsed = NaiveDateTime::parse_from_str(raw, SCHEDULED_FORMAT).map_err(|_| invalid())?;
    if parsed.format(SCHEDULED_FORMAT).to_string() != raw {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Whether `value` is syntactically an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Trim and collapse every whitespace run (newlines included) to one space.
pub fn sanitize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim each line, keeping line breaks, and drop leading/trailing blank lines.
pub fn sanitize_textarea(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Sanitize a required single-line field; empty after sanitizing is missing.
pub fn required_text(name: &str, raw: Option<&str>) -> Result<String, CitaError> {
    let value = sanitize_text(raw.unwrap_or_default());
    if value.is_empty() {
        return Err(CitaError::MissingParam {
            name: name.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_accepts_canonical_form() {
        let parsed = parse_scheduled("2099-01-01 10:00:00").unwrap();
        assert_eq!(parsed.to_string(), "2099-01-01 10:00:00");
    }

    #[test]
    fn scheduled_rejects_non_canonical_values() {
        for raw in [
            "2023-02-30 10:00:00",
            "2023-13-01 10:00:00",
            "2023-1-05 10:00:00",
            "2023-01-05 9:00:00",
            "2023-01-05T10:00:00",
            "2023-01-05 10:00",
            "2023-01-05 10:00:00 ",
            " 2023-01-05 10:00:00",
            "2023-01-05 24:00:00",
            "+10000-01-01 10:00:00",
            "-0001-01-01 10:00:00",
            "+262142-12-31 23:30:00",
            "+999-01-01 10:00:00",
            "",
            "tomorrow",
        ] {
            let err = parse_scheduled(raw).unwrap_err();
            assert_eq!(err.code(), "invalid_format", "{raw:?} should be rejected");
        }
    }

    #[test]
    fn leap_day_parses_only_in_leap_years() {
        assert!(parse_scheduled("2024-02-29 08:00:00").is_ok());
        assert!(parse_scheduled("2023-02-29 08:00:00").is_err());
    }

    #[test]
    fn email_syntax() {
        for good in ["ana@example.com", "a.b+tag@sub.example.org", "x@y.co"] {
            assert!(is_valid_email(good), "{good} should be valid");
        }
        for bad in [
            "",
            "plain",
            "@example.com",
            "ana@",
            "ana@example",
            "ana@-example.com",
            "ana@example-.com",
            "ana @example.com",
            "ana@exa mple.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn text_is_trimmed_and_collapsed() {
        assert_eq!(sanitize_text("  Ana \t  María\n López "), "Ana María López");
        assert_eq!(sanitize_text(" \n\t "), "");
    }

    #[test]
    fn textarea_keeps_line_breaks() {
        assert_eq!(
            sanitize_textarea("\n  Headache  \n   since Monday \n\n"),
            "Headache\nsince Monday"
        );
    }

    #[test]
    fn required_text_reports_missing() {
        let err = required_text("name", Some("   ")).unwrap_err();
        assert_eq!(err.code(), "missing_param");
        assert_eq!(required_text("name", None).unwrap_err().code(), "missing_param");
        assert_eq!(required_text("name", Some(" Ana ")).unwrap(), "Ana");
    }
}
