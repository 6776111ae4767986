// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a server timestamp: RFC3339, or a naive `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Short display form: time of day within the last 24 hours, otherwise day,
/// month and time. Unparseable input is returned unchanged.
pub fn format_short(raw: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(raw) {
        Some(date) if now.signed_duration_since(date) < chrono::Duration::hours(24) => {
            date.format("%H:%M").to_string()
        }
        Some(date) => date.format("%d/%m %H:%M").to_string(),
        None => raw.to_string(),
    }
}
