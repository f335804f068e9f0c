// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling, including reset-period resolution.
//!
//! All week arithmetic in the engine goes through [`week_start_utc`]: weeks
//! run Monday 00:00:00.000 UTC through Sunday 23:59:59.999 UTC, and Sunday
//! belongs to the *preceding* Monday's week. Weekly progress rows, streak
//! scanning, and period-key bookkeeping must all agree on this boundary.

use chrono::{DateTime, Datelike, Duration, NaiveTime, SecondsFormat, Utc};

use crate::models::badge::ResetPeriod;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The Monday 00:00:00.000 UTC that starts the week containing `ts`.
pub fn week_start_utc(ts: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = i64::from(ts.weekday().num_days_from_monday());
    let monday = ts.date_naive() - Duration::days(days_from_monday);
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// The inclusive end of the week containing `ts`: Sunday 23:59:59.999 UTC.
pub fn week_end_utc(ts: DateTime<Utc>) -> DateTime<Utc> {
    week_start_utc(ts) + Duration::days(7) - Duration::milliseconds(1)
}

/// Resolve the reset-period bounds for a timestamp.
///
/// Returns `None` for non-periodic badges; weekly badges get the
/// `(period_start, period_end)` pair for the week containing `ts`.
pub fn resolve_period(
    ts: DateTime<Utc>,
    reset: ResetPeriod,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match reset {
        ResetPeriod::None => None,
        ResetPeriod::Weekly => Some((week_start_utc(ts), week_end_utc(ts))),
    }
}

/// Canonical string key for the week containing `ts` ("YYYY-MM-DD" of its
/// Monday). Used in progress metadata sets and store keys.
pub fn period_key(ts: DateTime<Utc>) -> String {
    week_start_utc(ts).format("%Y-%m-%d").to_string()
}
