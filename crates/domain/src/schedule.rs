// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduled window of a vendor booking and parsing of event instants.
//!
//! Event times arrive either as RFC 3339 instants or as wall-clock times in
//! the event's IANA time zone. Wall-clock times are resolved with
//! `chrono-tz` and stored as UTC instants; nothing downstream ever sees a
//! local time.

use crate::error::DomainError;
use chrono::{LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The booked service window for one vendor at one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// When the vendor is expected to arrive.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// When the vendor is expected to leave.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl Schedule {
    /// Creates a schedule, normalising both instants to UTC.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSchedule` unless `end` is strictly after `start`.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidSchedule {
                reason: format!("scheduled end {end} must be after scheduled start {start}"),
            });
        }
        Ok(Self {
            start: start.to_offset(UtcOffset::UTC),
            end: end.to_offset(UtcOffset::UTC),
        })
    }
}

/// Parses an event instant.
///
/// RFC 3339 input is used as-is. Anything else is parsed as a local
/// `YYYY-MM-DDTHH:MM:SS` in `timezone`.
///
/// # Errors
///
/// Returns an error if:
/// - The value is neither RFC 3339 nor a local date-time
/// - A local date-time is given without a time zone
/// - The time zone is unknown
/// - The local time is skipped or repeated by a DST change
pub fn parse_event_instant(
    value: &str,
    timezone: Option<&str>,
) -> Result<OffsetDateTime, DomainError> {
    let value: &str = value.trim();
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }

    let naive: NaiveDateTime =
        NaiveDateTime::parse_from_str(value, LOCAL_FORMAT).map_err(|e| {
            DomainError::InvalidTimestamp {
                value: value.to_string(),
                reason: e.to_string(),
            }
        })?;

    let Some(tz_name) = timezone else {
        return Err(DomainError::MissingTimezone {
            value: value.to_string(),
        });
    };
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| DomainError::UnknownTimezone(tz_name.to_string()))?;

    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(resolved) => resolved,
        LocalResult::Ambiguous(_, _) => {
            return Err(DomainError::AmbiguousLocalTime {
                value: value.to_string(),
                timezone: tz_name.to_string(),
            });
        }
        LocalResult::None => {
            return Err(DomainError::NonexistentLocalTime {
                value: value.to_string(),
                timezone: tz_name.to_string(),
            });
        }
    };

    OffsetDateTime::from_unix_timestamp(resolved.timestamp()).map_err(|e| {
        DomainError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Formats an instant as RFC 3339 text in UTC.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if the instant cannot be represented.
pub fn format_instant(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: instant.to_string(),
            reason: e.to_string(),
        })
}
