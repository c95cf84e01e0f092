// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Schedule, format_instant, parse_event_instant};
use time::macros::datetime;

#[test]
fn test_rfc3339_instant_is_normalised_to_utc() {
    let instant = parse_event_instant("2025-02-14T15:30:00+05:30", None).unwrap();
    assert_eq!(instant, datetime!(2025-02-14 10:00:00 UTC));
    assert!(instant.offset().is_utc());
}

#[test]
fn test_local_time_resolved_in_event_zone() {
    let instant = parse_event_instant("2025-02-14T10:00:00", Some("Asia/Kolkata")).unwrap();
    assert_eq!(instant, datetime!(2025-02-14 04:30:00 UTC));
}

#[test]
fn test_local_time_without_zone_is_rejected() {
    let result = parse_event_instant("2025-02-14T10:00:00", None);
    assert!(matches!(result, Err(DomainError::MissingTimezone { .. })));
}

#[test]
fn test_unknown_zone_is_rejected() {
    let result = parse_event_instant("2025-02-14T10:00:00", Some("Mars/Olympus"));
    assert_eq!(
        result,
        Err(DomainError::UnknownTimezone(String::from("Mars/Olympus")))
    );
}

#[test]
fn test_malformed_timestamp_is_rejected() {
    let result = parse_event_instant("14/02/2025 10am", Some("UTC"));
    assert!(matches!(result, Err(DomainError::InvalidTimestamp { .. })));
}

#[test]
fn test_spring_forward_gap_is_rejected() {
    // 02:30 does not exist in New York on 2025-03-09
    let result = parse_event_instant("2025-03-09T02:30:00", Some("America/New_York"));
    assert!(matches!(
        result,
        Err(DomainError::NonexistentLocalTime { .. })
    ));
}

#[test]
fn test_fall_back_overlap_is_rejected() {
    // 01:30 happens twice in New York on 2025-11-02
    let result = parse_event_instant("2025-11-02T01:30:00", Some("America/New_York"));
    assert!(matches!(result, Err(DomainError::AmbiguousLocalTime { .. })));
}

#[test]
fn test_schedule_requires_forward_window() {
    let start = datetime!(2025-02-14 10:00:00 UTC);
    let end = datetime!(2025-02-14 22:00:00 UTC);

    assert!(Schedule::new(start, end).is_ok());
    assert!(matches!(
        Schedule::new(end, start),
        Err(DomainError::InvalidSchedule { .. })
    ));
    assert!(Schedule::new(start, start).is_err());
}

#[test]
fn test_format_instant_uses_utc() {
    let formatted: String = format_instant(datetime!(2025-02-14 15:30:00 +05:30)).unwrap();
    assert_eq!(formatted, "2025-02-14T10:00:00Z");
}
