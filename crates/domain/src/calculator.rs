// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Delay, overtime and service duration arithmetic.
//!
//! All results are whole minutes rounded toward negative infinity, so a
//! Mark-In thirty seconds early reports `-1`, not `0`.

use time::{Duration, OffsetDateTime};

const SECONDS_PER_MINUTE: i64 = 60;

/// Floors a duration to whole minutes.
#[must_use]
pub const fn floor_minutes(duration: Duration) -> i64 {
    let mut seconds: i64 = duration.whole_seconds();
    // A negative sub-second remainder means the whole seconds were truncated
    // toward zero and must step down once more.
    if duration.subsec_nanoseconds() < 0 {
        seconds -= 1;
    }
    seconds.div_euclid(SECONDS_PER_MINUTE)
}

/// Signed minutes between a scheduled and an actual instant.
///
/// Positive means late, negative means early, zero means on time.
/// Used for Mark-In delay against the scheduled start and for Mark-Out
/// overtime against the scheduled end.
#[must_use]
pub fn minutes_from_schedule(scheduled: OffsetDateTime, actual: OffsetDateTime) -> i64 {
    floor_minutes(actual - scheduled)
}

/// Service duration between two confirmed instants.
///
/// Callers must only pass confirmed facts; see
/// `AttendanceRecord::service_duration`.
#[must_use]
pub fn service_duration(mark_in: OffsetDateTime, mark_out: OffsetDateTime) -> Duration {
    mark_out - mark_in
}
