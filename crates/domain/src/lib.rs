// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calculator;
mod error;
mod location;
mod record;
mod schedule;
mod status;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use calculator::{floor_minutes, minutes_from_schedule, service_duration};
pub use error::DomainError;
pub use location::{GeoPoint, Location};
pub use record::{AttendanceRecord, Confirmation, Dispute, MarkFact};
pub use schedule::{Schedule, format_instant, parse_event_instant};
pub use status::AttendanceStatus;
pub use types::{CustomerId, EventId, MarkKind, RecordKey, Role, VendorId};
pub use validation::{
    MAX_DISPUTE_REASON_CHARS, MAX_IDENTIFIER_CHARS, MAX_NOTES_CHARS, normalize_notes,
    validate_claimed_time, validate_dispute_reason, validate_geo_point, validate_identifier,
    validate_location,
};
