// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use attendance::{Command, TransitionContext, TransitionPolicy, TransitionResult, apply};
use attendance_audit::{Actor, Cause};
use attendance_domain::{
    AttendanceRecord, CustomerId, EventId, GeoPoint, Location, MarkKind, Role, Schedule, VendorId,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{PersistedTransition, Persistence};

pub fn create_test_record(event: &str, vendor: &str) -> AttendanceRecord {
    AttendanceRecord::new(
        EventId::new(event),
        VendorId::new(vendor),
        CustomerId::new("cus-1"),
        Schedule::new(
            datetime!(2025-02-14 10:00:00 UTC),
            datetime!(2025-02-14 22:00:00 UTC),
        )
        .unwrap(),
        datetime!(2025-02-10 09:00:00 UTC),
    )
}

pub fn create_test_context(
    role: Role,
    request_id: &str,
    received_at: OffsetDateTime,
) -> TransitionContext {
    let actor_id: &str = match role {
        Role::Vendor => "ven-1",
        Role::Customer => "cus-1",
        Role::Admin => "adm-1",
    };
    TransitionContext::new(
        Actor::new(actor_id.to_string(), role),
        Cause::new(request_id.to_string(), String::from("test request")),
        true,
        received_at,
    )
}

pub fn mark_in_command() -> Command {
    Command::SubmitMarkIn {
        claimed_at: datetime!(2025-02-14 10:15:00 UTC),
        location: Some(
            Location::from_point(GeoPoint::new(12.9716, 77.5946))
                .with_address(String::from("Palace Grounds, Bengaluru")),
        ),
        notes: Some(String::from("Arrived at gate 2")),
    }
}

/// Applies `command` to `record` and returns the unpersisted result.
pub fn transition(
    record: &AttendanceRecord,
    command: Command,
    role: Role,
    request_id: &str,
    received_at: OffsetDateTime,
) -> TransitionResult {
    apply(
        record,
        command,
        &create_test_context(role, request_id, received_at),
        &TransitionPolicy::default(),
    )
    .unwrap()
}

/// Stores a fresh record and a persisted Mark-In for it.
pub fn create_mark_in_submitted(persistence: &mut Persistence) -> PersistedTransition {
    let record: AttendanceRecord = persistence
        .create_record(&create_test_record("evt-1", "ven-1"))
        .unwrap();
    let result: TransitionResult = transition(
        &record,
        mark_in_command(),
        Role::Vendor,
        "req-mark-in",
        datetime!(2025-02-14 10:15:05 UTC),
    );
    persistence.persist_transition(&result).unwrap()
}

pub const fn confirm_mark_in() -> Command {
    Command::Confirm {
        fact: MarkKind::MarkIn,
        notes: None,
    }
}
