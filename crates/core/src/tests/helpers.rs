// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, TransitionContext, TransitionPolicy, TransitionResult, apply};
use attendance_audit::{Actor, Cause};
use attendance_domain::{
    AttendanceRecord, CustomerId, EventId, GeoPoint, Location, MarkKind, Role, Schedule, VendorId,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const EVENT: &str = "evt-1";
pub const VENDOR: &str = "ven-1";
pub const CUSTOMER: &str = "cus-1";
pub const ADMIN: &str = "adm-1";

pub fn create_test_schedule() -> Schedule {
    Schedule::new(
        datetime!(2025-02-14 10:00:00 UTC),
        datetime!(2025-02-14 22:00:00 UTC),
    )
    .unwrap()
}

pub fn create_test_record() -> AttendanceRecord {
    AttendanceRecord::new(
        EventId::new(EVENT),
        VendorId::new(VENDOR),
        CustomerId::new(CUSTOMER),
        create_test_schedule(),
        datetime!(2025-02-10 09:00:00 UTC),
    )
}

pub fn create_test_actor(role: Role) -> Actor {
    let id: &str = match role {
        Role::Vendor => VENDOR,
        Role::Customer => CUSTOMER,
        Role::Admin => ADMIN,
    };
    Actor::new(id.to_string(), role)
}

pub fn create_test_context(role: Role, received_at: OffsetDateTime) -> TransitionContext {
    TransitionContext::new(
        create_test_actor(role),
        Cause::new(String::from("req-1"), String::from("test request")),
        true,
        received_at,
    )
}

pub fn create_test_location() -> Location {
    Location::from_point(GeoPoint::new(12.9716, 77.5946))
}

pub fn mark_in_at(claimed_at: OffsetDateTime) -> Command {
    Command::SubmitMarkIn {
        claimed_at,
        location: Some(create_test_location()),
        notes: None,
    }
}

pub fn mark_out_at(claimed_at: OffsetDateTime) -> Command {
    Command::SubmitMarkOut {
        claimed_at,
        location: Some(create_test_location()),
        notes: None,
    }
}

pub const fn confirm(fact: MarkKind) -> Command {
    Command::Confirm { fact, notes: None }
}

pub fn dispute(fact: MarkKind, reason: &str) -> Command {
    Command::RaiseDispute {
        fact,
        reason: reason.to_string(),
    }
}

/// Applies a command as `role` at `received_at` with the default policy.
pub fn apply_as(
    record: &AttendanceRecord,
    command: Command,
    role: Role,
    received_at: OffsetDateTime,
) -> TransitionResult {
    apply(
        record,
        command,
        &create_test_context(role, received_at),
        &TransitionPolicy::default(),
    )
    .unwrap()
}

/// A record with a Mark-In submitted at 10:15.
pub fn create_mark_in_submitted_record() -> AttendanceRecord {
    apply_as(
        &create_test_record(),
        mark_in_at(datetime!(2025-02-14 10:15:00 UTC)),
        Role::Vendor,
        datetime!(2025-02-14 10:15:05 UTC),
    )
    .new_record
}

/// A record whose 10:15 Mark-In has been confirmed by the customer.
pub fn create_mark_in_confirmed_record() -> AttendanceRecord {
    apply_as(
        &create_mark_in_submitted_record(),
        confirm(MarkKind::MarkIn),
        Role::Customer,
        datetime!(2025-02-14 10:20:00 UTC),
    )
    .new_record
}

/// A record with a 22:30 Mark-Out submitted after a confirmed Mark-In.
pub fn create_mark_out_submitted_record() -> AttendanceRecord {
    apply_as(
        &create_mark_in_confirmed_record(),
        mark_out_at(datetime!(2025-02-14 22:30:00 UTC)),
        Role::Vendor,
        datetime!(2025-02-14 22:30:10 UTC),
    )
    .new_record
}
