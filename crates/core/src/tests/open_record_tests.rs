// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_context, create_test_schedule};
use crate::{CoreError, TransitionContext, open_record};
use attendance_domain::{AttendanceRecord, AttendanceStatus, DomainError, Role};
use time::macros::datetime;

#[test]
fn test_admin_opens_record_at_not_started() {
    let context: TransitionContext =
        create_test_context(Role::Admin, datetime!(2025-02-10 09:00:00 UTC));
    let record: AttendanceRecord =
        open_record(" evt-1 ", "ven-1", "cus-1", create_test_schedule(), &context).unwrap();

    assert_eq!(record.status, AttendanceStatus::NotStarted);
    assert_eq!(record.event_id.value(), "evt-1");
    assert_eq!(record.created_at, datetime!(2025-02-10 09:00:00 UTC));
    assert_eq!(record.record_id, None);
    assert_eq!(record.version, 0);
}

#[test]
fn test_open_record_requires_admin() {
    for role in [Role::Vendor, Role::Customer] {
        let context: TransitionContext =
            create_test_context(role, datetime!(2025-02-10 09:00:00 UTC));
        let result = open_record("evt-1", "ven-1", "cus-1", create_test_schedule(), &context);
        assert!(matches!(result, Err(CoreError::Unauthorized { .. })));
    }
}

#[test]
fn test_open_record_requires_finalized_roster() {
    let mut context: TransitionContext =
        create_test_context(Role::Admin, datetime!(2025-02-10 09:00:00 UTC));
    context.is_finalized = false;
    let result = open_record("evt-1", "ven-1", "cus-1", create_test_schedule(), &context);
    assert_eq!(
        result,
        Err(CoreError::NotFinalized {
            event_id: String::from("evt-1")
        })
    );
}

#[test]
fn test_open_record_rejects_blank_identifiers() {
    let context: TransitionContext =
        create_test_context(Role::Admin, datetime!(2025-02-10 09:00:00 UTC));
    let result = open_record("evt-1", "  ", "cus-1", create_test_schedule(), &context);
    assert!(matches!(
        result,
        Err(CoreError::Validation(DomainError::InvalidIdentifier {
            field: "Vendor id",
            ..
        }))
    ));
}

#[test]
fn test_error_messages_name_the_precondition() {
    let err = CoreError::InvalidState {
        action: "confirm Mark-In",
        current: AttendanceStatus::MarkInConfirmed,
        required: AttendanceStatus::MarkInSubmitted,
    };
    assert_eq!(
        err.to_string(),
        "Cannot confirm Mark-In while attendance is mark_in_confirmed; the record must be mark_in_submitted"
    );
}
