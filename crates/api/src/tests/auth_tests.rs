// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use attendance::CoreError;
use attendance_domain::{AttendanceStatus, DomainError, Role};
use attendance_persistence::PersistenceError;

use crate::{
    ApiError, AuthError, authenticate_stub, parse_role, translate_core_error,
    translate_persistence_error,
};

#[test]
fn test_authenticate_stub_trims_and_keeps_role() {
    let actor = authenticate_stub("  vendor-dj ", Role::Vendor).unwrap();

    assert_eq!(actor.id, "vendor-dj");
    assert_eq!(actor.role, Role::Vendor);
    assert_eq!(actor.to_audit_actor().role, Role::Vendor);
}

#[test]
fn test_authenticate_stub_rejects_blank_id() {
    let result = authenticate_stub("   ", Role::Admin);

    assert!(matches!(result, Err(AuthError::AuthenticationFailed { .. })));
}

#[test]
fn test_authenticate_stub_rejects_overlong_id() {
    let result = authenticate_stub(&"x".repeat(500), Role::Customer);

    assert!(result.is_err());
}

#[test]
fn test_parse_role() {
    assert_eq!(parse_role("Customer").unwrap(), Role::Customer);
    assert_eq!(parse_role("admin").unwrap(), Role::Admin);

    let err: ApiError = parse_role("planner").unwrap_err().into();
    assert!(matches!(err, ApiError::AuthenticationFailed { .. }));
}

#[test]
fn test_core_errors_translate_to_the_api_contract() {
    let not_finalized = translate_core_error(CoreError::NotFinalized {
        event_id: String::from("evt"),
    });
    assert_eq!(
        not_finalized,
        ApiError::NotFinalized {
            event_id: String::from("evt")
        }
    );

    let invalid_state = translate_core_error(CoreError::InvalidState {
        action: "confirm Mark-In",
        current: AttendanceStatus::NotStarted,
        required: AttendanceStatus::MarkInSubmitted,
    });
    let ApiError::InvalidState { message } = invalid_state else {
        panic!("expected InvalidState");
    };
    assert!(message.contains("mark_in_submitted"));

    let validation = translate_core_error(CoreError::Validation(DomainError::EmptyDisputeReason));
    assert!(matches!(
        validation,
        ApiError::InvalidInput { ref field, .. } if field == "reason"
    ));

    let invariant = translate_core_error(CoreError::InvariantViolation(String::from("broken")));
    assert!(matches!(invariant, ApiError::Internal { .. }));
}

#[test]
fn test_persistence_errors_translate_to_the_api_contract() {
    assert!(matches!(
        translate_persistence_error(PersistenceError::RecordNotFound(String::from("x"))),
        ApiError::ResourceNotFound { .. }
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::DuplicateRecord(String::from("x"))),
        ApiError::Duplicate { .. }
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::ConcurrencyConflict {
            record_id: 1,
            expected_version: 2,
        }),
        ApiError::ConcurrencyConflict { .. }
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::DatabaseError(String::from("disk"))),
        ApiError::Internal { .. }
    ));
}
