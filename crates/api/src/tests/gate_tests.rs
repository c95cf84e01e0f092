// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use attendance_domain::{AttendanceStatus, EventId, MarkKind};

use super::helpers::{
    EVENT, TestEnv, at, confirm, create_test_admin, create_test_cause, create_test_customer,
    create_test_key, create_test_request, create_test_vendor, mark_in,
};
use crate::{
    ApiError, FinalizationGate, FinalizationRegistry, create_attendance_record, finalize_event,
    get_action_history, get_attendance,
};

#[test]
fn test_registry_starts_closed_and_only_opens() {
    let registry = FinalizationRegistry::new();
    let event = EventId::new(EVENT);
    assert!(!registry.is_finalized(&event));
    assert!(registry.is_empty());

    assert!(registry.mark_finalized(event.clone()));
    assert!(!registry.mark_finalized(event.clone()));

    assert!(registry.is_finalized(&event));
    assert!(!registry.is_finalized(&EventId::new("other-event")));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_record_cannot_be_opened_before_finalization() {
    let mut env = TestEnv::unfinalized();

    let result = create_attendance_record(
        &mut env.persistence,
        &env.registry,
        &create_test_request(),
        &create_test_admin(),
        create_test_cause("open-record"),
        at(8, 0),
    );

    assert!(matches!(
        result,
        Err(ApiError::NotFinalized { ref event_id }) if event_id == EVENT
    ));
}

#[test]
fn test_commands_fail_while_gate_is_closed_and_append_nothing() {
    let mut env = TestEnv::new();
    env.open_record();
    // A fresh registry has the event closed again.
    env.registry = FinalizationRegistry::new();

    let result = env.execute(&mark_in(10, 15), &create_test_vendor(), "vendor-in", at(10, 15));

    assert!(matches!(result, Err(ApiError::NotFinalized { .. })));
    let history = get_action_history(&mut env.persistence, &create_test_key()).unwrap();
    assert!(history.actions.is_empty());
    let view = get_attendance(&mut env.persistence, &env.registry, &create_test_key()).unwrap();
    assert_eq!(view.status, AttendanceStatus::NotStarted);
    assert!(!view.is_finalized);
}

#[test]
fn test_gate_is_read_on_every_command() {
    let mut env = TestEnv::new();
    env.open_record();
    env.execute(&mark_in(10, 15), &create_test_vendor(), "vendor-in", at(10, 15))
        .unwrap();

    env.registry = FinalizationRegistry::new();
    let result = env.execute(
        &confirm(MarkKind::MarkIn),
        &create_test_customer(),
        "customer-in",
        at(10, 20),
    );

    assert!(matches!(result, Err(ApiError::NotFinalized { .. })));
}

#[test]
fn test_finalize_event_requires_admin() {
    let registry = FinalizationRegistry::new();

    let result = finalize_event(&registry, EVENT, &create_test_customer());

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(!registry.is_finalized(&EventId::new(EVENT)));
}

#[test]
fn test_finalize_event_is_idempotent() {
    let registry = FinalizationRegistry::new();
    let admin = create_test_admin();

    let first = finalize_event(&registry, EVENT, &admin).unwrap();
    let second = finalize_event(&registry, EVENT, &admin).unwrap();

    assert!(first.newly_finalized);
    assert!(!second.newly_finalized);
    assert!(registry.is_finalized(&EventId::new(EVENT)));
}

#[test]
fn test_finalize_event_rejects_blank_id() {
    let registry = FinalizationRegistry::new();

    let result = finalize_event(&registry, "  ", &create_test_admin());

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
    assert!(registry.is_empty());
}
