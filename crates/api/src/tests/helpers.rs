// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;

use attendance::Command;
use attendance_audit::Cause;
use attendance_domain::{EventId, MarkKind, RecordKey, Role, VendorId};
use attendance_persistence::Persistence;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::{
    ApiError, AttendanceNotification, AttendanceView, AuthenticatedActor, Collaborators,
    CommandResponse, CreateAttendanceRequest, ExecutionConfig, FinalizationGate,
    FinalizationRegistry, NotificationError, NotificationSink, create_attendance_record,
    execute_command,
};

pub const EVENT: &str = "wedding-2025-02-14";
pub const VENDOR: &str = "vendor-dj";
pub const CUSTOMER: &str = "customer-ann";
pub const ADMIN: &str = "admin-ops";

/// Returns an instant on the event day, in UTC.
pub fn at(hour: i64, minute: i64) -> OffsetDateTime {
    datetime!(2025-02-14 00:00:00 UTC) + Duration::hours(hour) + Duration::minutes(minute)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from(ADMIN), Role::Admin)
}

pub fn create_test_vendor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from(VENDOR), Role::Vendor)
}

pub fn create_test_customer() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from(CUSTOMER), Role::Customer)
}

pub fn create_test_cause(request_id: &str) -> Cause {
    Cause::new(request_id.to_string(), String::from("API request"))
}

pub fn create_test_key() -> RecordKey {
    RecordKey::new(EventId::new(EVENT), VendorId::new(VENDOR))
}

pub fn create_test_request() -> CreateAttendanceRequest {
    CreateAttendanceRequest {
        event_id: String::from(EVENT),
        vendor_id: String::from(VENDOR),
        customer_id: String::from(CUSTOMER),
        scheduled_start: String::from("2025-02-14T10:00:00Z"),
        scheduled_end: String::from("2025-02-14T22:00:00Z"),
        timezone: None,
    }
}

pub fn mark_in(hour: i64, minute: i64) -> Command {
    Command::SubmitMarkIn {
        claimed_at: at(hour, minute),
        location: None,
        notes: None,
    }
}

pub fn mark_out(hour: i64, minute: i64) -> Command {
    Command::SubmitMarkOut {
        claimed_at: at(hour, minute),
        location: None,
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

/// A notification sink that keeps everything it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<AttendanceNotification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<AttendanceNotification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &AttendanceNotification) -> Result<(), NotificationError> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// A notification sink whose delivery always fails.
#[derive(Debug, Default)]
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn notify(&self, _notification: &AttendanceNotification) -> Result<(), NotificationError> {
        Err(NotificationError(String::from("broker offline")))
    }
}

/// Persistence plus the collaborators a command runs against.
pub struct TestEnv {
    pub persistence: Persistence,
    pub registry: FinalizationRegistry,
    pub sink: RecordingSink,
    pub config: ExecutionConfig,
}

impl TestEnv {
    /// An environment whose test event is already finalized.
    pub fn new() -> Self {
        let env: Self = Self::unfinalized();
        env.registry.mark_finalized(EventId::new(EVENT));
        env
    }

    /// An environment where no event is finalized yet.
    pub fn unfinalized() -> Self {
        Self {
            persistence: Persistence::new_in_memory().unwrap(),
            registry: FinalizationRegistry::new(),
            sink: RecordingSink::default(),
            config: ExecutionConfig::default(),
        }
    }

    pub fn open_record(&mut self) -> AttendanceView {
        create_attendance_record(
            &mut self.persistence,
            &self.registry,
            &create_test_request(),
            &create_test_admin(),
            create_test_cause("open-record"),
            at(8, 0),
        )
        .unwrap()
    }

    pub fn execute(
        &mut self,
        command: &Command,
        actor: &AuthenticatedActor,
        request_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<CommandResponse, ApiError> {
        let collaborators: Collaborators<'_> = Collaborators {
            gate: &self.registry,
            notifications: &self.sink,
            config: &self.config,
        };
        execute_command(
            &mut self.persistence,
            &collaborators,
            &create_test_key(),
            command,
            actor,
            &create_test_cause(request_id),
            received_at,
        )
    }

    pub fn execute_with_gate(
        &mut self,
        gate: &dyn FinalizationGate,
        command: &Command,
        actor: &AuthenticatedActor,
        request_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<CommandResponse, ApiError> {
        let collaborators: Collaborators<'_> = Collaborators {
            gate,
            notifications: &self.sink,
            config: &self.config,
        };
        execute_command(
            &mut self.persistence,
            &collaborators,
            &create_test_key(),
            command,
            actor,
            &create_test_cause(request_id),
            received_at,
        )
    }

    /// Runs the happy path up to `mark_in_confirmed`.
    pub fn confirmed_mark_in(&mut self) {
        self.open_record();
        self.execute(&mark_in(10, 15), &create_test_vendor(), "vendor-in", at(10, 15))
            .unwrap();
        self.execute(
            &confirm(MarkKind::MarkIn),
            &create_test_customer(),
            "customer-in",
            at(10, 20),
        )
        .unwrap();
    }
}
