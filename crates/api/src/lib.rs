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
    clippy::all
)]

//! API boundary for vendor attendance tracking.
//!
//! This crate sits between transport (HTTP, tests) and the engine. It
//! authenticates actors, reads the finalization gate, executes commands
//! idempotently with conflict retry, projects records for reading and emits
//! notifications after accepted transitions.

mod auth;
mod error;
mod gate;
mod handlers;
mod location;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, authenticate_stub, parse_role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use gate::{FinalizationGate, FinalizationRegistry};
pub use handlers::{
    Collaborators, DEFAULT_MAX_CONFLICT_RETRIES, ExecutionConfig, confirm_command,
    create_attendance_record, dispute_command, execute_command, finalize_event,
    get_action_history, get_attendance, list_event_attendance, parse_record_key,
    submit_command,
};
pub use location::{
    AddressResolver, DEFAULT_LOCATION_TIMEOUT, LocationError, LocationProvider,
    NoAddressResolver, ReportedLocation, capture_location,
};
pub use notify::{
    AttendanceNotification, DiscardNotifications, NotificationError, NotificationSink,
};
pub use request_response::{
    ActionHistoryResponse, ActionView, AttendanceView, CommandResponse, ConfirmRequest,
    CreateAttendanceRequest, DisputeRequest, EventAttendanceResponse, FinalizeEventResponse,
    SubmitMarkRequest,
};
