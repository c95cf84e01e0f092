// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use attendance_domain::{AttendanceStatus, DomainError, Role};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The event's vendor roster has not been finalized yet.
    #[error("Attendance for event '{event_id}' is unavailable until its vendor roster is finalized")]
    NotFinalized {
        /// The event whose gate is closed.
        event_id: String,
    },
    /// The actor is not permitted to perform this action on this record.
    #[error("{role} '{actor_id}' may not {action}: {reason}")]
    Unauthorized {
        /// The attempted action.
        action: &'static str,
        /// The actor's role.
        role: Role,
        /// The actor's id.
        actor_id: String,
        /// Why the actor was refused.
        reason: String,
    },
    /// The record is not in the state the command requires.
    #[error("Cannot {action} while attendance is {current}; the record must be {required}")]
    InvalidState {
        /// The attempted action.
        action: &'static str,
        /// The record's current status.
        current: AttendanceStatus,
        /// The status the command requires.
        required: AttendanceStatus,
    },
    /// The command payload failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] DomainError),
    /// A transition would have produced an inconsistent record.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}
