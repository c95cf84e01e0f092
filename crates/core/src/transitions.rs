// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The attendance transition table.
//!
//! Every permitted move is one row keyed by `(command, from)` with the roles
//! allowed to make it. There is exactly one row per command; a command
//! issued from any other state is rejected.

use crate::command::CommandKind;
use attendance_domain::{AttendanceStatus, Role};

const VENDOR: &[Role] = &[Role::Vendor];
const REVIEWERS: &[Role] = &[Role::Customer, Role::Admin];

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The command this row admits.
    pub command: CommandKind,
    /// The state the record must be in.
    pub from: AttendanceStatus,
    /// The roles allowed to issue the command.
    pub roles: &'static [Role],
    /// The state the record moves to.
    pub to: AttendanceStatus,
}

/// All permitted transitions.
pub const TRANSITIONS: [Transition; 6] = [
    Transition {
        command: CommandKind::SubmitMarkIn,
        from: AttendanceStatus::NotStarted,
        roles: VENDOR,
        to: AttendanceStatus::MarkInSubmitted,
    },
    Transition {
        command: CommandKind::ConfirmMarkIn,
        from: AttendanceStatus::MarkInSubmitted,
        roles: REVIEWERS,
        to: AttendanceStatus::MarkInConfirmed,
    },
    Transition {
        command: CommandKind::DisputeMarkIn,
        from: AttendanceStatus::MarkInSubmitted,
        roles: REVIEWERS,
        to: AttendanceStatus::Disputed,
    },
    Transition {
        command: CommandKind::SubmitMarkOut,
        from: AttendanceStatus::MarkInConfirmed,
        roles: VENDOR,
        to: AttendanceStatus::MarkOutSubmitted,
    },
    Transition {
        command: CommandKind::ConfirmMarkOut,
        from: AttendanceStatus::MarkOutSubmitted,
        roles: REVIEWERS,
        to: AttendanceStatus::MarkOutConfirmed,
    },
    Transition {
        command: CommandKind::DisputeMarkOut,
        from: AttendanceStatus::MarkOutSubmitted,
        roles: REVIEWERS,
        to: AttendanceStatus::Disputed,
    },
];

/// Looks up the table row for a command.
#[must_use]
pub fn transition_for(command: CommandKind) -> Option<Transition> {
    TRANSITIONS.iter().find(|row| row.command == command).copied()
}
