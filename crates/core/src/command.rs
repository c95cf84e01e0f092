// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use attendance_audit::ActionType;
use attendance_domain::{Location, MarkKind};
use time::OffsetDateTime;

/// A command represents actor intent as data only.
///
/// Commands are the only way to request a change to an attendance record.
/// Confirm and dispute name the fact they target, so a retried request can
/// never land on a different fact than the one its sender reviewed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Vendor claims arrival.
    SubmitMarkIn {
        /// The arrival instant the vendor claims.
        claimed_at: OffsetDateTime,
        /// The captured location, or `None` if no fix was available.
        location: Option<Location>,
        /// Optional free-text notes.
        notes: Option<String>,
    },
    /// Vendor claims departure.
    SubmitMarkOut {
        /// The departure instant the vendor claims.
        claimed_at: OffsetDateTime,
        /// The captured location, or `None` if no fix was available.
        location: Option<Location>,
        /// Optional free-text notes.
        notes: Option<String>,
    },
    /// Customer or admin accepts a submitted fact.
    Confirm {
        /// The fact being confirmed.
        fact: MarkKind,
        /// Optional free-text notes.
        notes: Option<String>,
    },
    /// Customer or admin rejects a submitted fact.
    RaiseDispute {
        /// The fact being disputed.
        fact: MarkKind,
        /// Why the fact is disputed. Must not be blank.
        reason: String,
    },
}

/// The command half of a transition table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Submit Mark-In.
    SubmitMarkIn,
    /// Submit Mark-Out.
    SubmitMarkOut,
    /// Confirm Mark-In.
    ConfirmMarkIn,
    /// Confirm Mark-Out.
    ConfirmMarkOut,
    /// Dispute Mark-In.
    DisputeMarkIn,
    /// Dispute Mark-Out.
    DisputeMarkOut,
}

impl CommandKind {
    /// A short human-readable name for error messages and logs.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::SubmitMarkIn => "submit Mark-In",
            Self::SubmitMarkOut => "submit Mark-Out",
            Self::ConfirmMarkIn => "confirm Mark-In",
            Self::ConfirmMarkOut => "confirm Mark-Out",
            Self::DisputeMarkIn => "dispute Mark-In",
            Self::DisputeMarkOut => "dispute Mark-Out",
        }
    }
}

impl Command {
    /// Returns the transition table key for this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::SubmitMarkIn { .. } => CommandKind::SubmitMarkIn,
            Self::SubmitMarkOut { .. } => CommandKind::SubmitMarkOut,
            Self::Confirm {
                fact: MarkKind::MarkIn,
                ..
            } => CommandKind::ConfirmMarkIn,
            Self::Confirm {
                fact: MarkKind::MarkOut,
                ..
            } => CommandKind::ConfirmMarkOut,
            Self::RaiseDispute {
                fact: MarkKind::MarkIn,
                ..
            } => CommandKind::DisputeMarkIn,
            Self::RaiseDispute {
                fact: MarkKind::MarkOut,
                ..
            } => CommandKind::DisputeMarkOut,
        }
    }

    /// Returns the action type this command appends when accepted.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::SubmitMarkIn { .. } => ActionType::submission(MarkKind::MarkIn),
            Self::SubmitMarkOut { .. } => ActionType::submission(MarkKind::MarkOut),
            Self::Confirm { fact, .. } => ActionType::confirmation(*fact),
            Self::RaiseDispute { .. } => ActionType::RaiseDispute,
        }
    }
}
