// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance status states.
//!
//! This module defines the six states an attendance record moves through.
//! Which command may move a record out of a state, and by whom, is decided
//! by the transition engine; this module only names the states and answers
//! questions about them.

use crate::error::DomainError;
use crate::types::MarkKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Attendance status of one `(event, vendor)` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Record created; the vendor has not marked in
    #[default]
    NotStarted,
    /// Vendor submitted Mark-In; awaiting customer or admin review
    MarkInSubmitted,
    /// Mark-In accepted and immutable
    MarkInConfirmed,
    /// Vendor submitted Mark-Out; awaiting customer or admin review
    MarkOutSubmitted,
    /// Mark-Out accepted; attendance complete
    MarkOutConfirmed,
    /// A submission was rejected and is frozen pending review
    Disputed,
}

impl AttendanceStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::MarkInSubmitted => "mark_in_submitted",
            Self::MarkInConfirmed => "mark_in_confirmed",
            Self::MarkOutSubmitted => "mark_out_submitted",
            Self::MarkOutConfirmed => "mark_out_confirmed",
            Self::Disputed => "disputed",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "mark_in_submitted" => Ok(Self::MarkInSubmitted),
            "mark_in_confirmed" => Ok(Self::MarkInConfirmed),
            "mark_out_submitted" => Ok(Self::MarkOutSubmitted),
            "mark_out_confirmed" => Ok(Self::MarkOutConfirmed),
            "disputed" => Ok(Self::Disputed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if no command can move a record out of this state.
    ///
    /// `Disputed` is terminal until an administrative resolution contract exists.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::MarkOutConfirmed | Self::Disputed)
    }

    /// Returns the fact awaiting review in this state, if any.
    ///
    /// Only a submitted-but-unconfirmed fact can be confirmed or disputed.
    #[must_use]
    pub const fn pending_fact(&self) -> Option<MarkKind> {
        match self {
            Self::MarkInSubmitted => Some(MarkKind::MarkIn),
            Self::MarkOutSubmitted => Some(MarkKind::MarkOut),
            Self::NotStarted
            | Self::MarkInConfirmed
            | Self::MarkOutConfirmed
            | Self::Disputed => None,
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        let statuses = vec![
            AttendanceStatus::NotStarted,
            AttendanceStatus::MarkInSubmitted,
            AttendanceStatus::MarkInConfirmed,
            AttendanceStatus::MarkOutSubmitted,
            AttendanceStatus::MarkOutConfirmed,
            AttendanceStatus::Disputed,
        ];

        for status in statuses {
            let s = status.as_str();
            match AttendanceStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        let result = AttendanceStatus::parse_str("checked_in");
        assert!(matches!(result, Err(DomainError::InvalidStatus(_))));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!AttendanceStatus::NotStarted.is_terminal());
        assert!(!AttendanceStatus::MarkInSubmitted.is_terminal());
        assert!(!AttendanceStatus::MarkInConfirmed.is_terminal());
        assert!(!AttendanceStatus::MarkOutSubmitted.is_terminal());
        assert!(AttendanceStatus::MarkOutConfirmed.is_terminal());
        assert!(AttendanceStatus::Disputed.is_terminal());
    }

    #[test]
    fn test_pending_fact_only_for_submitted_states() {
        assert_eq!(
            AttendanceStatus::MarkInSubmitted.pending_fact(),
            Some(MarkKind::MarkIn)
        );
        assert_eq!(
            AttendanceStatus::MarkOutSubmitted.pending_fact(),
            Some(MarkKind::MarkOut)
        );
        assert_eq!(AttendanceStatus::NotStarted.pending_fact(), None);
        assert_eq!(AttendanceStatus::MarkInConfirmed.pending_fact(), None);
        assert_eq!(AttendanceStatus::Disputed.pending_fact(), None);
    }

    #[test]
    fn test_default_status_is_not_started() {
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::NotStarted);
    }
}
