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

use attendance_domain::{AttendanceStatus, Location, MarkKind, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Represents the entity performing an action.
///
/// An actor is an authenticated marketplace account acting in one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role the actor is acting in.
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role the actor is acting in
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }
}

/// Represents the request that triggered an action.
///
/// The cause id is the client-supplied request id. It is the idempotency
/// key for a command: a retried request carries the same id and must not
/// append a second action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// The client-supplied request id.
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The client-supplied request id
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The kind of an attendance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Vendor submitted a Mark-In.
    MarkIn,
    /// Vendor submitted a Mark-Out.
    MarkOut,
    /// Customer or admin confirmed a Mark-In.
    ConfirmMarkIn,
    /// Customer or admin confirmed a Mark-Out.
    ConfirmMarkOut,
    /// Customer or admin disputed a submission.
    RaiseDispute,
}

impl ActionType {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarkIn => "mark_in",
            Self::MarkOut => "mark_out",
            Self::ConfirmMarkIn => "confirm_mark_in",
            Self::ConfirmMarkOut => "confirm_mark_out",
            Self::RaiseDispute => "raise_dispute",
        }
    }

    /// The action recorded when a fact is submitted.
    #[must_use]
    pub const fn submission(kind: MarkKind) -> Self {
        match kind {
            MarkKind::MarkIn => Self::MarkIn,
            MarkKind::MarkOut => Self::MarkOut,
        }
    }

    /// The action recorded when a fact is confirmed.
    #[must_use]
    pub const fn confirmation(kind: MarkKind) -> Self {
        match kind {
            MarkKind::MarkIn => Self::ConfirmMarkIn,
            MarkKind::MarkOut => Self::ConfirmMarkOut,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an action type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActionType(pub String);

impl std::fmt::Display for UnknownActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown attendance action type: {}", self.0)
    }
}

impl std::error::Error for UnknownActionType {}

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark_in" => Ok(Self::MarkIn),
            "mark_out" => Ok(Self::MarkOut),
            "confirm_mark_in" => Ok(Self::ConfirmMarkIn),
            "confirm_mark_out" => Ok(Self::ConfirmMarkOut),
            "raise_dispute" => Ok(Self::RaiseDispute),
            _ => Err(UnknownActionType(s.to_string())),
        }
    }
}

/// An immutable entry in a record's action history.
///
/// Every accepted command produces exactly one action. Actions are never
/// rewritten or pruned, and the history is never reconstructed from the
/// record's mutable status; `status_before` and `status_after` capture the
/// transition as it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceAction {
    /// Database identifier. `None` until persisted.
    pub action_id: Option<i64>,
    /// The record this action belongs to. `None` until persisted.
    pub record_id: Option<i64>,
    /// Position in the record's history, starting at 1. `None` until persisted.
    pub sequence: Option<i64>,
    /// What happened.
    pub action_type: ActionType,
    /// When the server accepted the command.
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
    /// Where the vendor was, for submissions with a location fix.
    pub location: Option<Location>,
    /// Optional notes; the dispute reason for disputes.
    pub notes: Option<String>,
    /// Who performed the action.
    pub actor: Actor,
    /// Which request caused it.
    pub cause: Cause,
    /// Record status before the transition.
    pub status_before: AttendanceStatus,
    /// Record status after the transition.
    pub status_after: AttendanceStatus,
}

impl AttendanceAction {
    /// Creates a new, unpersisted `AttendanceAction`.
    ///
    /// # Arguments
    ///
    /// * `action_type` - What happened
    /// * `performed_at` - When the server accepted the command
    /// * `actor` - Who performed it
    /// * `cause` - The request that caused it
    /// * `status_before` - Record status before the transition
    /// * `status_after` - Record status after the transition
    #[must_use]
    pub const fn new(
        action_type: ActionType,
        performed_at: OffsetDateTime,
        actor: Actor,
        cause: Cause,
        status_before: AttendanceStatus,
        status_after: AttendanceStatus,
    ) -> Self {
        Self {
            action_id: None,
            record_id: None,
            sequence: None,
            action_type,
            performed_at,
            location: None,
            notes: None,
            actor,
            cause,
            status_before,
            status_after,
        }
    }

    /// Attaches a location.
    #[must_use]
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Attaches notes.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Returns a copy carrying the identifiers assigned by the store.
    #[must_use]
    pub fn persisted(mut self, action_id: i64, record_id: i64, sequence: i64) -> Self {
        self.action_id = Some(action_id);
        self.record_id = Some(record_id);
        self.sequence = Some(sequence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_domain::GeoPoint;
    use time::macros::datetime;

    fn create_test_action() -> AttendanceAction {
        AttendanceAction::new(
            ActionType::MarkIn,
            datetime!(2025-02-14 10:15:05 UTC),
            Actor::new(String::from("ven-1"), Role::Vendor),
            Cause::new(String::from("req-1"), String::from("Vendor Mark-In")),
            AttendanceStatus::NotStarted,
            AttendanceStatus::MarkInSubmitted,
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("cus-1"), Role::Customer);

        assert_eq!(actor.id, "cus-1");
        assert_eq!(actor.role, Role::Customer);
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("Confirm arrival"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "Confirm arrival");
    }

    #[test]
    fn test_action_type_round_trip() {
        for action_type in [
            ActionType::MarkIn,
            ActionType::MarkOut,
            ActionType::ConfirmMarkIn,
            ActionType::ConfirmMarkOut,
            ActionType::RaiseDispute,
        ] {
            assert_eq!(action_type.as_str().parse::<ActionType>(), Ok(action_type));
        }
    }

    #[test]
    fn test_unknown_action_type() {
        let result: Result<ActionType, UnknownActionType> = "resolve_dispute".parse();
        assert_eq!(
            result,
            Err(UnknownActionType(String::from("resolve_dispute")))
        );
    }

    #[test]
    fn test_action_type_for_fact() {
        assert_eq!(ActionType::submission(MarkKind::MarkIn), ActionType::MarkIn);
        assert_eq!(
            ActionType::submission(MarkKind::MarkOut),
            ActionType::MarkOut
        );
        assert_eq!(
            ActionType::confirmation(MarkKind::MarkIn),
            ActionType::ConfirmMarkIn
        );
        assert_eq!(
            ActionType::confirmation(MarkKind::MarkOut),
            ActionType::ConfirmMarkOut
        );
    }

    #[test]
    fn test_new_action_is_unpersisted() {
        let action: AttendanceAction = create_test_action();

        assert_eq!(action.action_id, None);
        assert_eq!(action.record_id, None);
        assert_eq!(action.sequence, None);
        assert_eq!(action.location, None);
        assert_eq!(action.notes, None);
    }

    #[test]
    fn test_persisted_action_carries_store_ids() {
        let action: AttendanceAction = create_test_action()
            .with_location(Some(Location::from_point(GeoPoint::new(12.9, 77.6))))
            .with_notes(Some(String::from("gate 3")))
            .persisted(10, 4, 1);

        assert_eq!(action.action_id, Some(10));
        assert_eq!(action.record_id, Some(4));
        assert_eq!(action.sequence, Some(1));
        assert_eq!(action.notes.as_deref(), Some("gate 3"));
        assert!(action.location.is_some());
    }

    #[test]
    fn test_action_equality() {
        let action1: AttendanceAction = create_test_action();
        let action2: AttendanceAction = create_test_action();
        let action3: AttendanceAction = create_test_action().with_notes(Some(String::from("x")));

        assert_eq!(action1, action2);
        assert_ne!(action1, action3);
    }
}
