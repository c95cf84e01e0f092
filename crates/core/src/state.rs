// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use attendance_audit::{Actor, AttendanceAction, Cause};
use attendance_domain::AttendanceRecord;
use time::{Duration, OffsetDateTime};

/// Default allowance for vendor device clocks running ahead of the server.
pub const DEFAULT_MAX_CLOCK_SKEW: Duration = Duration::seconds(300);

/// Everything the engine needs to know about the caller and the moment.
///
/// The gate flag is read from the finalization collaborator immediately
/// before every command, never cached on the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionContext {
    /// Who is issuing the command.
    pub actor: Actor,
    /// The request that carries the command.
    pub cause: Cause,
    /// Whether the event's vendor roster is finalized.
    pub is_finalized: bool,
    /// When the server received the command.
    pub received_at: OffsetDateTime,
}

impl TransitionContext {
    /// Creates a new transition context.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        is_finalized: bool,
        received_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            cause,
            is_finalized,
            received_at,
        }
    }
}

/// Tunable validation limits for the transition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    /// How far a claimed instant may lie ahead of the server receipt time.
    pub max_clock_skew: Duration,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            max_clock_skew: DEFAULT_MAX_CLOCK_SKEW,
        }
    }
}

/// The result of a successful state transition.
///
/// Contains both the new record and the single action that records it.
/// Neither has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The record after the transition.
    pub new_record: AttendanceRecord,
    /// The action recording this transition.
    pub action: AttendanceAction,
}
