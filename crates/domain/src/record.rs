// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The attendance record for one `(event, vendor)` pair.

use crate::calculator::{floor_minutes, service_duration};
use crate::error::DomainError;
use crate::location::Location;
use crate::schedule::Schedule;
use crate::status::AttendanceStatus;
use crate::types::{CustomerId, EventId, MarkKind, RecordKey, VendorId};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Acceptance of a submitted fact by a customer or admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// When the fact was confirmed.
    #[serde(with = "time::serde::rfc3339")]
    pub confirmed_at: OffsetDateTime,
    /// The actor id of whoever confirmed it.
    pub confirmed_by: String,
}

/// A vendor-submitted Mark-In or Mark-Out.
///
/// Once `confirmation` is set, neither it nor `claimed_at` may change for
/// the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFact {
    /// The instant the vendor claims to have arrived or left.
    #[serde(with = "time::serde::rfc3339")]
    pub claimed_at: OffsetDateTime,
    /// Where the vendor was at submission, if a fix was available.
    pub location: Option<Location>,
    /// When the server received the submission.
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    /// Present once a customer or admin accepted the fact.
    pub confirmation: Option<Confirmation>,
}

impl MarkFact {
    /// Creates an unconfirmed fact.
    #[must_use]
    pub const fn submitted(
        claimed_at: OffsetDateTime,
        location: Option<Location>,
        submitted_at: OffsetDateTime,
    ) -> Self {
        Self {
            claimed_at,
            location,
            submitted_at,
            confirmation: None,
        }
    }

    /// Returns true once the fact has been confirmed.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.confirmation.is_some()
    }
}

/// A rejected submission awaiting out-of-band review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Which fact was disputed, so resolution tooling knows where to resume.
    pub fact: MarkKind,
    /// Free-text reason supplied by the disputing actor.
    pub reason: String,
    /// The actor id of whoever raised the dispute.
    pub raised_by: String,
    /// When the dispute was raised.
    #[serde(with = "time::serde::rfc3339")]
    pub raised_at: OffsetDateTime,
}

/// Attendance of one vendor at one event.
///
/// Records are created at `NotStarted` and mutated only by the transition
/// engine. They are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Database identifier. `None` until the record has been persisted.
    pub record_id: Option<i64>,
    /// The event the vendor is booked for.
    pub event_id: EventId,
    /// The vendor whose attendance is tracked.
    pub vendor_id: VendorId,
    /// The customer who owns the event.
    pub customer_id: CustomerId,
    /// The booked service window.
    pub schedule: Schedule,
    /// The vendor's arrival claim.
    pub mark_in: Option<MarkFact>,
    /// The vendor's departure claim.
    pub mark_out: Option<MarkFact>,
    /// Signed minutes between scheduled start and Mark-In.
    pub delay_minutes: Option<i64>,
    /// Signed minutes between scheduled end and Mark-Out.
    pub overtime_minutes: Option<i64>,
    /// Current status.
    pub status: AttendanceStatus,
    /// Present exactly when `status` is `Disputed`.
    pub dispute: Option<Dispute>,
    /// When the record was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record last changed. Never decreases.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Optimistic concurrency counter, bumped on every persisted transition.
    pub version: i64,
}

impl AttendanceRecord {
    /// Creates a new record at `NotStarted`.
    #[must_use]
    pub const fn new(
        event_id: EventId,
        vendor_id: VendorId,
        customer_id: CustomerId,
        schedule: Schedule,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            record_id: None,
            event_id,
            vendor_id,
            customer_id,
            schedule,
            mark_in: None,
            mark_out: None,
            delay_minutes: None,
            overtime_minutes: None,
            status: AttendanceStatus::NotStarted,
            dispute: None,
            created_at,
            updated_at: created_at,
            version: 0,
        }
    }

    /// Returns the natural key of this record.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.event_id.clone(), self.vendor_id.clone())
    }

    /// Returns true if the record is frozen by a dispute.
    #[must_use]
    pub const fn is_disputed(&self) -> bool {
        self.dispute.is_some()
    }

    /// Returns the fact of the given kind, if submitted.
    #[must_use]
    pub const fn fact(&self, kind: MarkKind) -> Option<&MarkFact> {
        match kind {
            MarkKind::MarkIn => self.mark_in.as_ref(),
            MarkKind::MarkOut => self.mark_out.as_ref(),
        }
    }

    /// Returns the confirmed Mark-In instant, if any.
    #[must_use]
    pub fn confirmed_mark_in(&self) -> Option<OffsetDateTime> {
        self.mark_in
            .as_ref()
            .filter(|fact| fact.is_confirmed())
            .map(|fact| fact.claimed_at)
    }

    /// Service duration between the confirmed Mark-In and Mark-Out.
    ///
    /// `None` until both facts are confirmed; unconfirmed times can still be
    /// disputed away and are never used.
    #[must_use]
    pub fn service_duration(&self) -> Option<Duration> {
        let mark_in = self.mark_in.as_ref().filter(|f| f.is_confirmed())?;
        let mark_out = self.mark_out.as_ref().filter(|f| f.is_confirmed())?;
        Some(service_duration(mark_in.claimed_at, mark_out.claimed_at))
    }

    /// Service duration in whole minutes, see `service_duration`.
    #[must_use]
    pub fn service_duration_minutes(&self) -> Option<i64> {
        self.service_duration().map(floor_minutes)
    }

    /// Checks every structural invariant of an attendance record.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` describing the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        if self.updated_at < self.created_at {
            return Err(violation("updated_at precedes created_at"));
        }
        if self.is_disputed() != (self.status == AttendanceStatus::Disputed) {
            return Err(violation("dispute data present iff status is disputed"));
        }
        if self.mark_in.is_some() != self.delay_minutes.is_some() {
            return Err(violation("delay is present iff Mark-In is present"));
        }
        if self.mark_out.is_some() != self.overtime_minutes.is_some() {
            return Err(violation("overtime is present iff Mark-Out is present"));
        }

        if let Some(mark_out) = &self.mark_out {
            let Some(mark_in) = self.confirmed_mark_in() else {
                return Err(violation("Mark-Out present without a confirmed Mark-In"));
            };
            if mark_in > mark_out.claimed_at {
                return Err(violation("Mark-In time is after Mark-Out time"));
            }
        }

        let in_confirmed: Option<bool> = self.mark_in.as_ref().map(MarkFact::is_confirmed);
        let out_confirmed: Option<bool> = self.mark_out.as_ref().map(MarkFact::is_confirmed);

        let consistent: bool = match self.status {
            AttendanceStatus::NotStarted => in_confirmed.is_none() && out_confirmed.is_none(),
            AttendanceStatus::MarkInSubmitted => {
                in_confirmed == Some(false) && out_confirmed.is_none()
            }
            AttendanceStatus::MarkInConfirmed => {
                in_confirmed == Some(true) && out_confirmed.is_none()
            }
            AttendanceStatus::MarkOutSubmitted => {
                in_confirmed == Some(true) && out_confirmed == Some(false)
            }
            AttendanceStatus::MarkOutConfirmed => {
                in_confirmed == Some(true) && out_confirmed == Some(true)
            }
            AttendanceStatus::Disputed => self.dispute.as_ref().is_some_and(|dispute| {
                self.fact(dispute.fact).is_some_and(|fact| !fact.is_confirmed())
            }),
        };
        if !consistent {
            return Err(violation(&format!(
                "submitted facts do not match status {}",
                self.status
            )));
        }

        Ok(())
    }
}

fn violation(message: &str) -> DomainError {
    DomainError::InvariantViolation(message.to_string())
}
