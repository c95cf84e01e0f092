// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The Dispute Handler.
//!
//! A dispute rejects a submitted-but-unconfirmed fact and moves the record
//! out of the normal pipeline. The submitted time and location stay on the
//! record and in the action history; the dispute only blocks confirmation.

use crate::error::CoreError;
use attendance_domain::{AttendanceRecord, Dispute, MarkKind, validate_dispute_reason};
use time::OffsetDateTime;

/// Builds the dispute for `fact` on `record`.
///
/// Only the fact the record's status holds for review can be disputed.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the reason is blank or too long, and
/// `CoreError::InvariantViolation` if the fact is not awaiting review, is
/// missing, or is already confirmed.
pub fn build_dispute(
    record: &AttendanceRecord,
    fact: MarkKind,
    reason: &str,
    raised_by: &str,
    raised_at: OffsetDateTime,
) -> Result<Dispute, CoreError> {
    let reason: String = validate_dispute_reason(reason)?;

    if record.status.pending_fact() != Some(fact) {
        return Err(CoreError::InvariantViolation(format!(
            "{fact} on {} is not awaiting review (status {})",
            record.key(),
            record.status
        )));
    }

    match record.fact(fact) {
        Some(submitted) if !submitted.is_confirmed() => Ok(Dispute {
            fact,
            reason,
            raised_by: raised_by.to_string(),
            raised_at,
        }),
        Some(_) => Err(CoreError::InvariantViolation(format!(
            "{fact} on {} is already confirmed",
            record.key()
        ))),
        None => Err(CoreError::InvariantViolation(format!(
            "{fact} on {} was never submitted",
            record.key()
        ))),
    }
}
