// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transition persistence.
//!
//! A transition is stored as one compare-and-swap update of the record
//! followed by one action insert, inside a single transaction. The update
//! only matches if the stored version still equals the version the engine
//! read; otherwise nothing is written and the caller sees a conflict.
//!
//! The transaction begins `IMMEDIATE` so that, when several connections share
//! a database file, a second writer waits on the busy timeout instead of
//! failing when it upgrades from a read lock.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use attendance::TransitionResult;
use attendance_audit::AttendanceAction;
use attendance_domain::AttendanceRecord;

use crate::data_models::{AttendanceRecordColumns, NewAttendanceAction};
use crate::diesel_schema::{attendance_actions, attendance_records};
use crate::error::{PersistenceError, is_unique_violation};
use crate::queries::actions::next_sequence;
use crate::queries::records::current_version;

/// A transition as stored: the record at its new version and the action
/// with its assigned id and sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTransition {
    /// The stored record.
    pub record: AttendanceRecord,
    /// The stored action.
    pub action: AttendanceAction,
}

/// Atomically stores a transition produced by the engine.
///
/// `result.new_record.version` is the version the engine read; the stored
/// record moves to the next version.
///
/// # Errors
///
/// Returns an error if:
/// - The record was never stored (`UnpersistedRecord`)
/// - The record no longer exists (`RecordNotFound`)
/// - Another writer stored a transition first (`ConcurrencyConflict`)
/// - The request id is already in the record's history (`DuplicateRequest`)
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistedTransition, PersistenceError> {
    let Some(record_id) = result.new_record.record_id else {
        return Err(PersistenceError::UnpersistedRecord(
            result.new_record.key().to_string(),
        ));
    };
    let expected_version: i64 = result.new_record.version;

    conn.immediate_transaction::<PersistedTransition, PersistenceError, _>(|conn| {
        let mut record: AttendanceRecord = result.new_record.clone();
        record.version = expected_version + 1;
        let columns: AttendanceRecordColumns = AttendanceRecordColumns::from_record(&record)?;

        let updated: usize = diesel::update(
            attendance_records::table
                .filter(attendance_records::record_id.eq(record_id))
                .filter(attendance_records::version.eq(expected_version)),
        )
        .set(&columns)
        .execute(conn)?;

        if updated == 0 {
            return Err(match current_version(conn, record_id)? {
                Some(_) => PersistenceError::ConcurrencyConflict {
                    record_id,
                    expected_version,
                },
                None => PersistenceError::RecordNotFound(format!("record id {record_id}")),
            });
        }

        let sequence: i64 = next_sequence(conn, record_id)?;
        let row: NewAttendanceAction =
            NewAttendanceAction::from_action(&result.action, record_id, sequence)?;

        let action_id: i64 = diesel::insert_into(attendance_actions::table)
            .values(&row)
            .returning(attendance_actions::action_id)
            .get_result::<i64>(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::DuplicateRequest {
                        record_id,
                        request_id: result.action.cause.id.clone(),
                    }
                } else {
                    PersistenceError::from(e)
                }
            })?;

        debug!(
            record_id,
            action_id,
            sequence,
            version = record.version,
            action = result.action.action_type.as_str(),
            "Persisted attendance transition"
        );

        Ok(PersistedTransition {
            record,
            action: result
                .action
                .clone()
                .persisted(action_id, record_id, sequence),
        })
    })
}
