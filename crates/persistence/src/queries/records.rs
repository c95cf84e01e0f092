// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance record queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use attendance_domain::{AttendanceRecord, EventId, RecordKey};

use crate::data_models::AttendanceRecordRow;
use crate::diesel_schema::attendance_records;
use crate::error::PersistenceError;

/// Looks up the record for an `(event, vendor)` pair.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_record(
    conn: &mut SqliteConnection,
    key: &RecordKey,
) -> Result<Option<AttendanceRecord>, PersistenceError> {
    attendance_records::table
        .filter(attendance_records::event_id.eq(key.event_id.value()))
        .filter(attendance_records::vendor_id.eq(key.vendor_id.value()))
        .select(AttendanceRecordRow::as_select())
        .first::<AttendanceRecordRow>(conn)
        .optional()?
        .map(AttendanceRecordRow::into_record)
        .transpose()
}

/// Retrieves a record by database id.
///
/// # Errors
///
/// Returns `PersistenceError::RecordNotFound` if no such record exists.
pub fn get_record_by_id(
    conn: &mut SqliteConnection,
    record_id: i64,
) -> Result<AttendanceRecord, PersistenceError> {
    attendance_records::table
        .filter(attendance_records::record_id.eq(record_id))
        .select(AttendanceRecordRow::as_select())
        .first::<AttendanceRecordRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::RecordNotFound(format!("record id {record_id}")))?
        .into_record()
}

/// Lists every record of an event, ordered by vendor id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_records_for_event(
    conn: &mut SqliteConnection,
    event_id: &EventId,
) -> Result<Vec<AttendanceRecord>, PersistenceError> {
    attendance_records::table
        .filter(attendance_records::event_id.eq(event_id.value()))
        .order(attendance_records::vendor_id.asc())
        .select(AttendanceRecordRow::as_select())
        .load::<AttendanceRecordRow>(conn)?
        .into_iter()
        .map(AttendanceRecordRow::into_record)
        .collect()
}

/// Returns the stored version of a record, or `None` if it does not exist.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn current_version(
    conn: &mut SqliteConnection,
    record_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    Ok(attendance_records::table
        .filter(attendance_records::record_id.eq(record_id))
        .select(attendance_records::version)
        .first::<i64>(conn)
        .optional()?)
}
