// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance record creation.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use attendance_domain::AttendanceRecord;

use crate::data_models::AttendanceRecordColumns;
use crate::diesel_schema::attendance_records;
use crate::error::{PersistenceError, is_unique_violation};

/// Inserts a new record and returns it with its database id.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateRecord` if a record already exists
/// for the same `(event, vendor)` pair.
pub fn insert_record(
    conn: &mut SqliteConnection,
    record: &AttendanceRecord,
) -> Result<AttendanceRecord, PersistenceError> {
    let columns: AttendanceRecordColumns = AttendanceRecordColumns::from_record(record)?;

    let record_id: i64 = diesel::insert_into(attendance_records::table)
        .values(&columns)
        .returning(attendance_records::record_id)
        .get_result::<i64>(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateRecord(record.key().to_string())
            } else {
                PersistenceError::from(e)
            }
        })?;

    debug!(
        record_id,
        event_id = record.event_id.value(),
        vendor_id = record.vendor_id.value(),
        "Inserted attendance record"
    );

    let mut stored: AttendanceRecord = record.clone();
    stored.record_id = Some(record_id);
    Ok(stored)
}
