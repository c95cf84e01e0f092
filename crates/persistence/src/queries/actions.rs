// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Action history queries.

use diesel::SqliteConnection;
use diesel::dsl::max;
use diesel::prelude::*;

use attendance_audit::AttendanceAction;

use crate::data_models::AttendanceActionRow;
use crate::diesel_schema::attendance_actions;
use crate::error::PersistenceError;

/// Retrieves a record's full action history in sequence order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_actions(
    conn: &mut SqliteConnection,
    record_id: i64,
) -> Result<Vec<AttendanceAction>, PersistenceError> {
    attendance_actions::table
        .filter(attendance_actions::record_id.eq(record_id))
        .order(attendance_actions::sequence.asc())
        .select(AttendanceActionRow::as_select())
        .load::<AttendanceActionRow>(conn)?
        .into_iter()
        .map(AttendanceActionRow::into_action)
        .collect()
}

/// Finds the action a request produced, if the request was already applied.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_action_by_request_id(
    conn: &mut SqliteConnection,
    record_id: i64,
    request_id: &str,
) -> Result<Option<AttendanceAction>, PersistenceError> {
    attendance_actions::table
        .filter(attendance_actions::record_id.eq(record_id))
        .filter(attendance_actions::request_id.eq(request_id))
        .select(AttendanceActionRow::as_select())
        .first::<AttendanceActionRow>(conn)
        .optional()?
        .map(AttendanceActionRow::into_action)
        .transpose()
}

/// Returns the sequence number the next action of a record will take.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn next_sequence(conn: &mut SqliteConnection, record_id: i64) -> Result<i64, PersistenceError> {
    let last: Option<i64> = attendance_actions::table
        .filter(attendance_actions::record_id.eq(record_id))
        .select(max(attendance_actions::sequence))
        .first::<Option<i64>>(conn)?;
    Ok(last.unwrap_or(0) + 1)
}
