// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Database connection failed.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// Initialization error.
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    /// A stored row could not be turned back into a domain value.
    #[error("State reconstruction error: {0}")]
    ReconstructionError(String),
    /// A domain value could not be written to its stored form.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// No attendance record exists for the key.
    #[error("No attendance record for {0}")]
    RecordNotFound(String),
    /// An attendance record already exists for the key.
    #[error("An attendance record already exists for {0}")]
    DuplicateRecord(String),
    /// The record was written by someone else after it was read.
    #[error(
        "Attendance record {record_id} changed after version {expected_version} was read; reload and retry"
    )]
    ConcurrencyConflict {
        /// The record that was contended.
        record_id: i64,
        /// The version the writer read.
        expected_version: i64,
    },
    /// An action with this request id is already in the record's history.
    #[error("Request '{request_id}' was already applied to attendance record {record_id}")]
    DuplicateRequest {
        /// The record the request targeted.
        record_id: i64,
        /// The client-supplied request id.
        request_id: String,
    },
    /// A record without a database id was passed where a stored one is needed.
    #[error("Attendance record for {0} has not been stored yet")]
    UnpersistedRecord(String),
    /// The requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl PersistenceError {
    /// Returns true for errors a caller may resolve by reloading and retrying.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

/// Returns true if a Diesel error is a unique constraint violation.
pub(crate) const fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
