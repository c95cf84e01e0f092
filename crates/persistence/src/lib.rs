// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for attendance tracking.
//!
//! This crate is the Attendance Record Store and the Audit Log Appender.
//! It is built on Diesel with the `SQLite` backend.
//!
//! ## Storage Model
//!
//! - `attendance_records` holds one row per `(event, vendor)` pair, with a
//!   `version` column used for optimistic concurrency.
//! - `attendance_actions` is the append-only history, keyed by record id
//!   with a strictly increasing per-record `sequence`. Each action also
//!   carries the client request id, unique per record, which makes command
//!   retries idempotent.
//! - Database triggers abort any update or delete of an action and any
//!   delete of a record.
//!
//! ## Concurrency
//!
//! A transition is persisted with a compare-and-swap on `version` inside a
//! transaction. Two writers that read the same version cannot both succeed:
//! the loser receives `PersistenceError::ConcurrencyConflict` and nothing it
//! attempted is written.
//!
//! ## Testing Philosophy
//!
//! - Tests run against isolated in-memory `SQLite` databases
//! - Each `new_in_memory()` call receives a unique database name

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use attendance::TransitionResult;
use attendance_audit::AttendanceAction;
use attendance_domain::{AttendanceRecord, EventId, RecordKey};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based collisions.
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How long a writer waits on a locked database file, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5_000;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::APPEND_ONLY_TRIGGERS;
pub use error::PersistenceError;
pub use mutations::PersistedTransition;

/// Persistence adapter for attendance records and their action history.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Uses a shared in-memory database via `Diesel`.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_attendance_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;
        backend::sqlite::verify_append_only_triggers(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::set_busy_timeout(&mut conn, BUSY_TIMEOUT_MS)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;
        backend::sqlite::verify_append_only_triggers(&mut conn)?;

        info!(path = path_str, "Opened attendance database");
        Ok(Self { conn })
    }

    /// Opens another connection to a database file that `new_with_file`
    /// already initialized.
    ///
    /// Migrations are not run. Each connection gets the same busy timeout, so
    /// writers on separate connections queue instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or foreign keys are off.
    pub fn connect_to_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::connect(path_str)?;
        backend::sqlite::set_busy_timeout(&mut conn, BUSY_TIMEOUT_MS)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Stores a newly opened record.
    ///
    /// # Returns
    ///
    /// The record with its database id assigned.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateRecord` if the `(event, vendor)`
    /// pair already has a record.
    pub fn create_record(
        &mut self,
        record: &AttendanceRecord,
    ) -> Result<AttendanceRecord, PersistenceError> {
        mutations::records::insert_record(&mut self.conn, record)
    }

    /// Retrieves the record for an `(event, vendor)` pair.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RecordNotFound` if there is no such record.
    pub fn get_record(&mut self, key: &RecordKey) -> Result<AttendanceRecord, PersistenceError> {
        queries::records::find_record(&mut self.conn, key)?
            .ok_or_else(|| PersistenceError::RecordNotFound(key.to_string()))
    }

    /// Looks up the record for an `(event, vendor)` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_record(
        &mut self,
        key: &RecordKey,
    ) -> Result<Option<AttendanceRecord>, PersistenceError> {
        queries::records::find_record(&mut self.conn, key)
    }

    /// Retrieves a record by its database id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RecordNotFound` if there is no such record.
    pub fn get_record_by_id(
        &mut self,
        record_id: i64,
    ) -> Result<AttendanceRecord, PersistenceError> {
        queries::records::get_record_by_id(&mut self.conn, record_id)
    }

    /// Lists every record of an event, ordered by vendor id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_records_for_event(
        &mut self,
        event_id: &EventId,
    ) -> Result<Vec<AttendanceRecord>, PersistenceError> {
        queries::records::list_records_for_event(&mut self.conn, event_id)
    }

    // ========================================================================
    // Transitions & Actions
    // ========================================================================

    /// Atomically stores a transition: the new record at the next version
    /// plus exactly one action.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrencyConflict` if the record changed
    /// since it was read, and `PersistenceError::DuplicateRequest` if the
    /// request id was already applied. Nothing is written on error.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistedTransition, PersistenceError> {
        mutations::transitions::persist_transition(&mut self.conn, result)
    }

    /// Retrieves a record's action history in sequence order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_actions(
        &mut self,
        record_id: i64,
    ) -> Result<Vec<AttendanceAction>, PersistenceError> {
        queries::actions::list_actions(&mut self.conn, record_id)
    }

    /// Finds the action a request already produced on a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_action_by_request_id(
        &mut self,
        record_id: i64,
        request_id: &str,
    ) -> Result<Option<AttendanceAction>, PersistenceError> {
        queries::actions::find_action_by_request_id(&mut self.conn, record_id, request_id)
    }

    /// Gives tests raw access to the connection to probe the triggers.
    #[cfg(test)]
    pub(crate) const fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}
