// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-request access to the attendance database.
//!
//! A file database hands every request its own connection, so commands on
//! different records run side by side and only meet at `SQLite`'s write
//! lock and the record's version check. An in-memory database exists only
//! as long as its connection, so it is shared behind a lock instead.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

use attendance_api::{ApiError, translate_persistence_error};
use attendance_persistence::{Persistence, PersistenceError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Where request handlers get their persistence from.
#[derive(Clone)]
pub enum PersistenceStore {
    /// One connection, serialized across requests.
    Shared(Arc<Mutex<Persistence>>),
    /// A migrated database file; each request opens a connection.
    File(PathBuf),
}

impl PersistenceStore {
    /// Wraps an already opened database in a shared store.
    pub fn shared(persistence: Persistence) -> Self {
        Self::Shared(Arc::new(Mutex::new(persistence)))
    }

    /// Migrates the database file once, then serves a connection per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or migrated.
    pub fn file(path: PathBuf) -> Result<Self, PersistenceError> {
        drop(Persistence::new_with_file(&path)?);
        Ok(Self::File(path))
    }

    /// Returns a connection for one request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a file connection cannot be opened.
    pub async fn checkout(&self) -> Result<PersistenceHandle, ApiError> {
        match self {
            Self::Shared(shared) => Ok(PersistenceHandle::Shared(
                Arc::clone(shared).lock_owned().await,
            )),
            Self::File(path) => {
                debug!(path = %path.display(), "Opening request connection");
                Persistence::connect_to_file(path)
                    .map(PersistenceHandle::Owned)
                    .map_err(translate_persistence_error)
            }
        }
    }
}

/// A connection checked out for one request.
pub enum PersistenceHandle {
    /// The shared connection, held until the handle drops.
    Shared(OwnedMutexGuard<Persistence>),
    /// A connection owned by this request.
    Owned(Persistence),
}

impl Deref for PersistenceHandle {
    type Target = Persistence;

    fn deref(&self) -> &Persistence {
        match self {
            Self::Shared(guard) => guard,
            Self::Owned(persistence) => persistence,
        }
    }
}

impl DerefMut for PersistenceHandle {
    fn deref_mut(&mut self) -> &mut Persistence {
        match self {
            Self::Shared(guard) => guard,
            Self::Owned(persistence) => persistence,
        }
    }
}
