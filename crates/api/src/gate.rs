// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The finalization gate.
//!
//! Whether an event's vendor roster is finalized is decided upstream. The
//! api layer reads the flag before every command and every projection and
//! never caches it on a record.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use attendance_domain::EventId;
use tracing::info;

/// Answers whether an event's vendor roster is finalized.
pub trait FinalizationGate: Send + Sync {
    /// Returns true once the event's vendor roster is finalized.
    fn is_finalized(&self, event_id: &EventId) -> bool;
}

/// An in-process, monotonic set of finalized events.
///
/// Events can be added but never removed: once an event is finalized it
/// stays finalized for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct FinalizationRegistry {
    finalized: RwLock<HashSet<EventId>>,
}

impl FinalizationRegistry {
    /// Creates an empty registry. Every gate starts closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the gate for an event.
    ///
    /// # Returns
    ///
    /// `true` if the event was not finalized before this call.
    pub fn mark_finalized(&self, event_id: EventId) -> bool {
        let mut finalized = self
            .finalized
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let newly_finalized: bool = finalized.insert(event_id.clone());
        if newly_finalized {
            info!(event_id = event_id.value(), "Event finalized; attendance is open");
        }
        newly_finalized
    }

    /// Returns the number of finalized events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.finalized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no event is finalized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FinalizationGate for FinalizationRegistry {
    fn is_finalized(&self, event_id: &EventId) -> bool {
        self.finalized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(event_id)
    }
}
