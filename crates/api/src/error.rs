// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use attendance::CoreError;
use attendance_domain::DomainError;
use attendance_persistence::PersistenceError;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and represent
/// the API contract. Every message names the precondition that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor may not perform this action.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        message: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The event's vendor roster is not finalized yet. Retry once it is.
    #[error(
        "Event '{event_id}' is not finalized; attendance opens once its vendor roster is finalized"
    )]
    NotFinalized {
        /// The event whose gate is closed.
        event_id: String,
    },
    /// The record is not in the state the command requires.
    #[error("{message}")]
    InvalidState {
        /// A description naming the required state.
        message: String,
    },
    /// The resource already exists.
    #[error("{message}")]
    Duplicate {
        /// A description of the duplicate.
        message: String,
    },
    /// The record kept changing underneath the command. Reload and retry.
    #[error("{message}")]
    ConcurrencyConflict {
        /// A description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidIdentifier { field, .. } | DomainError::TextTooLong { field, .. } => {
            field
        }
        DomainError::InvalidSchedule { .. } => "schedule",
        DomainError::InvalidTimestamp { .. }
        | DomainError::AmbiguousLocalTime { .. }
        | DomainError::NonexistentLocalTime { .. } => "timestamp",
        DomainError::MissingTimezone { .. } | DomainError::UnknownTimezone(_) => "timezone",
        DomainError::InvalidCoordinates { .. } => "location",
        DomainError::EmptyDisputeReason => "reason",
        DomainError::ClaimedTimeInFuture { .. } | DomainError::MarkOutBeforeMarkIn { .. } => {
            "claimed_at"
        }
        DomainError::InvalidStatus(_) => "status",
        DomainError::InvalidRole(_) => "actor_role",
        DomainError::InvalidMarkKind(_) => "fact",
        DomainError::InvariantViolation(_) => {
            return ApiError::Internal {
                message: err.to_string(),
            };
        }
    };
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let message: String = err.to_string();
    match err {
        CoreError::NotFinalized { event_id } => ApiError::NotFinalized { event_id },
        CoreError::Unauthorized { action, .. } => ApiError::Unauthorized {
            action: action.to_string(),
            message,
        },
        CoreError::InvalidState { .. } => ApiError::InvalidState { message },
        CoreError::Validation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvariantViolation(_) => ApiError::Internal { message },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    let message: String = err.to_string();
    match err {
        PersistenceError::RecordNotFound(_) | PersistenceError::NotFound(_) => {
            ApiError::ResourceNotFound {
                resource_type: String::from("Attendance record"),
                message,
            }
        }
        PersistenceError::DuplicateRecord(_) | PersistenceError::DuplicateRequest { .. } => {
            ApiError::Duplicate { message }
        }
        PersistenceError::ConcurrencyConflict { .. } => ApiError::ConcurrencyConflict { message },
        _ => ApiError::Internal { message },
    }
}
