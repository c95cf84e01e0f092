// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication types and services.
//!
//! Identity is owned by an upstream service. This module only turns the
//! identity it asserts into an actor the engine can authorize.

use attendance_audit::Actor;
use attendance_domain::{MAX_IDENTIFIER_CHARS, Role};

use crate::error::AuthError;

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role the actor is acting in.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role the actor is acting in
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

/// Authenticates an actor asserted by the upstream identity service.
///
/// This is a stub: it trusts the asserted id and role and only rejects
/// malformed ids.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the id is blank or too long.
pub fn authenticate_stub(actor_id: &str, role: Role) -> Result<AuthenticatedActor, AuthError> {
    let actor_id: &str = actor_id.trim();
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    if actor_id.chars().count() > MAX_IDENTIFIER_CHARS {
        return Err(AuthError::AuthenticationFailed {
            reason: format!("Actor ID cannot exceed {MAX_IDENTIFIER_CHARS} characters"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id.to_string(), role))
}

/// Parses a role name as sent by clients.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` for an unknown role.
pub fn parse_role(role: &str) -> Result<Role, AuthError> {
    role.parse::<Role>()
        .map_err(|_| AuthError::AuthenticationFailed {
            reason: format!("Unknown role '{role}'; expected vendor, customer or admin"),
        })
}
