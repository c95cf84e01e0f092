// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::location::{GeoPoint, Location};
use time::{Duration, OffsetDateTime};

/// Maximum length of a dispute reason, in characters.
pub const MAX_DISPUTE_REASON_CHARS: usize = 1000;

/// Maximum length of free-text notes on an action, in characters.
pub const MAX_NOTES_CHARS: usize = 1000;

/// Maximum length of an identifier, in characters.
pub const MAX_IDENTIFIER_CHARS: usize = 128;

/// Validates that an identifier is non-empty and reasonably sized.
///
/// # Errors
///
/// Returns `DomainError::InvalidIdentifier` if the value is blank or too long.
pub fn validate_identifier(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier {
            field,
            reason: String::from("cannot be empty"),
        });
    }
    if value.chars().count() > MAX_IDENTIFIER_CHARS {
        return Err(DomainError::InvalidIdentifier {
            field,
            reason: format!("cannot exceed {MAX_IDENTIFIER_CHARS} characters"),
        });
    }
    Ok(())
}

/// Validates that coordinates are finite and on the globe.
///
/// # Errors
///
/// Returns `DomainError::InvalidCoordinates` if either component is out of range.
pub fn validate_geo_point(point: &GeoPoint) -> Result<(), DomainError> {
    if !point.latitude.is_finite() || !point.longitude.is_finite() {
        return Err(DomainError::InvalidCoordinates {
            reason: String::from("coordinates must be finite numbers"),
        });
    }
    if !(-90.0..=90.0).contains(&point.latitude) {
        return Err(DomainError::InvalidCoordinates {
            reason: format!("latitude {} is outside [-90, 90]", point.latitude),
        });
    }
    if !(-180.0..=180.0).contains(&point.longitude) {
        return Err(DomainError::InvalidCoordinates {
            reason: format!("longitude {} is outside [-180, 180]", point.longitude),
        });
    }
    Ok(())
}

/// Validates the coordinates of a location, if it has any.
///
/// # Errors
///
/// Returns `DomainError::InvalidCoordinates` if the coordinates are out of range.
pub fn validate_location(location: &Location) -> Result<(), DomainError> {
    location
        .coordinates
        .as_ref()
        .map_or(Ok(()), validate_geo_point)
}

/// Validates and normalises a dispute reason.
///
/// # Returns
///
/// The trimmed reason.
///
/// # Errors
///
/// Returns an error if the reason is blank or longer than
/// `MAX_DISPUTE_REASON_CHARS`.
pub fn validate_dispute_reason(reason: &str) -> Result<String, DomainError> {
    let trimmed: &str = reason.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyDisputeReason);
    }
    let length: usize = trimmed.chars().count();
    if length > MAX_DISPUTE_REASON_CHARS {
        return Err(DomainError::TextTooLong {
            field: "Dispute reason",
            length,
            max: MAX_DISPUTE_REASON_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Normalises optional notes: trimmed, and blank notes become `None`.
///
/// # Errors
///
/// Returns `DomainError::TextTooLong` if the notes exceed `MAX_NOTES_CHARS`.
pub fn normalize_notes(notes: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(trimmed) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    let length: usize = trimmed.chars().count();
    if length > MAX_NOTES_CHARS {
        return Err(DomainError::TextTooLong {
            field: "Notes",
            length,
            max: MAX_NOTES_CHARS,
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates that a claimed instant is not ahead of the server clock by more
/// than `max_skew`.
///
/// # Errors
///
/// Returns `DomainError::ClaimedTimeInFuture` if the claim is too far ahead.
pub fn validate_claimed_time(
    claimed: OffsetDateTime,
    received: OffsetDateTime,
    max_skew: Duration,
) -> Result<(), DomainError> {
    if claimed > received + max_skew {
        return Err(DomainError::ClaimedTimeInFuture { claimed, received });
    }
    Ok(())
}
