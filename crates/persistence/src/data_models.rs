// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row models and their conversions to and from domain types.
//!
//! Instants are stored as RFC 3339 text in UTC. Facts, locations and the
//! dispute are flattened into nullable columns; a group of columns is
//! either entirely present or entirely absent.

use diesel::prelude::*;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use attendance_audit::{ActionType, Actor, AttendanceAction, Cause};
use attendance_domain::{
    AttendanceRecord, AttendanceStatus, Confirmation, CustomerId, Dispute, EventId, GeoPoint,
    Location, MarkFact, MarkKind, Role, Schedule, VendorId, format_instant,
};

use crate::diesel_schema::{attendance_actions, attendance_records};
use crate::error::PersistenceError;

/// A full `attendance_records` row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttendanceRecordRow {
    pub record_id: i64,
    pub event_id: String,
    pub vendor_id: String,
    pub customer_id: String,
    pub scheduled_start: String,
    pub scheduled_end: String,
    pub mark_in_time: Option<String>,
    pub mark_in_latitude: Option<f64>,
    pub mark_in_longitude: Option<f64>,
    pub mark_in_address: Option<String>,
    pub mark_in_submitted_at: Option<String>,
    pub mark_in_confirmed_at: Option<String>,
    pub mark_in_confirmed_by: Option<String>,
    pub mark_out_time: Option<String>,
    pub mark_out_latitude: Option<f64>,
    pub mark_out_longitude: Option<f64>,
    pub mark_out_address: Option<String>,
    pub mark_out_submitted_at: Option<String>,
    pub mark_out_confirmed_at: Option<String>,
    pub mark_out_confirmed_by: Option<String>,
    pub delay_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub status: String,
    pub is_disputed: i32,
    pub dispute_fact: Option<String>,
    pub dispute_reason: Option<String>,
    pub dispute_raised_by: Option<String>,
    pub dispute_raised_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

/// Every column of `attendance_records` except the generated id.
///
/// Used both to insert a new record and to overwrite an existing one, so
/// `None` must clear the column rather than skip it.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = attendance_records)]
#[diesel(treat_none_as_null = true)]
pub struct AttendanceRecordColumns {
    pub event_id: String,
    pub vendor_id: String,
    pub customer_id: String,
    pub scheduled_start: String,
    pub scheduled_end: String,
    pub mark_in_time: Option<String>,
    pub mark_in_latitude: Option<f64>,
    pub mark_in_longitude: Option<f64>,
    pub mark_in_address: Option<String>,
    pub mark_in_submitted_at: Option<String>,
    pub mark_in_confirmed_at: Option<String>,
    pub mark_in_confirmed_by: Option<String>,
    pub mark_out_time: Option<String>,
    pub mark_out_latitude: Option<f64>,
    pub mark_out_longitude: Option<f64>,
    pub mark_out_address: Option<String>,
    pub mark_out_submitted_at: Option<String>,
    pub mark_out_confirmed_at: Option<String>,
    pub mark_out_confirmed_by: Option<String>,
    pub delay_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub status: String,
    pub is_disputed: i32,
    pub dispute_fact: Option<String>,
    pub dispute_reason: Option<String>,
    pub dispute_raised_by: Option<String>,
    pub dispute_raised_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

/// A full `attendance_actions` row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = attendance_actions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttendanceActionRow {
    pub action_id: i64,
    pub record_id: i64,
    pub sequence: i64,
    pub request_id: String,
    pub action_type: String,
    pub performed_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub actor_id: String,
    pub actor_role: String,
    pub cause_description: String,
    pub status_before: String,
    pub status_after: String,
}

/// A new `attendance_actions` row.
#[derive(Debug, Insertable)]
#[diesel(table_name = attendance_actions)]
pub struct NewAttendanceAction {
    pub record_id: i64,
    pub sequence: i64,
    pub request_id: String,
    pub action_type: String,
    pub performed_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub actor_id: String,
    pub actor_role: String,
    pub cause_description: String,
    pub status_before: String,
    pub status_after: String,
}

/// The flattened columns of one Mark-In or Mark-Out fact.
#[derive(Debug, Default)]
struct FactColumns {
    time: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
    submitted_at: Option<String>,
    confirmed_at: Option<String>,
    confirmed_by: Option<String>,
}

impl FactColumns {
    fn from_fact(fact: Option<&MarkFact>) -> Result<Self, PersistenceError> {
        let Some(fact) = fact else {
            return Ok(Self::default());
        };
        let (latitude, longitude, address) = split_location(fact.location.as_ref());
        let (confirmed_at, confirmed_by) = match &fact.confirmation {
            Some(confirmation) => (
                Some(format_timestamp(confirmation.confirmed_at)?),
                Some(confirmation.confirmed_by.clone()),
            ),
            None => (None, None),
        };
        Ok(Self {
            time: Some(format_timestamp(fact.claimed_at)?),
            latitude,
            longitude,
            address,
            submitted_at: Some(format_timestamp(fact.submitted_at)?),
            confirmed_at,
            confirmed_by,
        })
    }

    fn into_fact(self, kind: MarkKind) -> Result<Option<MarkFact>, PersistenceError> {
        let Some(time) = self.time else {
            return Ok(None);
        };
        let Some(submitted_at) = self.submitted_at else {
            return Err(PersistenceError::ReconstructionError(format!(
                "{kind} has a claimed time but no submission time"
            )));
        };
        let confirmation: Option<Confirmation> = match (self.confirmed_at, self.confirmed_by) {
            (Some(at), Some(by)) => Some(Confirmation {
                confirmed_at: parse_timestamp(&at)?,
                confirmed_by: by,
            }),
            (None, None) => None,
            _ => {
                return Err(PersistenceError::ReconstructionError(format!(
                    "{kind} confirmation columns are incomplete"
                )));
            }
        };
        Ok(Some(MarkFact {
            claimed_at: parse_timestamp(&time)?,
            location: join_location(self.latitude, self.longitude, self.address),
            submitted_at: parse_timestamp(&submitted_at)?,
            confirmation,
        }))
    }
}

impl AttendanceRecordColumns {
    /// Flattens a record into its stored columns.
    ///
    /// # Errors
    ///
    /// Returns an error if an instant cannot be formatted.
    pub fn from_record(record: &AttendanceRecord) -> Result<Self, PersistenceError> {
        let mark_in: FactColumns = FactColumns::from_fact(record.mark_in.as_ref())?;
        let mark_out: FactColumns = FactColumns::from_fact(record.mark_out.as_ref())?;
        let dispute_raised_at: Option<String> = match &record.dispute {
            Some(dispute) => Some(format_timestamp(dispute.raised_at)?),
            None => None,
        };

        Ok(Self {
            event_id: record.event_id.value().to_string(),
            vendor_id: record.vendor_id.value().to_string(),
            customer_id: record.customer_id.value().to_string(),
            scheduled_start: format_timestamp(record.schedule.start)?,
            scheduled_end: format_timestamp(record.schedule.end)?,
            mark_in_time: mark_in.time,
            mark_in_latitude: mark_in.latitude,
            mark_in_longitude: mark_in.longitude,
            mark_in_address: mark_in.address,
            mark_in_submitted_at: mark_in.submitted_at,
            mark_in_confirmed_at: mark_in.confirmed_at,
            mark_in_confirmed_by: mark_in.confirmed_by,
            mark_out_time: mark_out.time,
            mark_out_latitude: mark_out.latitude,
            mark_out_longitude: mark_out.longitude,
            mark_out_address: mark_out.address,
            mark_out_submitted_at: mark_out.submitted_at,
            mark_out_confirmed_at: mark_out.confirmed_at,
            mark_out_confirmed_by: mark_out.confirmed_by,
            delay_minutes: record.delay_minutes,
            overtime_minutes: record.overtime_minutes,
            status: record.status.as_str().to_string(),
            is_disputed: i32::from(record.is_disputed()),
            dispute_fact: record.dispute.as_ref().map(|d| d.fact.as_str().to_string()),
            dispute_reason: record.dispute.as_ref().map(|d| d.reason.clone()),
            dispute_raised_by: record.dispute.as_ref().map(|d| d.raised_by.clone()),
            dispute_raised_at,
            created_at: format_timestamp(record.created_at)?,
            updated_at: format_timestamp(record.updated_at)?,
            version: record.version,
        })
    }
}

impl AttendanceRecordRow {
    /// Rebuilds the domain record and checks its invariants.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ReconstructionError` if the row is
    /// malformed or describes an inconsistent record.
    pub fn into_record(self) -> Result<AttendanceRecord, PersistenceError> {
        let schedule: Schedule = Schedule::new(
            parse_timestamp(&self.scheduled_start)?,
            parse_timestamp(&self.scheduled_end)?,
        )
        .map_err(reconstruction)?;

        let mark_in: Option<MarkFact> = FactColumns {
            time: self.mark_in_time,
            latitude: self.mark_in_latitude,
            longitude: self.mark_in_longitude,
            address: self.mark_in_address,
            submitted_at: self.mark_in_submitted_at,
            confirmed_at: self.mark_in_confirmed_at,
            confirmed_by: self.mark_in_confirmed_by,
        }
        .into_fact(MarkKind::MarkIn)?;
        let mark_out: Option<MarkFact> = FactColumns {
            time: self.mark_out_time,
            latitude: self.mark_out_latitude,
            longitude: self.mark_out_longitude,
            address: self.mark_out_address,
            submitted_at: self.mark_out_submitted_at,
            confirmed_at: self.mark_out_confirmed_at,
            confirmed_by: self.mark_out_confirmed_by,
        }
        .into_fact(MarkKind::MarkOut)?;

        let dispute: Option<Dispute> = match (
            self.dispute_fact,
            self.dispute_reason,
            self.dispute_raised_by,
            self.dispute_raised_at,
        ) {
            (Some(fact), Some(reason), Some(raised_by), Some(raised_at)) => Some(Dispute {
                fact: fact.parse::<MarkKind>().map_err(reconstruction)?,
                reason,
                raised_by,
                raised_at: parse_timestamp(&raised_at)?,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(PersistenceError::ReconstructionError(String::from(
                    "dispute columns are incomplete",
                )));
            }
        };

        let record: AttendanceRecord = AttendanceRecord {
            record_id: Some(self.record_id),
            event_id: EventId::new(&self.event_id),
            vendor_id: VendorId::new(&self.vendor_id),
            customer_id: CustomerId::new(&self.customer_id),
            schedule,
            mark_in,
            mark_out,
            delay_minutes: self.delay_minutes,
            overtime_minutes: self.overtime_minutes,
            status: self
                .status
                .parse::<AttendanceStatus>()
                .map_err(reconstruction)?,
            dispute,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            version: self.version,
        };
        record.check_invariants().map_err(reconstruction)?;
        Ok(record)
    }
}

impl NewAttendanceAction {
    /// Flattens an action for insertion at `sequence` in `record_id`'s history.
    ///
    /// # Errors
    ///
    /// Returns an error if an instant cannot be formatted.
    pub fn from_action(
        action: &AttendanceAction,
        record_id: i64,
        sequence: i64,
    ) -> Result<Self, PersistenceError> {
        let (latitude, longitude, address) = split_location(action.location.as_ref());
        Ok(Self {
            record_id,
            sequence,
            request_id: action.cause.id.clone(),
            action_type: action.action_type.as_str().to_string(),
            performed_at: format_timestamp(action.performed_at)?,
            latitude,
            longitude,
            address,
            notes: action.notes.clone(),
            actor_id: action.actor.id.clone(),
            actor_role: action.actor.role.as_str().to_string(),
            cause_description: action.cause.description.clone(),
            status_before: action.status_before.as_str().to_string(),
            status_after: action.status_after.as_str().to_string(),
        })
    }
}

impl AttendanceActionRow {
    /// Rebuilds the persisted action.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ReconstructionError` if the row is malformed.
    pub fn into_action(self) -> Result<AttendanceAction, PersistenceError> {
        let action_type: ActionType = self
            .action_type
            .parse::<ActionType>()
            .map_err(reconstruction)?;
        let role: Role = self.actor_role.parse::<Role>().map_err(reconstruction)?;
        let status_before: AttendanceStatus = self
            .status_before
            .parse::<AttendanceStatus>()
            .map_err(reconstruction)?;
        let status_after: AttendanceStatus = self
            .status_after
            .parse::<AttendanceStatus>()
            .map_err(reconstruction)?;

        Ok(AttendanceAction::new(
            action_type,
            parse_timestamp(&self.performed_at)?,
            Actor::new(self.actor_id, role),
            Cause::new(self.request_id, self.cause_description),
            status_before,
            status_after,
        )
        .with_location(join_location(self.latitude, self.longitude, self.address))
        .with_notes(self.notes)
        .persisted(self.action_id, self.record_id, self.sequence))
    }
}

fn split_location(location: Option<&Location>) -> (Option<f64>, Option<f64>, Option<String>) {
    location.map_or((None, None, None), |location| {
        (
            location.coordinates.map(|p| p.latitude),
            location.coordinates.map(|p| p.longitude),
            location.address.clone(),
        )
    })
}

fn join_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
) -> Option<Location> {
    let coordinates: Option<GeoPoint> = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
        _ => None,
    };
    let location: Location = Location {
        coordinates,
        address,
    };
    (!location.is_empty()).then_some(location)
}

fn format_timestamp(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    format_instant(instant).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        PersistenceError::ReconstructionError(format!("invalid stored timestamp '{value}': {e}"))
    })
}

fn reconstruction<E: std::fmt::Display>(err: E) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}
