// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::dispute::build_dispute;
use crate::error::CoreError;
use crate::state::{TransitionContext, TransitionPolicy, TransitionResult};
use crate::transitions::{Transition, transition_for};
use attendance_audit::{ActionType, Actor, AttendanceAction};
use attendance_domain::{
    AttendanceRecord, Confirmation, CustomerId, Dispute, DomainError, EventId, Location,
    MarkFact, MarkKind, Role, Schedule, VendorId, minutes_from_schedule, normalize_notes,
    validate_claimed_time, validate_identifier, validate_location,
};
use time::{OffsetDateTime, UtcOffset};

/// Applies a command to an attendance record, producing the new record and
/// the action that records it.
///
/// Checks run in a fixed order: finalization gate, then role and identity,
/// then the record's current state, then the command payload. Nothing is
/// produced unless every check passes.
///
/// # Arguments
///
/// * `record` - The current record (immutable)
/// * `command` - The command to apply
/// * `context` - Caller identity, request id, gate flag and receipt time
/// * `policy` - Validation limits
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new record and one action
/// * `Err(CoreError)` if the command is refused
///
/// # Errors
///
/// Returns an error if:
/// - The event's vendor roster is not finalized
/// - The actor's role or identity does not permit the command
/// - The record is not in the state the command requires
/// - The payload fails validation
#[allow(clippy::too_many_lines)]
pub fn apply(
    record: &AttendanceRecord,
    command: Command,
    context: &TransitionContext,
    policy: &TransitionPolicy,
) -> Result<TransitionResult, CoreError> {
    ensure_finalized(record.event_id.value(), context)?;

    let Some(transition) = transition_for(command.kind()) else {
        return Err(CoreError::InvariantViolation(format!(
            "no transition defined for {}",
            command.kind().describe()
        )));
    };

    authorize(record, &transition, &context.actor)?;

    if record.status != transition.from {
        return Err(CoreError::InvalidState {
            action: transition.command.describe(),
            current: record.status,
            required: transition.from,
        });
    }

    let mut new_record: AttendanceRecord = record.clone();
    let action_type: ActionType = command.action_type();
    let mut location: Option<Location> = None;

    let notes: Option<String> = match command {
        Command::SubmitMarkIn {
            claimed_at,
            location: captured,
            notes,
        } => {
            let notes: Option<String> = normalize_notes(notes.as_deref())?;
            let fact: MarkFact = submission(
                record,
                MarkKind::MarkIn,
                claimed_at,
                captured,
                context,
                policy,
            )?;
            new_record.delay_minutes = Some(minutes_from_schedule(
                record.schedule.start,
                fact.claimed_at,
            ));
            location.clone_from(&fact.location);
            new_record.mark_in = Some(fact);
            notes
        }
        Command::SubmitMarkOut {
            claimed_at,
            location: captured,
            notes,
        } => {
            let notes: Option<String> = normalize_notes(notes.as_deref())?;
            let fact: MarkFact = submission(
                record,
                MarkKind::MarkOut,
                claimed_at,
                captured,
                context,
                policy,
            )?;
            new_record.overtime_minutes = Some(minutes_from_schedule(
                record.schedule.end,
                fact.claimed_at,
            ));
            location.clone_from(&fact.location);
            new_record.mark_out = Some(fact);
            notes
        }
        Command::Confirm { fact, notes } => {
            let notes: Option<String> = normalize_notes(notes.as_deref())?;
            let target: &mut Option<MarkFact> = match fact {
                MarkKind::MarkIn => &mut new_record.mark_in,
                MarkKind::MarkOut => &mut new_record.mark_out,
            };
            let Some(submitted) = target.as_mut() else {
                return Err(CoreError::InvariantViolation(format!(
                    "{fact} on {} was never submitted",
                    record.key()
                )));
            };
            submitted.confirmation = Some(Confirmation {
                confirmed_at: context.received_at,
                confirmed_by: context.actor.id.clone(),
            });
            notes
        }
        Command::RaiseDispute { fact, reason } => {
            let dispute: Dispute = build_dispute(
                record,
                fact,
                &reason,
                &context.actor.id,
                context.received_at,
            )?;
            let notes: Option<String> = Some(dispute.reason.clone());
            new_record.dispute = Some(dispute);
            notes
        }
    };

    new_record.status = transition.to;
    new_record.updated_at = record.updated_at.max(context.received_at);

    new_record
        .check_invariants()
        .map_err(|e| CoreError::InvariantViolation(e.to_string()))?;
    ensure_confirmed_facts_preserved(record, &new_record)?;

    let action: AttendanceAction = AttendanceAction::new(
        action_type,
        context.received_at,
        context.actor.clone(),
        context.cause.clone(),
        record.status,
        new_record.status,
    )
    .with_location(location)
    .with_notes(notes);

    Ok(TransitionResult { new_record, action })
}

/// Opens a new attendance record at `NotStarted` for a finalized roster entry.
///
/// Opening a record does not produce an action; the action vocabulary only
/// covers vendor submissions and their review.
///
/// # Errors
///
/// Returns an error if:
/// - The event's vendor roster is not finalized
/// - The actor is not an admin
/// - Any identifier is blank or too long
pub fn open_record(
    event_id: &str,
    vendor_id: &str,
    customer_id: &str,
    schedule: Schedule,
    context: &TransitionContext,
) -> Result<AttendanceRecord, CoreError> {
    ensure_finalized(event_id.trim(), context)?;

    if context.actor.role != Role::Admin {
        return Err(CoreError::Unauthorized {
            action: "open an attendance record",
            role: context.actor.role,
            actor_id: context.actor.id.clone(),
            reason: String::from("only admin may open attendance records"),
        });
    }

    validate_identifier("Event id", event_id)?;
    validate_identifier("Vendor id", vendor_id)?;
    validate_identifier("Customer id", customer_id)?;

    let record: AttendanceRecord = AttendanceRecord::new(
        EventId::new(event_id),
        VendorId::new(vendor_id),
        CustomerId::new(customer_id),
        schedule,
        context.received_at,
    );
    record
        .check_invariants()
        .map_err(|e| CoreError::InvariantViolation(e.to_string()))?;
    Ok(record)
}

fn ensure_finalized(event_id: &str, context: &TransitionContext) -> Result<(), CoreError> {
    if context.is_finalized {
        Ok(())
    } else {
        Err(CoreError::NotFinalized {
            event_id: event_id.to_string(),
        })
    }
}

/// Checks the actor's role against the table row, then binds the actor to
/// the record: vendors act only on their own record, customers only on
/// records of events they own. Admins may review any record.
fn authorize(
    record: &AttendanceRecord,
    transition: &Transition,
    actor: &Actor,
) -> Result<(), CoreError> {
    let action: &'static str = transition.command.describe();
    let refuse = |reason: String| CoreError::Unauthorized {
        action,
        role: actor.role,
        actor_id: actor.id.clone(),
        reason,
    };

    if !transition.roles.contains(&actor.role) {
        let allowed: Vec<&str> = transition.roles.iter().map(Role::as_str).collect();
        return Err(refuse(format!("only {} may do this", allowed.join(" or "))));
    }

    match actor.role {
        Role::Vendor if actor.id != record.vendor_id.value() => Err(refuse(format!(
            "the record belongs to vendor '{}'",
            record.vendor_id.value()
        ))),
        Role::Customer if actor.id != record.customer_id.value() => Err(refuse(format!(
            "the event is owned by customer '{}'",
            record.customer_id.value()
        ))),
        Role::Vendor | Role::Customer | Role::Admin => Ok(()),
    }
}

/// Validates a vendor claim and builds the unconfirmed fact.
fn submission(
    record: &AttendanceRecord,
    kind: MarkKind,
    claimed_at: OffsetDateTime,
    location: Option<Location>,
    context: &TransitionContext,
    policy: &TransitionPolicy,
) -> Result<MarkFact, CoreError> {
    let claimed_at: OffsetDateTime = claimed_at.to_offset(UtcOffset::UTC);
    validate_claimed_time(claimed_at, context.received_at, policy.max_clock_skew)?;

    if let Some(location) = &location {
        validate_location(location)?;
    }

    if kind == MarkKind::MarkOut
        && let Some(mark_in) = record.confirmed_mark_in()
        && claimed_at < mark_in
    {
        return Err(CoreError::Validation(DomainError::MarkOutBeforeMarkIn {
            mark_in,
            mark_out: claimed_at,
        }));
    }

    let location: Option<Location> = location.filter(|l| !l.is_empty());
    Ok(MarkFact::submitted(claimed_at, location, context.received_at))
}

fn ensure_confirmed_facts_preserved(
    before: &AttendanceRecord,
    after: &AttendanceRecord,
) -> Result<(), CoreError> {
    for kind in [MarkKind::MarkIn, MarkKind::MarkOut] {
        if let Some(confirmed) = before.fact(kind).filter(|fact| fact.is_confirmed())
            && after.fact(kind) != Some(confirmed)
        {
            return Err(CoreError::InvariantViolation(format!(
                "confirmed {kind} on {} would change",
                before.key()
            )));
        }
    }
    Ok(())
}
