// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notifications emitted after accepted transitions.
//!
//! The api layer only emits. Delivery belongs to whoever implements the sink,
//! and a failed delivery never fails the command that caused it.

use attendance_audit::{ActionType, AttendanceAction};
use attendance_domain::{AttendanceRecord, AttendanceStatus, Role};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Tells the counterpart actor that a record changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceNotification {
    /// The record's event.
    pub event_id: String,
    /// The record's vendor.
    pub vendor_id: String,
    /// The record's database id.
    pub record_id: i64,
    /// What happened.
    pub action_type: ActionType,
    /// The record's status after the transition.
    pub status: AttendanceStatus,
    /// Who is expected to act next.
    pub recipient: Role,
    /// The account the notification is addressed to.
    pub recipient_id: String,
    /// When the transition was accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
}

impl AttendanceNotification {
    /// Builds the notification for a persisted transition.
    ///
    /// Submissions notify the customer, who has to review them. Confirmations
    /// and disputes notify the vendor.
    #[must_use]
    pub fn for_transition(
        record: &AttendanceRecord,
        record_id: i64,
        action: &AttendanceAction,
    ) -> Self {
        let (recipient, recipient_id): (Role, &str) = match action.action_type {
            ActionType::MarkIn | ActionType::MarkOut => {
                (Role::Customer, record.customer_id.value())
            }
            ActionType::ConfirmMarkIn | ActionType::ConfirmMarkOut | ActionType::RaiseDispute => {
                (Role::Vendor, record.vendor_id.value())
            }
        };
        Self {
            event_id: record.event_id.value().to_string(),
            vendor_id: record.vendor_id.value().to_string(),
            record_id,
            action_type: action.action_type,
            status: record.status,
            recipient,
            recipient_id: recipient_id.to_string(),
            performed_at: action.performed_at,
        }
    }
}

/// A notification could not be handed off.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Receives notifications after accepted transitions.
pub trait NotificationSink: Send + Sync {
    /// Hands one notification to the delivery mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off. The
    /// caller logs it and carries on.
    fn notify(&self, notification: &AttendanceNotification) -> Result<(), NotificationError>;
}

/// A sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardNotifications;

impl NotificationSink for DiscardNotifications {
    fn notify(&self, _notification: &AttendanceNotification) -> Result<(), NotificationError> {
        Ok(())
    }
}
