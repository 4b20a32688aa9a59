//! Calendar sync outbox models
//!
//! Calendar side effects are recorded as jobs in a persistent outbox and
//! applied by a background worker, keeping the external calendar eventually
//! consistent without ever blocking a booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mirror operation to perform against the external calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::CreateEvent => "create_event",
            SyncAction::UpdateEvent => "update_event",
            SyncAction::DeleteEvent => "delete_event",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create_event" => Some(SyncAction::CreateEvent),
            "update_event" => Some(SyncAction::UpdateEvent),
            "delete_event" => Some(SyncAction::DeleteEvent),
            _ => None,
        }
    }
}

/// Processing state of an outbox job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncJobStatus {
    Pending,
    Sent,
    Failed,
}

impl SyncJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncJobStatus::Pending => "pending",
            SyncJobStatus::Sent => "sent",
            SyncJobStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SyncJobStatus::Pending),
            "sent" => Some(SyncJobStatus::Sent),
            "failed" => Some(SyncJobStatus::Failed),
            _ => None,
        }
    }
}

/// A queued calendar mirror operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub instructor_id: Uuid,
    pub action: SyncAction,
    pub status: SyncJobStatus,
    pub attempts: u32,
    /// Earliest instant the job may be retried; `None` means immediately.
    pub retry_after: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncJob {
    pub fn new(appointment_id: Uuid, instructor_id: Uuid, action: SyncAction) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            appointment_id,
            instructor_id,
            action,
            status: SyncJobStatus::Pending,
            attempts: 0,
            retry_after: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
