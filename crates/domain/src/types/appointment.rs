//! Appointment and appointment type models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an appointment.
///
/// `Pending` and `Confirmed` count as active: active appointments for one
/// instructor must be pairwise non-overlapping in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Whether this status contributes busy time and the non-overlap
    /// invariant.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Rejected
                | AppointmentStatus::Cancelled
                | AppointmentStatus::Completed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "rejected" => Some(AppointmentStatus::Rejected),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

/// A bookable service offered by an instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentType {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub title: String,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub requires_approval: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A booked appointment between a student and an instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub student_id: Uuid,
    pub appointment_type_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// Id of the mirrored event in the external calendar, once synced.
    pub external_event_id: Option<String>,
    pub student_name: String,
    pub student_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Contact details supplied by the student at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentContact {
    pub name: String,
    pub email: String,
}

/// Display fields derived from an appointment for the notification layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDisplay {
    pub date: String,
    pub time_range: String,
    pub duration_minutes: i64,
    pub price: String,
}

impl AppointmentDisplay {
    /// Derive human-readable fields in the given timezone.
    pub fn from_appointment(
        appointment: &Appointment,
        price_cents: i64,
        tz: chrono_tz::Tz,
    ) -> Self {
        let start = appointment.start.with_timezone(&tz);
        let end = appointment.end.with_timezone(&tz);
        Self {
            date: start.format("%Y-%m-%d").to_string(),
            time_range: format!("{}\u{2013}{}", start.format("%H:%M"), end.format("%H:%M")),
            duration_minutes: appointment.duration_minutes(),
            price: format!("{}.{:02}", price_cents / 100, price_cents % 100),
        }
    }
}
