//! Booking transaction coordinator
//!
//! Owns appointment creation. The conflict re-check and the insert run under
//! a per-instructor mutex, closing the gap between a client viewing slots
//! and submitting a booking. Calendar mirroring is queued after the lock is
//! released and never affects the booking outcome.

use std::sync::Arc;

use bookslot_domain::{
    Appointment, AppointmentStatus, BookslotError, Result, StudentContact, SyncAction, SyncJob,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{AppointmentRepository, AppointmentTypeRepository};
use crate::availability::AvailabilityService;
use crate::clock::Clock;

/// A booking submission for a slot previously offered by the availability
/// service.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub instructor_id: Uuid,
    pub student_id: Uuid,
    pub appointment_type_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub contact: StudentContact,
}

/// Coordinates the validate / re-check / insert booking transaction.
pub struct BookingService {
    availability: Arc<AvailabilityService>,
    appointments: Arc<dyn AppointmentRepository>,
    appointment_types: Arc<dyn AppointmentTypeRepository>,
    outbox: Arc<dyn crate::sync::ports::OutboxQueue>,
    clock: Arc<dyn Clock>,
    // One mutex per instructor; entries live for the process lifetime, which
    // is bounded by the instructor count.
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(
        availability: Arc<AvailabilityService>,
        appointments: Arc<dyn AppointmentRepository>,
        appointment_types: Arc<dyn AppointmentTypeRepository>,
        outbox: Arc<dyn crate::sync::ports::OutboxQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability,
            appointments,
            appointment_types,
            outbox,
            clock,
            locks: DashMap::new(),
        }
    }

    /// Book the chosen slot.
    ///
    /// Two concurrent calls targeting overlapping windows for the same
    /// instructor result in at most one success; the loser receives a
    /// `Conflict` error and must re-query availability. Cross-instructor
    /// bookings never contend.
    #[instrument(skip(self, request), fields(instructor_id = %request.instructor_id))]
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment> {
        let appointment_type = self.validate(&request).await?;

        let lock = self.instructor_lock(request.instructor_id);
        let appointment = {
            let _guard = lock.lock().await;

            let busy = self
                .availability
                .busy_between(request.instructor_id, request.start, request.end)
                .await?;
            if busy.iter().any(|b| b.overlaps(request.start, request.end)) {
                return Err(BookslotError::Conflict(
                    "slot no longer available, please pick another".to_string(),
                ));
            }

            let status = if appointment_type.requires_approval {
                AppointmentStatus::Pending
            } else {
                AppointmentStatus::Confirmed
            };

            let now = self.clock.now();
            let appointment = Appointment {
                id: Uuid::now_v7(),
                instructor_id: request.instructor_id,
                student_id: request.student_id,
                appointment_type_id: appointment_type.id,
                start: request.start,
                end: request.end,
                status,
                external_event_id: None,
                student_name: request.contact.name.clone(),
                student_email: request.contact.email.clone(),
                created_at: now,
                updated_at: now,
            };
            self.appointments.insert(&appointment).await?;
            appointment
        };

        info!(
            appointment_id = %appointment.id,
            status = appointment.status.as_str(),
            "appointment booked"
        );

        // Fire-and-forget calendar mirroring; an enqueue failure must not
        // unwind the committed booking.
        let job = SyncJob::new(appointment.id, appointment.instructor_id, SyncAction::CreateEvent);
        if let Err(err) = self.outbox.enqueue(&job).await {
            warn!(appointment_id = %appointment.id, error = %err, "failed to enqueue calendar sync job");
        }

        Ok(appointment)
    }

    async fn validate(
        &self,
        request: &BookingRequest,
    ) -> Result<bookslot_domain::AppointmentType> {
        if request.contact.name.trim().is_empty() || request.contact.email.trim().is_empty() {
            return Err(BookslotError::Validation(
                "student name and email are required".to_string(),
            ));
        }
        if request.start >= request.end {
            return Err(BookslotError::Validation("slot start must precede end".to_string()));
        }
        if request.start < self.clock.now() {
            return Err(BookslotError::Validation("slot starts in the past".to_string()));
        }

        let appointment_type =
            self.appointment_types.get(request.appointment_type_id).await.map_err(|err| {
                match err {
                    BookslotError::NotFound(_) => {
                        BookslotError::Validation("unknown appointment type".to_string())
                    }
                    other => other,
                }
            })?;

        if !appointment_type.active {
            return Err(BookslotError::Validation("appointment type is not active".to_string()));
        }
        if appointment_type.instructor_id != request.instructor_id {
            return Err(BookslotError::Validation(
                "appointment type does not belong to this instructor".to_string(),
            ));
        }
        // Exact comparison: a sub-minute remainder must not round away.
        if request.end - request.start != Duration::minutes(appointment_type.duration_minutes) {
            return Err(BookslotError::Validation(format!(
                "slot length does not match appointment type duration of {}min",
                appointment_type.duration_minutes
            )));
        }

        Ok(appointment_type)
    }

    fn instructor_lock(&self, instructor_id: Uuid) -> Arc<Mutex<()>> {
        self.locks.entry(instructor_id).or_default().clone()
    }
}
