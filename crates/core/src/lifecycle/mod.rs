//! Appointment lifecycle state machine
//!
//! Governs status transitions after creation. Transitions that change
//! whether an appointment is active enqueue the matching calendar mirror
//! operation, best-effort.

use std::sync::Arc;

use bookslot_domain::{
    Appointment, AppointmentStatus, BookslotError, Result, SyncAction, SyncJob,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::booking::ports::AppointmentRepository;
use crate::sync::ports::OutboxQueue;

/// Whether `from → to` is a permitted transition.
///
/// `pending → {confirmed, rejected, cancelled}`,
/// `confirmed → {cancelled, completed}`; terminal states admit nothing.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Rejected) | (Pending, Cancelled)
            | (Confirmed, Cancelled)
            | (Confirmed, Completed)
    )
}

/// Applies validated status transitions and queues calendar side effects.
pub struct LifecycleService {
    appointments: Arc<dyn AppointmentRepository>,
    outbox: Arc<dyn OutboxQueue>,
}

impl LifecycleService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, outbox: Arc<dyn OutboxQueue>) -> Self {
        Self { appointments, outbox }
    }

    /// Move the appointment to `target`, enforcing the transition table.
    #[instrument(skip(self), fields(appointment_id = %appointment_id))]
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut appointment = self.appointments.get(appointment_id).await?;
        let from = appointment.status;

        if !can_transition(from, target) {
            return Err(BookslotError::Validation(format!(
                "transition {} -> {} is not permitted",
                from.as_str(),
                target.as_str()
            )));
        }

        self.appointments.update_status(appointment_id, target).await?;
        appointment.status = target;

        info!(from = from.as_str(), to = target.as_str(), "appointment transitioned");

        if let Some(action) = sync_action_for(from, target) {
            let job = SyncJob::new(appointment.id, appointment.instructor_id, action);
            if let Err(err) = self.outbox.enqueue(&job).await {
                warn!(
                    appointment_id = %appointment.id,
                    error = %err,
                    "failed to enqueue calendar sync job for transition"
                );
            }
        }

        Ok(appointment)
    }
}

/// Calendar mirror operation implied by a transition, if any.
///
/// Leaving the active set deletes the mirrored event; an approval keeps the
/// event but refreshes it so the provider reflects the confirmed status.
fn sync_action_for(from: AppointmentStatus, to: AppointmentStatus) -> Option<SyncAction> {
    if from.is_active() && !to.is_active() {
        return Some(SyncAction::DeleteEvent);
    }
    if from == AppointmentStatus::Pending && to == AppointmentStatus::Confirmed {
        return Some(SyncAction::UpdateEvent);
    }
    None
}
