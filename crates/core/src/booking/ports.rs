//! Port interfaces for appointment persistence

use async_trait::async_trait;
use bookslot_domain::{Appointment, AppointmentStatus, AppointmentType, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Store of appointments. Insertion happens only through the booking
/// coordinator; status changes only through the lifecycle service.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Appointment>;

    /// Active appointments (pending or confirmed) intersecting the range.
    async fn find_active_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<()>;

    /// Record (or clear) the id of the mirrored external event.
    async fn set_external_event_id(&self, id: Uuid, event_id: Option<&str>) -> Result<()>;
}

/// Read access to the appointment type catalog.
#[async_trait]
pub trait AppointmentTypeRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<AppointmentType>;
}
