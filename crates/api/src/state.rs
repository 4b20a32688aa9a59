//! Shared handler state

use std::sync::Arc;

use bookslot_core::{
    AppointmentRepository, AppointmentTypeRepository, AvailabilityService, BookingService,
    LifecycleService, ManualBlockRepository,
};
use bookslot_infra::integrations::calendar::CalendarOAuthManager;

#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<AvailabilityService>,
    pub booking: Arc<BookingService>,
    pub lifecycle: Arc<LifecycleService>,
    pub oauth: Arc<CalendarOAuthManager>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub appointment_types: Arc<dyn AppointmentTypeRepository>,
    pub blocks: Arc<dyn ManualBlockRepository>,
}
