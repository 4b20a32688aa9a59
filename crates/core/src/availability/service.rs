//! Free-slot computation service

use std::sync::Arc;

use bookslot_domain::constants::{BUSY_FETCH_MARGIN_HOURS, MAX_DURATION_MINUTES};
use bookslot_domain::{
    AppointmentType, BookingConfig, BookslotError, BusyInterval, FreeSlot, Result,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::intervals;
use super::ports::{ExternalBusySource, ManualBlockRepository};
use crate::booking::ports::AppointmentRepository;
use crate::clock::Clock;

/// Computes bookable free slots for an instructor.
///
/// Purely a read computation: no side effects, safe to run with unbounded
/// parallelism.
pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentRepository>,
    blocks: Arc<dyn ManualBlockRepository>,
    external: Arc<dyn ExternalBusySource>,
    config: BookingConfig,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        blocks: Arc<dyn ManualBlockRepository>,
        external: Arc<dyn ExternalBusySource>,
        config: BookingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { appointments, blocks, external, config, clock }
    }

    /// Ordered free slots of the appointment type's duration on `date`.
    ///
    /// Every returned slot lies fully inside the configured working-hours
    /// window, is disjoint from all busy intervals, and does not start in
    /// the past.
    #[instrument(skip(self, appointment_type), fields(instructor_id = %instructor_id, %date))]
    pub async fn free_slots(
        &self,
        instructor_id: Uuid,
        date: NaiveDate,
        appointment_type: &AppointmentType,
    ) -> Result<Vec<FreeSlot>> {
        let duration = Duration::minutes(appointment_type.duration_minutes);
        if duration <= Duration::zero()
            || appointment_type.duration_minutes > MAX_DURATION_MINUTES
        {
            return Err(BookslotError::Validation(format!(
                "appointment type {} has an out-of-range duration",
                appointment_type.id
            )));
        }

        let (window_start, window_end) = self.working_window(date)?;
        let fetch_margin = Duration::hours(BUSY_FETCH_MARGIN_HOURS);
        let busy = self
            .busy_between(instructor_id, window_start - fetch_margin, window_end + fetch_margin)
            .await?;

        let step = Duration::minutes(
            self.config.slot_step_minutes.unwrap_or(appointment_type.duration_minutes),
        );
        if step <= Duration::zero() {
            return Err(BookslotError::Config("slot step must be positive".to_string()));
        }

        let now = self.clock.now();
        let mut slots = Vec::new();
        let mut candidate = window_start;
        while candidate + duration <= window_end {
            let slot_end = candidate + duration;
            if candidate >= now && intervals::is_free(&busy, candidate, slot_end) {
                slots.push(FreeSlot { start: candidate, end: slot_end });
            }
            candidate += step;
        }

        debug!(slot_count = slots.len(), busy_count = busy.len(), "computed free slots");
        Ok(slots)
    }

    /// Merged busy intervals for the instructor over the given range, from
    /// all three sources. The external source degrades to an empty set on
    /// failure by contract.
    pub async fn busy_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>> {
        let appointments = self.appointments.find_active_between(instructor_id, start, end).await?;
        let blocks = self.blocks.find_between(instructor_id, start, end).await?;
        let external = self.external.busy_between(instructor_id, start, end).await;

        let mut busy: Vec<BusyInterval> = Vec::with_capacity(
            appointments.len() + blocks.len() + external.len(),
        );
        busy.extend(appointments.iter().map(|a| BusyInterval::new(a.start, a.end)));
        busy.extend(blocks.iter().map(|b| BusyInterval::new(b.start, b.end)));
        busy.extend(external);

        Ok(intervals::merge(busy))
    }

    /// Working-hours window for `date`, resolved in the configured timezone
    /// and returned in UTC.
    fn working_window(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (day_start, day_end) = self.config.workday_window()?;
        let tz = self.config.tz()?;

        let localize = |naive| {
            tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
                BookslotError::Internal(format!("working hours fall into a timezone gap on {date}"))
            })
        };

        let start = localize(date.and_time(day_start))?.with_timezone(&Utc);
        let end = localize(date.and_time(day_end))?.with_timezone(&Utc);
        Ok((start, end))
    }
}
