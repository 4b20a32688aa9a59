//! In-memory port implementations shared by the core service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bookslot_domain::{
    Appointment, AppointmentStatus, AppointmentType, BookslotError, BusyInterval, ManualBlock,
    Result, SyncJob,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::availability::ports::{ExternalBusySource, ManualBlockRepository};
use crate::booking::ports::{AppointmentRepository, AppointmentTypeRepository};
use crate::clock::Clock;
use crate::sync::ports::OutboxQueue;

#[derive(Default)]
pub struct InMemoryAppointments {
    pub rows: Mutex<Vec<Appointment>>,
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointments {
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        self.rows.lock().expect("rows poisoned").push(appointment.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Appointment> {
        self.rows
            .lock()
            .expect("rows poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| BookslotError::NotFound(format!("appointment {id}")))
    }

    async fn find_active_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .rows
            .lock()
            .expect("rows poisoned")
            .iter()
            .filter(|a| {
                a.instructor_id == instructor_id
                    && a.status.is_active()
                    && a.start < end
                    && start < a.end
            })
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<()> {
        let mut rows = self.rows.lock().expect("rows poisoned");
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BookslotError::NotFound(format!("appointment {id}")))?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn set_external_event_id(&self, id: Uuid, event_id: Option<&str>) -> Result<()> {
        let mut rows = self.rows.lock().expect("rows poisoned");
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BookslotError::NotFound(format!("appointment {id}")))?;
        row.external_event_id = event_id.map(str::to_string);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBlocks {
    pub rows: Mutex<Vec<ManualBlock>>,
}

#[async_trait]
impl ManualBlockRepository for InMemoryBlocks {
    async fn insert(&self, block: &ManualBlock) -> Result<()> {
        self.rows.lock().expect("rows poisoned").push(block.clone());
        Ok(())
    }

    async fn delete(&self, instructor_id: Uuid, block_id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().expect("rows poisoned");
        let before = rows.len();
        rows.retain(|b| !(b.id == block_id && b.instructor_id == instructor_id));
        Ok(rows.len() < before)
    }

    async fn find_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ManualBlock>> {
        Ok(self
            .rows
            .lock()
            .expect("rows poisoned")
            .iter()
            .filter(|b| b.instructor_id == instructor_id && b.start < end && start < b.end)
            .cloned()
            .collect())
    }
}

/// External busy source backed by a fixed interval list.
#[derive(Default)]
pub struct StaticExternalBusy {
    pub intervals: Mutex<Vec<BusyInterval>>,
}

#[async_trait]
impl ExternalBusySource for StaticExternalBusy {
    async fn busy_between(
        &self,
        _instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<BusyInterval> {
        self.intervals
            .lock()
            .expect("intervals poisoned")
            .iter()
            .filter(|i| i.overlaps(start, end))
            .copied()
            .collect()
    }
}

pub struct InMemoryTypes {
    pub rows: Vec<AppointmentType>,
}

#[async_trait]
impl AppointmentTypeRepository for InMemoryTypes {
    async fn get(&self, id: Uuid) -> Result<AppointmentType> {
        self.rows
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| BookslotError::NotFound(format!("appointment type {id}")))
    }
}

/// Outbox double that records enqueued jobs, optionally failing every
/// enqueue to exercise the non-fatal path.
#[derive(Default)]
pub struct RecordingOutbox {
    pub jobs: Mutex<Vec<SyncJob>>,
    pub fail_enqueue: bool,
}

#[async_trait]
impl OutboxQueue for RecordingOutbox {
    async fn enqueue(&self, job: &SyncJob) -> Result<()> {
        if self.fail_enqueue {
            return Err(BookslotError::Database("outbox unavailable".to_string()));
        }
        self.jobs.lock().expect("jobs poisoned").push(job.clone());
        Ok(())
    }

    async fn pending_ready(&self, _now: DateTime<Utc>, _limit: usize) -> Result<Vec<SyncJob>> {
        Ok(self.jobs.lock().expect("jobs poisoned").clone())
    }

    async fn mark_sent(&self, _job_id: Uuid) -> Result<()> {
        Ok(())
    }

    async fn mark_retry(
        &self,
        _job_id: Uuid,
        _attempts: u32,
        _retry_after: DateTime<Utc>,
        _error: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn mark_failed(&self, _job_id: Uuid, _error: &str) -> Result<()> {
        Ok(())
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn appointment_type(instructor_id: Uuid, duration_minutes: i64) -> AppointmentType {
    AppointmentType {
        id: Uuid::now_v7(),
        instructor_id,
        title: "Intro lesson".to_string(),
        duration_minutes,
        price_cents: 5000,
        requires_approval: false,
        active: true,
        created_at: Utc::now(),
    }
}

pub fn appointment(
    instructor_id: Uuid,
    type_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id: Uuid::now_v7(),
        instructor_id,
        student_id: Uuid::now_v7(),
        appointment_type_id: type_id,
        start,
        end,
        status,
        external_event_id: None,
        student_name: "Test Student".to_string(),
        student_email: "student@example.com".to_string(),
        created_at: start,
        updated_at: start,
    }
}

pub fn manual_block(
    instructor_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ManualBlock {
    ManualBlock {
        id: Uuid::now_v7(),
        instructor_id,
        start,
        end,
        reason: None,
        created_at: start,
    }
}
