//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bookslot_core::Clock;
use bookslot_domain::{
    Appointment, AppointmentStatus, AppointmentType, BusyInterval, CalendarCredential, ManualBlock,
};
use bookslot_infra::database::DatabaseManager;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: DatabaseManager,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");
        let path = db_path.to_str().expect("temp path should be utf-8");

        let manager = DatabaseManager::new(path, 4).expect("database manager should open");
        Self { manager, _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// External busy source that always reports a free calendar.
#[derive(Default)]
pub struct NoExternalBusy;

#[async_trait::async_trait]
impl bookslot_core::ExternalBusySource for NoExternalBusy {
    async fn busy_between(
        &self,
        _instructor_id: Uuid,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Vec<BusyInterval> {
        Vec::new()
    }
}

pub fn fixed_clock(at: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixedClock(at))
}

pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}

pub fn appointment_type(instructor_id: Uuid, duration_minutes: i64) -> AppointmentType {
    AppointmentType {
        id: Uuid::now_v7(),
        instructor_id,
        title: "Lesson".to_string(),
        duration_minutes,
        price_cents: 5000,
        requires_approval: false,
        active: true,
        created_at: at(0, 0),
    }
}

pub fn appointment(
    instructor_id: Uuid,
    appointment_type_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id: Uuid::now_v7(),
        instructor_id,
        student_id: Uuid::now_v7(),
        appointment_type_id,
        start,
        end,
        status,
        external_event_id: None,
        student_name: "Ada Lovelace".to_string(),
        student_email: "ada@example.com".to_string(),
        created_at: at(0, 0),
        updated_at: at(0, 0),
    }
}

pub fn manual_block(instructor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> ManualBlock {
    ManualBlock {
        id: Uuid::now_v7(),
        instructor_id,
        start,
        end,
        reason: Some("out of office".to_string()),
        created_at: at(0, 0),
    }
}

pub fn credential(instructor_id: Uuid, expires_at: DateTime<Utc>) -> CalendarCredential {
    CalendarCredential {
        instructor_id,
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        expires_at,
        calendar_id: Some("primary".to_string()),
        connected_at: at(0, 0),
        updated_at: at(0, 0),
    }
}
