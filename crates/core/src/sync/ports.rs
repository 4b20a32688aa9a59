//! Port interfaces for calendar synchronization

use async_trait::async_trait;
use bookslot_domain::{Appointment, CalendarCredential, Result, SyncJob};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persistent queue of calendar mirror operations.
#[async_trait]
pub trait OutboxQueue: Send + Sync {
    async fn enqueue(&self, job: &SyncJob) -> Result<()>;

    /// Pending jobs whose `retry_after` has lapsed, oldest first.
    async fn pending_ready(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<SyncJob>>;

    async fn mark_sent(&self, job_id: Uuid) -> Result<()>;

    /// Schedule another attempt after a backoff delay.
    async fn mark_retry(
        &self,
        job_id: Uuid,
        attempts: u32,
        retry_after: DateTime<Utc>,
        error: &str,
    ) -> Result<()>;

    /// Give up on the job permanently.
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<()>;
}

/// Storage for per-instructor OAuth credentials. Mutated only by the
/// calendar sync adapter.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, instructor_id: Uuid) -> Result<Option<CalendarCredential>>;

    async fn upsert(&self, credential: &CalendarCredential) -> Result<()>;

    async fn delete(&self, instructor_id: Uuid) -> Result<()>;

    async fn set_calendar_id(&self, instructor_id: Uuid, calendar_id: &str) -> Result<()>;
}

/// Mirrored-event CRUD against the external provider.
///
/// Every method is independently fault-tolerant at the call site: a
/// `Provider` error never rolls back or blocks an appointment state change.
#[async_trait]
pub trait CalendarEventPort: Send + Sync {
    /// Create the mirrored event, returning the provider event id.
    ///
    /// `Ok(None)` means the instructor has no usable calendar connection;
    /// the operation is a deliberate no-op, not a failure.
    async fn create_event(&self, appointment: &Appointment) -> Result<Option<String>>;

    async fn update_event(&self, appointment: &Appointment, event_id: &str) -> Result<()>;

    async fn delete_event(&self, instructor_id: Uuid, event_id: &str) -> Result<()>;
}
