//! SQLite-backed implementation of the OutboxQueue port.

use async_trait::async_trait;
use bookslot_core::OutboxQueue;
use bookslot_domain::{BookslotError, Result, SyncAction, SyncJob, SyncJobStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, ToSql};
use tracing::instrument;
use uuid::Uuid;

use super::{column_ts, column_uuid, db_error, DatabaseManager};

pub struct SqliteOutboxRepository {
    db: DatabaseManager,
}

impl SqliteOutboxRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SyncJob> {
    let action_raw: String = row.get(3)?;
    let action = SyncAction::parse(&action_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown sync action '{action_raw}'").into(),
        )
    })?;
    let status_raw: String = row.get(4)?;
    let status = SyncJobStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown sync job status '{status_raw}'").into(),
        )
    })?;

    let retry_after = match row.get::<_, Option<i64>>(6)? {
        Some(ts) => Some(
            DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    Type::Integer,
                    format!("timestamp {ts} out of range").into(),
                )
            })?,
        ),
        None => None,
    };

    Ok(SyncJob {
        id: column_uuid(row, 0)?,
        appointment_id: column_uuid(row, 1)?,
        instructor_id: column_uuid(row, 2)?,
        action,
        status,
        attempts: row.get(5)?,
        retry_after,
        last_error: row.get(7)?,
        created_at: column_ts(row, 8)?,
        updated_at: column_ts(row, 9)?,
    })
}

#[async_trait]
impl OutboxQueue for SqliteOutboxRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id, action = job.action.as_str()))]
    async fn enqueue(&self, job: &SyncJob) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO sync_outbox (
                id, appointment_id, instructor_id, action, status,
                attempts, retry_after, last_error, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            [
                &job.id.to_string() as &dyn ToSql,
                &job.appointment_id.to_string(),
                &job.instructor_id.to_string(),
                &job.action.as_str(),
                &job.status.as_str(),
                &job.attempts,
                &job.retry_after.map(|t| t.timestamp()),
                &job.last_error,
                &job.created_at.timestamp(),
                &job.updated_at.timestamp(),
            ]
            .as_ref(),
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn pending_ready(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<SyncJob>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, appointment_id, instructor_id, action, status,
                        attempts, retry_after, last_error, created_at, updated_at
                 FROM sync_outbox
                 WHERE status = 'pending'
                   AND (retry_after IS NULL OR retry_after <= ?1)
                 ORDER BY created_at
                 LIMIT ?2",
            )
            .map_err(db_error)?;

        let rows = stmt
            .query_map(
                [&now.timestamp() as &dyn ToSql, &(limit as i64)].as_ref(),
                map_row,
            )
            .map_err(db_error)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
    }

    async fn mark_sent(&self, job_id: Uuid) -> Result<()> {
        self.update_status(job_id, SyncJobStatus::Sent, None, None)
    }

    async fn mark_retry(
        &self,
        job_id: Uuid,
        attempts: u32,
        retry_after: DateTime<Utc>,
        error: &str,
    ) -> Result<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE sync_outbox
                 SET attempts = ?1, retry_after = ?2, last_error = ?3, updated_at = ?4
                 WHERE id = ?5",
                [
                    &attempts as &dyn ToSql,
                    &retry_after.timestamp(),
                    &error,
                    &Utc::now().timestamp(),
                    &job_id.to_string(),
                ]
                .as_ref(),
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(BookslotError::NotFound(format!("sync job {job_id}")));
        }
        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<()> {
        self.update_status(job_id, SyncJobStatus::Failed, Some(error), None)
    }
}

impl SqliteOutboxRepository {
    fn update_status(
        &self,
        job_id: Uuid,
        status: SyncJobStatus,
        error: Option<&str>,
        retry_after: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE sync_outbox
                 SET status = ?1, last_error = ?2, retry_after = ?3, updated_at = ?4
                 WHERE id = ?5",
                [
                    &status.as_str() as &dyn ToSql,
                    &error,
                    &retry_after.map(|t| t.timestamp()),
                    &Utc::now().timestamp(),
                    &job_id.to_string(),
                ]
                .as_ref(),
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(BookslotError::NotFound(format!("sync job {job_id}")));
        }
        Ok(())
    }
}
