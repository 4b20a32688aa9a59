//! SQLite-backed implementation of the CredentialStore port.

use async_trait::async_trait;
use bookslot_core::CredentialStore;
use bookslot_domain::{BookslotError, CalendarCredential, Result};
use chrono::Utc;
use rusqlite::{Row, ToSql};
use tracing::instrument;
use uuid::Uuid;

use super::{column_ts, column_uuid, db_error, DatabaseManager};

pub struct SqliteCredentialStore {
    db: DatabaseManager,
}

impl SqliteCredentialStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CalendarCredential> {
    Ok(CalendarCredential {
        instructor_id: column_uuid(row, 0)?,
        access_token: row.get(1)?,
        refresh_token: row.get(2)?,
        expires_at: column_ts(row, 3)?,
        calendar_id: row.get(4)?,
        connected_at: column_ts(row, 5)?,
        updated_at: column_ts(row, 6)?,
    })
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self, instructor_id: Uuid) -> Result<Option<CalendarCredential>> {
        let conn = self.db.conn()?;
        let result = conn.query_row(
            "SELECT instructor_id, access_token, refresh_token, expires_at,
                    calendar_id, connected_at, updated_at
             FROM calendar_credentials WHERE instructor_id = ?1",
            [&instructor_id.to_string()],
            map_row,
        );

        match result {
            Ok(credential) => Ok(Some(credential)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    #[instrument(skip(self, credential), fields(instructor_id = %credential.instructor_id))]
    async fn upsert(&self, credential: &CalendarCredential) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO calendar_credentials (
                instructor_id, access_token, refresh_token, expires_at,
                calendar_id, connected_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(instructor_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                calendar_id = COALESCE(excluded.calendar_id, calendar_credentials.calendar_id),
                updated_at = excluded.updated_at",
            [
                &credential.instructor_id.to_string() as &dyn ToSql,
                &credential.access_token,
                &credential.refresh_token,
                &credential.expires_at.timestamp(),
                &credential.calendar_id,
                &credential.connected_at.timestamp(),
                &credential.updated_at.timestamp(),
            ]
            .as_ref(),
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, instructor_id: Uuid) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "DELETE FROM calendar_credentials WHERE instructor_id = ?1",
            [&instructor_id.to_string()],
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn set_calendar_id(&self, instructor_id: Uuid, calendar_id: &str) -> Result<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE calendar_credentials
                 SET calendar_id = ?1, updated_at = ?2
                 WHERE instructor_id = ?3",
                [
                    &calendar_id as &dyn ToSql,
                    &Utc::now().timestamp(),
                    &instructor_id.to_string(),
                ]
                .as_ref(),
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(BookslotError::NotFound(format!(
                "no calendar connection for instructor {instructor_id}"
            )));
        }
        Ok(())
    }
}
