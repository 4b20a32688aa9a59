//! SQLite-backed implementation of the ManualBlockRepository port.

use async_trait::async_trait;
use bookslot_core::ManualBlockRepository;
use bookslot_domain::{ManualBlock, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Row, ToSql};
use tracing::instrument;
use uuid::Uuid;

use super::{column_ts, column_uuid, db_error, DatabaseManager};

pub struct SqliteManualBlockRepository {
    db: DatabaseManager,
}

impl SqliteManualBlockRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ManualBlock> {
    Ok(ManualBlock {
        id: column_uuid(row, 0)?,
        instructor_id: column_uuid(row, 1)?,
        start: column_ts(row, 2)?,
        end: column_ts(row, 3)?,
        reason: row.get(4)?,
        created_at: column_ts(row, 5)?,
    })
}

#[async_trait]
impl ManualBlockRepository for SqliteManualBlockRepository {
    #[instrument(skip(self, block), fields(block_id = %block.id))]
    async fn insert(&self, block: &ManualBlock) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO manual_blocks (id, instructor_id, start_ts, end_ts, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            [
                &block.id.to_string() as &dyn ToSql,
                &block.instructor_id.to_string(),
                &block.start.timestamp(),
                &block.end.timestamp(),
                &block.reason,
                &block.created_at.timestamp(),
            ]
            .as_ref(),
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, instructor_id: Uuid, block_id: Uuid) -> Result<bool> {
        let conn = self.db.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM manual_blocks WHERE id = ?1 AND instructor_id = ?2",
                [&block_id.to_string(), &instructor_id.to_string()],
            )
            .map_err(db_error)?;
        Ok(deleted > 0)
    }

    async fn find_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ManualBlock>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, instructor_id, start_ts, end_ts, reason, created_at
                 FROM manual_blocks
                 WHERE instructor_id = ?1 AND start_ts < ?2 AND end_ts > ?3
                 ORDER BY start_ts",
            )
            .map_err(db_error)?;

        let rows = stmt
            .query_map(
                [
                    &instructor_id.to_string() as &dyn ToSql,
                    &end.timestamp(),
                    &start.timestamp(),
                ]
                .as_ref(),
                map_row,
            )
            .map_err(db_error)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
    }
}
