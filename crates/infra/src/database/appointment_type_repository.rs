//! SQLite-backed implementation of the AppointmentTypeRepository port.

use async_trait::async_trait;
use bookslot_core::AppointmentTypeRepository;
use bookslot_domain::{AppointmentType, BookslotError, Result};
use rusqlite::{Row, ToSql};
use uuid::Uuid;

use super::{column_ts, column_uuid, db_error, DatabaseManager};

pub struct SqliteAppointmentTypeRepository {
    db: DatabaseManager,
}

impl SqliteAppointmentTypeRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Seed helper for admin tooling and tests; catalog CRUD itself lives
    /// outside the booking engine.
    pub fn insert(&self, appointment_type: &AppointmentType) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO appointment_types (
                id, instructor_id, title, duration_minutes, price_cents,
                requires_approval, active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            [
                &appointment_type.id.to_string() as &dyn ToSql,
                &appointment_type.instructor_id.to_string(),
                &appointment_type.title,
                &appointment_type.duration_minutes,
                &appointment_type.price_cents,
                &appointment_type.requires_approval,
                &appointment_type.active,
                &appointment_type.created_at.timestamp(),
            ]
            .as_ref(),
        )
        .map_err(db_error)?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AppointmentType> {
    Ok(AppointmentType {
        id: column_uuid(row, 0)?,
        instructor_id: column_uuid(row, 1)?,
        title: row.get(2)?,
        duration_minutes: row.get(3)?,
        price_cents: row.get(4)?,
        requires_approval: row.get(5)?,
        active: row.get(6)?,
        created_at: column_ts(row, 7)?,
    })
}

#[async_trait]
impl AppointmentTypeRepository for SqliteAppointmentTypeRepository {
    async fn get(&self, id: Uuid) -> Result<AppointmentType> {
        let conn = self.db.conn()?;
        let result = conn.query_row(
            "SELECT id, instructor_id, title, duration_minutes, price_cents,
                    requires_approval, active, created_at
             FROM appointment_types WHERE id = ?1",
            [&id.to_string()],
            map_row,
        );

        match result {
            Ok(appointment_type) => Ok(appointment_type),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(BookslotError::NotFound(format!("appointment type {id}")))
            }
            Err(e) => Err(db_error(e)),
        }
    }
}
