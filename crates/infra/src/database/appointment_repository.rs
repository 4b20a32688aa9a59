//! SQLite-backed implementation of the AppointmentRepository port.

use async_trait::async_trait;
use bookslot_core::AppointmentRepository;
use bookslot_domain::{Appointment, AppointmentStatus, BookslotError, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, ToSql};
use tracing::instrument;
use uuid::Uuid;

use super::{column_ts, column_uuid, db_error, DatabaseManager};

pub struct SqliteAppointmentRepository {
    db: DatabaseManager,
}

impl SqliteAppointmentRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let status_raw: String = row.get(6)?;
    let status = AppointmentStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown appointment status '{status_raw}'").into(),
        )
    })?;

    Ok(Appointment {
        id: column_uuid(row, 0)?,
        instructor_id: column_uuid(row, 1)?,
        student_id: column_uuid(row, 2)?,
        appointment_type_id: column_uuid(row, 3)?,
        start: column_ts(row, 4)?,
        end: column_ts(row, 5)?,
        status,
        external_event_id: row.get(7)?,
        student_name: row.get(8)?,
        student_email: row.get(9)?,
        created_at: column_ts(row, 10)?,
        updated_at: column_ts(row, 11)?,
    })
}

const SELECT_COLUMNS: &str = "id, instructor_id, student_id, appointment_type_id, \
     start_ts, end_ts, status, external_event_id, student_name, student_email, \
     created_at, updated_at";

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO appointments (
                id, instructor_id, student_id, appointment_type_id,
                start_ts, end_ts, status, external_event_id,
                student_name, student_email, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            [
                &appointment.id.to_string() as &dyn ToSql,
                &appointment.instructor_id.to_string(),
                &appointment.student_id.to_string(),
                &appointment.appointment_type_id.to_string(),
                &appointment.start.timestamp(),
                &appointment.end.timestamp(),
                &appointment.status.as_str(),
                &appointment.external_event_id,
                &appointment.student_name,
                &appointment.student_email,
                &appointment.created_at.timestamp(),
                &appointment.updated_at.timestamp(),
            ]
            .as_ref(),
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Appointment> {
        let conn = self.db.conn()?;
        let result = conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE id = ?1"),
            [&id.to_string()],
            map_row,
        );

        match result {
            Ok(appointment) => Ok(appointment),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(BookslotError::NotFound(format!("appointment {id}")))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    #[instrument(skip(self), fields(instructor_id = %instructor_id))]
    async fn find_active_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM appointments
                 WHERE instructor_id = ?1
                   AND status IN ('pending', 'confirmed')
                   AND start_ts < ?2 AND end_ts > ?3
                 ORDER BY start_ts"
            ))
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

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
                [
                    &status.as_str() as &dyn ToSql,
                    &Utc::now().timestamp(),
                    &id.to_string(),
                ]
                .as_ref(),
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(BookslotError::NotFound(format!("appointment {id}")));
        }
        Ok(())
    }

    async fn set_external_event_id(&self, id: Uuid, event_id: Option<&str>) -> Result<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE appointments SET external_event_id = ?1, updated_at = ?2 WHERE id = ?3",
                [&event_id as &dyn ToSql, &Utc::now().timestamp(), &id.to_string()].as_ref(),
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(BookslotError::NotFound(format!("appointment {id}")));
        }
        Ok(())
    }
}
