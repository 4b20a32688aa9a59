//! SQLite persistence layer

mod appointment_repository;
mod appointment_type_repository;
mod credential_repository;
mod manager;
mod manual_block_repository;
mod outbox_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use appointment_type_repository::SqliteAppointmentTypeRepository;
pub use credential_repository::SqliteCredentialStore;
pub use manager::DatabaseManager;
pub use manual_block_repository::SqliteManualBlockRepository;
pub use outbox_repository::SqliteOutboxRepository;

use bookslot_domain::BookslotError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

pub(crate) fn pool_error(e: impl std::fmt::Display) -> BookslotError {
    BookslotError::Database(format!("connection pool error: {e}"))
}

pub(crate) fn db_error(e: rusqlite::Error) -> BookslotError {
    BookslotError::Database(e.to_string())
}

/// Read a TEXT column as a Uuid inside a row-mapping closure.
pub(crate) fn column_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// Read an INTEGER epoch-seconds column as a UTC timestamp.
pub(crate) fn column_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp(raw, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {raw} out of range").into(),
        )
    })
}
