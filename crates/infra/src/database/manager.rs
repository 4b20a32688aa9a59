//! Connection pool and embedded schema management

use bookslot_domain::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use super::pool_error;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS appointment_types (
    id                TEXT PRIMARY KEY,
    instructor_id     TEXT NOT NULL,
    title             TEXT NOT NULL,
    duration_minutes  INTEGER NOT NULL CHECK (duration_minutes > 0),
    price_cents       INTEGER NOT NULL,
    requires_approval INTEGER NOT NULL,
    active            INTEGER NOT NULL,
    created_at        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS appointments (
    id                  TEXT PRIMARY KEY,
    instructor_id       TEXT NOT NULL,
    student_id          TEXT NOT NULL,
    appointment_type_id TEXT NOT NULL REFERENCES appointment_types(id),
    start_ts            INTEGER NOT NULL,
    end_ts              INTEGER NOT NULL,
    status              TEXT NOT NULL,
    external_event_id   TEXT,
    student_name        TEXT NOT NULL,
    student_email       TEXT NOT NULL,
    created_at          INTEGER NOT NULL,
    updated_at          INTEGER NOT NULL,
    CHECK (start_ts < end_ts)
);

CREATE INDEX IF NOT EXISTS idx_appointments_instructor_window
    ON appointments(instructor_id, start_ts, end_ts);
CREATE INDEX IF NOT EXISTS idx_appointments_status
    ON appointments(status);

CREATE TABLE IF NOT EXISTS manual_blocks (
    id            TEXT PRIMARY KEY,
    instructor_id TEXT NOT NULL,
    start_ts      INTEGER NOT NULL,
    end_ts        INTEGER NOT NULL,
    reason        TEXT,
    created_at    INTEGER NOT NULL,
    CHECK (start_ts < end_ts)
);

CREATE INDEX IF NOT EXISTS idx_manual_blocks_instructor_window
    ON manual_blocks(instructor_id, start_ts, end_ts);

CREATE TABLE IF NOT EXISTS calendar_credentials (
    instructor_id TEXT PRIMARY KEY,
    access_token  TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at    INTEGER NOT NULL,
    calendar_id   TEXT,
    connected_at  INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sync_outbox (
    id             TEXT PRIMARY KEY,
    appointment_id TEXT NOT NULL,
    instructor_id  TEXT NOT NULL,
    action         TEXT NOT NULL,
    status         TEXT NOT NULL,
    attempts       INTEGER NOT NULL DEFAULT 0,
    retry_after    INTEGER,
    last_error     TEXT,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sync_outbox_pending
    ON sync_outbox(status, retry_after, created_at);
"#;

/// Owns the SQLite connection pool and applies the schema on startup.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: Pool<SqliteConnectionManager>,
}

impl DatabaseManager {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn new(path: &str, pool_size: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        });

        let pool = Pool::builder().max_size(pool_size).build(manager).map_err(pool_error)?;

        let db = Self { pool };
        db.apply_schema()?;
        info!(path, pool_size, "database ready");
        Ok(db)
    }

    pub fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(pool_error)
    }

    fn apply_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA).map_err(super::db_error)
    }
}
