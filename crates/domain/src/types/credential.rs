//! External calendar credential model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OAuth tokens for one instructor's external calendar connection.
///
/// Created on the first successful code exchange, refreshed in place when the
/// access token nears expiry, deleted on explicit disconnect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarCredential {
    pub instructor_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    /// Target calendar in the provider account; `None` until configured.
    pub calendar_id: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarCredential {
    /// Whether the access token is expired or expires within `threshold`
    /// seconds.
    pub fn needs_refresh(&self, now: DateTime<Utc>, threshold_seconds: i64) -> bool {
        self.expires_at - now < chrono::Duration::seconds(threshold_seconds)
    }
}

/// Connection state reported to collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarStatus {
    pub configured: bool,
    pub authorized: bool,
    pub calendar_id: Option<String>,
}
