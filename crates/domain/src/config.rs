//! Configuration structures

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::{BookslotError, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub booking: BookingConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// Working-hours window and slot stepping for availability computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Start of the daily working-hours window, e.g. "09:00".
    pub workday_start: String,
    /// End of the daily working-hours window, e.g. "17:00".
    pub workday_end: String,
    /// IANA timezone the working-hours window is expressed in.
    pub timezone: String,
    /// Step between candidate slot starts; `None` means the requested
    /// appointment duration.
    pub slot_step_minutes: Option<i64>,
}

/// External calendar provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base URL of the provider REST API; overridable for tests.
    pub api_base_url: String,
    /// Base URL of the provider OAuth endpoints.
    pub auth_base_url: String,
    /// Secret used to sign OAuth state tokens.
    pub state_secret: String,
}

impl BookingConfig {
    /// Parse the configured workday bounds, validating `start < end`.
    pub fn workday_window(&self) -> Result<(NaiveTime, NaiveTime)> {
        let start = NaiveTime::parse_from_str(&self.workday_start, "%H:%M")
            .map_err(|e| BookslotError::Config(format!("invalid workday_start: {e}")))?;
        let end = NaiveTime::parse_from_str(&self.workday_end, "%H:%M")
            .map_err(|e| BookslotError::Config(format!("invalid workday_end: {e}")))?;
        if start >= end {
            return Err(BookslotError::Config(
                "workday_start must be before workday_end".to_string(),
            ));
        }
        Ok((start, end))
    }

    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| BookslotError::Config(format!("invalid timezone: {}", self.timezone)))
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            workday_start: "09:00".to_string(),
            workday_end: "17:00".to_string(),
            timezone: "UTC".to_string(),
            slot_step_minutes: None,
        }
    }
}
