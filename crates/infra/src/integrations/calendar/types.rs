//! Wire types for the calendar provider REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Event resource payload (Google Calendar shape).
#[derive(Debug, Serialize)]
pub struct EventRequest {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EventResponse {
    pub id: String,
}

/// free/busy query request.
#[derive(Debug, Serialize)]
pub struct FreeBusyRequest {
    #[serde(rename = "timeMin")]
    pub time_min: DateTime<Utc>,
    #[serde(rename = "timeMax")]
    pub time_max: DateTime<Utc>,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    pub calendars: std::collections::HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<FreeBusyWindow>,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
