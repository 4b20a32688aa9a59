//! free/busy view of the instructor's external calendar

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookslot_core::ExternalBusySource;
use bookslot_domain::constants::PROVIDER_TIMEOUT_SECONDS;
use bookslot_domain::{BookslotError, BusyInterval, Result};
use chrono::{DateTime, Utc};
use tracing::{instrument, warn};
use url::Url;
use uuid::Uuid;

use super::oauth::CalendarOAuthManager;
use super::types::{FreeBusyItem, FreeBusyRequest, FreeBusyResponse};

/// Busy intervals from the provider free/busy endpoint.
///
/// Any failure degrades to an empty busy set so availability stays
/// computable from internal data alone.
pub struct ExternalCalendarBusySource {
    oauth: Arc<CalendarOAuthManager>,
    api_base_url: String,
    http: reqwest::Client,
}

impl ExternalCalendarBusySource {
    pub fn new(oauth: Arc<CalendarOAuthManager>, api_base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| BookslotError::Internal(format!("http client init: {e}")))?;
        Ok(Self { oauth, api_base_url, http })
    }

    async fn fetch(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>> {
        let Some(credential) = self.oauth.fresh_credential(instructor_id).await? else {
            return Ok(Vec::new());
        };
        let Some(calendar_id) = credential.calendar_id.clone() else {
            return Ok(Vec::new());
        };

        let url = Url::parse(&self.api_base_url)
            .and_then(|u| u.join("freeBusy"))
            .map_err(|e| BookslotError::Config(format!("invalid api_base_url: {e}")))?;

        let request = FreeBusyRequest {
            time_min: start,
            time_max: end,
            items: vec![FreeBusyItem { id: calendar_id.clone() }],
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| BookslotError::Provider(format!("freeBusy request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(BookslotError::Provider(format!("freeBusy returned {status}")));
        }

        let body: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| BookslotError::Provider(format!("malformed freeBusy response: {e}")))?;

        let windows = body.calendars.get(&calendar_id).map(|c| c.busy.as_slice()).unwrap_or(&[]);
        Ok(windows
            .iter()
            .map(|w| BusyInterval { start: w.start, end: w.end })
            .collect())
    }
}

#[async_trait]
impl ExternalBusySource for ExternalCalendarBusySource {
    #[instrument(skip(self))]
    async fn busy_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<BusyInterval> {
        match self.fetch(instructor_id, start, end).await {
            Ok(busy) => busy,
            Err(e) => {
                warn!(instructor_id = %instructor_id, error = %e, "external busy lookup degraded to empty");
                Vec::new()
            }
        }
    }
}
