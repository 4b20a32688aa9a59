//! Provider REST client for mirrored appointment events

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookslot_core::CalendarEventPort;
use bookslot_domain::constants::PROVIDER_TIMEOUT_SECONDS;
use bookslot_domain::{Appointment, BookslotError, CalendarCredential, Result};
use reqwest::StatusCode;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::oauth::CalendarOAuthManager;
use super::types::{EventRequest, EventResponse, EventTime};

/// Calendar event CRUD against the provider REST API.
///
/// Credentials and the target calendar come from the OAuth manager. An
/// instructor without a usable connection makes every operation a no-op.
pub struct CalendarApiClient {
    oauth: Arc<CalendarOAuthManager>,
    api_base_url: String,
    http: reqwest::Client,
}

impl CalendarApiClient {
    pub fn new(oauth: Arc<CalendarOAuthManager>, api_base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| BookslotError::Internal(format!("http client init: {e}")))?;
        Ok(Self { oauth, api_base_url, http })
    }

    /// Fresh credential with a configured target calendar, or `None` when
    /// the instructor has no usable connection.
    async fn connection(&self, instructor_id: Uuid) -> Result<Option<(CalendarCredential, String)>> {
        let Some(credential) = self.oauth.fresh_credential(instructor_id).await? else {
            return Ok(None);
        };
        let Some(calendar_id) = credential.calendar_id.clone() else {
            debug!(instructor_id = %instructor_id, "calendar connected but no target calendar set");
            return Ok(None);
        };
        Ok(Some((credential, calendar_id)))
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .and_then(|u| u.join(&format!("calendars/{calendar_id}/events")))
            .map_err(|e| BookslotError::Config(format!("invalid api_base_url: {e}")))
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .and_then(|u| u.join(&format!("calendars/{calendar_id}/events/{event_id}")))
            .map_err(|e| BookslotError::Config(format!("invalid api_base_url: {e}")))
    }

    fn event_payload(appointment: &Appointment) -> EventRequest {
        EventRequest {
            summary: format!("Appointment with {}", appointment.student_name),
            description: Some(format!(
                "Booked via Bookslot\nStudent: {} <{}>",
                appointment.student_name, appointment.student_email
            )),
            start: EventTime { date_time: appointment.start },
            end: EventTime { date_time: appointment.end },
            status: Some("confirmed".to_string()),
        }
    }

    async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BookslotError::Provider(format!("{context} returned {status}: {body}")))
    }
}

#[async_trait]
impl CalendarEventPort for CalendarApiClient {
    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn create_event(&self, appointment: &Appointment) -> Result<Option<String>> {
        let Some((credential, calendar_id)) = self.connection(appointment.instructor_id).await?
        else {
            return Ok(None);
        };

        let response = self
            .http
            .post(self.events_url(&calendar_id)?)
            .bearer_auth(&credential.access_token)
            .json(&Self::event_payload(appointment))
            .send()
            .await
            .map_err(|e| BookslotError::Provider(format!("event create failed: {e}")))?;

        let event: EventResponse = Self::check_status(response, "event create")
            .await?
            .json()
            .await
            .map_err(|e| BookslotError::Provider(format!("malformed event response: {e}")))?;

        Ok(Some(event.id))
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn update_event(&self, appointment: &Appointment, event_id: &str) -> Result<()> {
        let Some((credential, calendar_id)) = self.connection(appointment.instructor_id).await?
        else {
            return Ok(());
        };

        let response = self
            .http
            .patch(self.event_url(&calendar_id, event_id)?)
            .bearer_auth(&credential.access_token)
            .json(&Self::event_payload(appointment))
            .send()
            .await
            .map_err(|e| BookslotError::Provider(format!("event update failed: {e}")))?;

        // An event deleted out-of-band cannot be updated; nothing to mirror.
        if response.status() == StatusCode::NOT_FOUND || response.status() == StatusCode::GONE {
            debug!(event_id, "mirrored event no longer exists");
            return Ok(());
        }

        Self::check_status(response, "event update").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, instructor_id: Uuid, event_id: &str) -> Result<()> {
        let Some((credential, calendar_id)) = self.connection(instructor_id).await? else {
            return Ok(());
        };

        let response = self
            .http
            .delete(self.event_url(&calendar_id, event_id)?)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| BookslotError::Provider(format!("event delete failed: {e}")))?;

        // Already gone counts as deleted.
        if response.status() == StatusCode::NOT_FOUND || response.status() == StatusCode::GONE {
            return Ok(());
        }

        Self::check_status(response, "event delete").await?;
        Ok(())
    }
}
