//! OAuth connection lifecycle for instructor calendars
//!
//! Builds the provider authorization URL with a signed anti-forgery state
//! token, exchanges callback codes for tokens, refreshes access tokens before
//! expiry and persists everything through the `CredentialStore` port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use bookslot_core::CredentialStore;
use bookslot_domain::config::CalendarConfig;
use bookslot_domain::constants::{PROVIDER_TIMEOUT_SECONDS, TOKEN_REFRESH_THRESHOLD_SECONDS};
use bookslot_domain::{BookslotError, CalendarCredential, CalendarStatus, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::state_token::StateTokenSigner;
use super::types::TokenResponse;

const CALENDAR_SCOPES: &str = "https://www.googleapis.com/auth/calendar.events \
                               https://www.googleapis.com/auth/calendar.readonly";

/// Server-side OAuth manager for the external calendar provider.
pub struct CalendarOAuthManager {
    config: CalendarConfig,
    signer: StateTokenSigner,
    store: Arc<dyn CredentialStore>,
    http: reqwest::Client,
    /// State tokens already redeemed, so a replayed callback is rejected.
    /// Entries older than the token TTL are pruned on insert.
    consumed_states: StdMutex<HashMap<String, DateTime<Utc>>>,
}

impl CalendarOAuthManager {
    pub fn new(config: CalendarConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let signer = StateTokenSigner::new(&config.state_secret);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| BookslotError::Internal(format!("http client init: {e}")))?;

        Ok(Self { config, signer, store, http, consumed_states: StdMutex::new(HashMap::new()) })
    }

    /// Build the provider authorization URL for one instructor.
    pub fn authorization_url(&self, instructor_id: Uuid) -> Result<String> {
        let state = self.signer.issue(instructor_id, Utc::now())?;

        let mut url = Url::parse(&self.config.auth_base_url)
            .and_then(|u| u.join("o/oauth2/v2/auth"))
            .map_err(|e| BookslotError::Config(format!("invalid auth_base_url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", CALENDAR_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state);

        Ok(url.into())
    }

    /// Validate the callback state, exchange the code and persist the
    /// credential. Returns the instructor the connection belongs to.
    #[instrument(skip(self, code, state))]
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<Uuid> {
        let now = Utc::now();
        let instructor_id = self.signer.verify(state, now)?;
        self.consume_state(state, now)?;

        let token = self.exchange_code(code).await?;
        let refresh_token = token.refresh_token.ok_or_else(|| {
            BookslotError::Provider("token exchange returned no refresh token".to_string())
        })?;

        let credential = CalendarCredential {
            instructor_id,
            access_token: token.access_token,
            refresh_token,
            expires_at: now + ChronoDuration::seconds(token.expires_in),
            calendar_id: None,
            connected_at: now,
            updated_at: now,
        };
        self.store.upsert(&credential).await?;

        info!(instructor_id = %instructor_id, "calendar connected");
        Ok(instructor_id)
    }

    /// Stored credential with a guaranteed-fresh access token, or `None`
    /// when not connected. The access token is refreshed first when it
    /// expires within the refresh threshold.
    pub async fn fresh_credential(&self, instructor_id: Uuid) -> Result<Option<CalendarCredential>> {
        let Some(credential) = self.store.get(instructor_id).await? else {
            return Ok(None);
        };

        if !credential.needs_refresh(Utc::now(), TOKEN_REFRESH_THRESHOLD_SECONDS) {
            return Ok(Some(credential));
        }

        self.refresh(credential).await.map(Some)
    }

    /// Remove the stored credential. Idempotent.
    pub async fn disconnect(&self, instructor_id: Uuid) -> Result<()> {
        self.store.delete(instructor_id).await?;
        info!(instructor_id = %instructor_id, "calendar disconnected");
        Ok(())
    }

    /// Select which provider calendar mirrored events are written to.
    pub async fn set_calendar_id(&self, instructor_id: Uuid, calendar_id: &str) -> Result<()> {
        if calendar_id.trim().is_empty() {
            return Err(BookslotError::Validation("calendar_id must not be empty".to_string()));
        }
        self.store.set_calendar_id(instructor_id, calendar_id.trim()).await
    }

    pub async fn status(&self, instructor_id: Uuid) -> Result<CalendarStatus> {
        let credential = self.store.get(instructor_id).await?;
        Ok(CalendarStatus {
            configured: credential.as_ref().is_some_and(|c| c.calendar_id.is_some()),
            authorized: credential.is_some(),
            calendar_id: credential.and_then(|c| c.calendar_id),
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    /// Refresh the access token in place. On provider failure the stored
    /// credential is left untouched so the instructor can reconnect.
    async fn refresh(&self, credential: CalendarCredential) -> Result<CalendarCredential> {
        let token = self
            .token_request(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", credential.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await
            .inspect_err(|e| {
                warn!(instructor_id = %credential.instructor_id, error = %e, "token refresh failed");
            })?;

        let now = Utc::now();
        let updated = CalendarCredential {
            access_token: token.access_token,
            // Providers may rotate the refresh token on refresh.
            refresh_token: token.refresh_token.unwrap_or(credential.refresh_token),
            expires_at: now + ChronoDuration::seconds(token.expires_in),
            updated_at: now,
            ..credential
        };
        self.store.upsert(&updated).await?;
        Ok(updated)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = Url::parse(&self.config.auth_base_url)
            .and_then(|u| u.join("token"))
            .map_err(|e| BookslotError::Config(format!("invalid auth_base_url: {e}")))?;

        let response = self
            .http
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| BookslotError::Provider(format!("token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BookslotError::Provider(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| BookslotError::Provider(format!("malformed token response: {e}")))
    }

    fn consume_state(&self, state: &str, now: DateTime<Utc>) -> Result<()> {
        let mut consumed = self
            .consumed_states
            .lock()
            .map_err(|_| BookslotError::Internal("consumed state set poisoned".to_string()))?;

        let ttl = ChronoDuration::seconds(self.signer.ttl_seconds());
        consumed.retain(|_, seen_at| now - *seen_at <= ttl);

        if consumed.insert(state.to_string(), now).is_some() {
            return Err(BookslotError::Authorization("state token already used".to_string()));
        }
        Ok(())
    }
}
