//! Signed anti-forgery state tokens for the OAuth flow
//!
//! The state value embeds `{subject, issued_at}`, is MAC'd with a key derived
//! from the server secret, and is rejected on callback when the signature
//! does not verify or the token has outlived its TTL. Verification compares
//! MACs in constant time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bookslot_domain::constants::STATE_TOKEN_TTL_SECONDS;
use bookslot_domain::{BookslotError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const KEY_CONTEXT: &str = "bookslot 2025-01-01 calendar oauth state";

#[derive(Debug, Serialize, Deserialize)]
struct StatePayload {
    sub: Uuid,
    iat: i64,
}

/// Issues and verifies OAuth state tokens.
pub struct StateTokenSigner {
    key: [u8; 32],
    ttl_seconds: i64,
}

impl StateTokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            ttl_seconds: STATE_TOKEN_TTL_SECONDS,
        }
    }

    #[cfg(test)]
    fn with_ttl(secret: &str, ttl_seconds: i64) -> Self {
        Self { ttl_seconds, ..Self::new(secret) }
    }

    /// Produce a `payload.mac` token binding `subject` to `issued_at`.
    pub fn issue(&self, subject: Uuid, issued_at: DateTime<Utc>) -> Result<String> {
        let payload = StatePayload { sub: subject, iat: issued_at.timestamp() };
        let json = serde_json::to_vec(&payload)
            .map_err(|e| BookslotError::Internal(format!("state payload encoding: {e}")))?;
        let encoded = URL_SAFE_NO_PAD.encode(&json);
        let mac = blake3::keyed_hash(&self.key, encoded.as_bytes());
        Ok(format!("{encoded}.{}", mac.to_hex()))
    }

    /// Verify signature and TTL, returning the embedded subject id.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid> {
        let (encoded, mac_hex) = token
            .split_once('.')
            .ok_or_else(|| BookslotError::Authorization("malformed state token".to_string()))?;

        let mut presented = [0u8; 32];
        hex::decode_to_slice(mac_hex, &mut presented)
            .map_err(|_| BookslotError::Authorization("malformed state token".to_string()))?;

        // blake3::Hash equality is constant-time.
        let expected = blake3::keyed_hash(&self.key, encoded.as_bytes());
        if expected != blake3::Hash::from(presented) {
            return Err(BookslotError::Authorization(
                "state token signature mismatch".to_string(),
            ));
        }

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| BookslotError::Authorization("malformed state token".to_string()))?;
        let payload: StatePayload = serde_json::from_slice(&json)
            .map_err(|_| BookslotError::Authorization("malformed state token".to_string()))?;

        let age = now.timestamp() - payload.iat;
        if age < 0 || age > self.ttl_seconds {
            return Err(BookslotError::Authorization("state token expired".to_string()));
        }

        Ok(payload.sub)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }
}
