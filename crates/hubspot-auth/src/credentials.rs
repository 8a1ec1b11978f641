//! Cached credential record
//!
//! Stored as the token endpoint's JSON response plus a `created_at` stamp
//! (unix seconds) added when the record is written. Fields HubSpot adds
//! beyond the ones modelled here are kept in `extra` and survive a round
//! trip through the cache.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Access/refresh token pair for one org+user.
///
/// The access token is valid until `created_at + expires_in`. Records missing
/// either field carry no expiry information and are treated as current.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds the access token is valid for, counted from `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Unix seconds at which the token pair was obtained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Credentials {
    /// Unix second at which the access token stops being valid.
    pub fn expires_at(&self) -> Option<u64> {
        match (self.created_at, self.expires_in) {
            (Some(created), Some(lifetime)) => Some(created.saturating_add(lifetime)),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("created_at", &self.created_at)
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

/// Current unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
