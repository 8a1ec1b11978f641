//! OAuth client configuration
//!
//! Client id, secret and redirect URI are supplied by the embedding service
//! at construction time. Endpoints default to HubSpot's public hosts and are
//! overridable so the flow can be pointed at a test double.

use std::time::Duration;

use common::Secret;

use crate::constants::{
    AUTHORIZE_ENDPOINT, CREDENTIALS_TTL_SECS, DEFAULT_SCOPES, STATE_TTL_SECS, TOKEN_ENDPOINT,
};

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub scopes: Vec<String>,
    /// How long a pending authorization may take before its state expires
    pub state_ttl: Duration,
    /// Cache lifetime of a stored credential record
    pub credentials_ttl: Duration,
}

impl OAuthConfig {
    /// Config with HubSpot's endpoints, default scopes and TTLs.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_owned(),
            token_endpoint: TOKEN_ENDPOINT.to_owned(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect(),
            state_ttl: Duration::from_secs(STATE_TTL_SECS),
            credentials_ttl: Duration::from_secs(CREDENTIALS_TTL_SECS),
        }
    }

    /// Space-separated scope list as sent in the authorization URL.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}
