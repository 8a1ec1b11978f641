//! Authorize, callback and credential access
//!
//! `HubSpotOAuth` ties the OAuth config, the shared cache and an HTTP client
//! together. Each operation is a straight line: validate input, touch the
//! cache and/or the token endpoint, map failures into `Error`.

use std::sync::Arc;

use kv_store::KeyValueStore;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::OAuthConfig;
use crate::credentials::{Credentials, now_secs};
use crate::error::{Error, Result};
use crate::keys::{credentials_key, state_key};
use crate::state::StateToken;
use crate::token;

/// Query parameters HubSpot appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub struct HubSpotOAuth {
    config: OAuthConfig,
    store: Arc<dyn KeyValueStore>,
    http: reqwest::Client,
}

impl HubSpotOAuth {
    pub fn new(config: OAuthConfig, store: Arc<dyn KeyValueStore>, http: reqwest::Client) -> Self {
        Self {
            config,
            store,
            http,
        }
    }

    /// Start an authorization: cache a fresh state and return the consent URL.
    #[instrument(skip(self))]
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> Result<String> {
        if user_id.trim().is_empty() || org_id.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "Missing required parameters: user_id or org_id".into(),
            ));
        }
        // ':' separates key segments; allowing it would let two pairs share a key
        if user_id.contains(':') || org_id.contains(':') {
            return Err(Error::InvalidRequest(
                "user_id and org_id must not contain ':'".into(),
            ));
        }

        let state = StateToken::generate(user_id, org_id);
        let json = state.to_json()?;
        let encoded = StateToken::encode(&json);

        self.store
            .set(&state_key(org_id, user_id), json, self.config.state_ttl)
            .await?;

        let url = reqwest::Url::parse_with_params(
            &self.config.authorize_endpoint,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope_param().as_str()),
                ("state", encoded.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorize endpoint: {e}")))?;

        info!("authorization started");
        Ok(url.into())
    }

    /// Finish an authorization from the redirect's query parameters.
    ///
    /// On success the token pair is cached for the org+user named in the
    /// state and the pending state entry is deleted. Returns that state.
    #[instrument(skip_all)]
    pub async fn complete_authorization(&self, params: &CallbackParams) -> Result<StateToken> {
        if let Some(error) = non_empty(&params.error) {
            let description = params
                .error_description
                .clone()
                .unwrap_or_else(|| "an unknown oauth error occurred".into());
            warn!(error = %error, "provider returned an authorization error");
            return Err(Error::Provider(description));
        }

        let (code, encoded) = match (non_empty(&params.code), non_empty(&params.state)) {
            (Some(code), Some(state)) => (code, state),
            _ => {
                return Err(Error::InvalidRequest(
                    "Missing required parameters: code or state".into(),
                ));
            }
        };

        let (state, raw) = StateToken::decode(encoded)?;
        let key = state_key(&state.org_id, &state.user_id);

        let saved = self.store.get(&key).await?;
        if saved.as_deref().map(str::as_bytes) != Some(raw.as_bytes()) {
            warn!(
                org_id = %state.org_id,
                user_id = %state.user_id,
                "state does not match pending authorization"
            );
            return Err(Error::StateMismatch);
        }

        let mut credentials = token::exchange_code(&self.http, &self.config, code).await?;
        credentials.created_at = Some(now_secs());
        self.store_credentials(&state.org_id, &state.user_id, &credentials)
            .await?;

        // Leaves the state behind until its TTL if this fails; nothing reads it
        // again once credentials exist.
        if let Err(e) = self.store.delete(&key).await {
            warn!(error = %e, "failed to delete consumed state");
        }

        info!(org_id = %state.org_id, user_id = %state.user_id, "authorization completed");
        Ok(state)
    }

    /// Cached credentials for an org+user, refreshed once if expired.
    #[instrument(skip(self))]
    pub async fn credentials(&self, user_id: &str, org_id: &str) -> Result<Credentials> {
        let stored = self
            .store
            .get(&credentials_key(org_id, user_id))
            .await?
            .ok_or(Error::NoCredentials)?;

        let credentials: Credentials = serde_json::from_str(&stored)
            .map_err(|e| Error::MalformedCredentials(e.to_string()))?;

        if !credentials.is_expired(now_secs()) {
            debug!("cached access token still valid");
            return Ok(credentials);
        }

        info!("access token expired, refreshing");
        let mut refreshed =
            match token::refresh_token(&self.http, &self.config, &credentials.refresh_token).await
            {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    metrics::counter!("integration_token_refresh_total", "outcome" => "failure")
                        .increment(1);
                    return Err(e);
                }
            };
        metrics::counter!("integration_token_refresh_total", "outcome" => "success").increment(1);

        refreshed.created_at = Some(now_secs());
        if refreshed.refresh_token.is_empty() {
            refreshed.refresh_token = credentials.refresh_token;
        }
        self.store_credentials(org_id, user_id, &refreshed).await?;
        Ok(refreshed)
    }

    async fn store_credentials(
        &self,
        org_id: &str,
        user_id: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let json = serde_json::to_string(credentials)
            .map_err(|e| Error::MalformedCredentials(e.to_string()))?;
        self.store
            .set(
                &credentials_key(org_id, user_id),
                json,
                self.config.credentials_ttl,
            )
            .await?;
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
