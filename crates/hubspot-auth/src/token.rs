//! Token endpoint calls
//!
//! Both the authorization-code exchange and the refresh grant POST a form to
//! `OAuthConfig::token_endpoint` and receive the same JSON shape back. The
//! returned `Credentials` carry no `created_at`; the caller stamps it when
//! writing the record to the cache.

use tracing::debug;

use crate::config::OAuthConfig;
use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Exchange an authorization code for an access/refresh token pair.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<Credentials> {
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.expose().as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code", code),
    ];

    post_token_form(client, &config.token_endpoint, &form)
        .await
        .map_err(Error::TokenExchange)
}

/// Obtain a new access token with a refresh token.
pub async fn refresh_token(
    client: &reqwest::Client,
    config: &OAuthConfig,
    refresh: &str,
) -> Result<Credentials> {
    if refresh.is_empty() {
        return Err(Error::Refresh("no refresh token stored".into()));
    }

    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.expose().as_str()),
        ("refresh_token", refresh),
    ];

    post_token_form(client, &config.token_endpoint, &form)
        .await
        .map_err(Error::Refresh)
}

async fn post_token_form(
    client: &reqwest::Client,
    endpoint: &str,
    form: &[(&str, &str)],
) -> std::result::Result<Credentials, String> {
    let response = client
        .post(endpoint)
        .form(form)
        .send()
        .await
        .map_err(|e| format!("token request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(format!("token endpoint returned {status}: {body}"));
    }

    let credentials = response
        .json::<Credentials>()
        .await
        .map_err(|e| format!("invalid token response: {e}"))?;

    if credentials.access_token.is_empty() {
        return Err("token response carried an empty access_token".into());
    }

    debug!(expires_in = ?credentials.expires_in, "token endpoint returned credentials");
    Ok(credentials)
}
