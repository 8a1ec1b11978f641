//! Error types for the OAuth flow
//!
//! Messages are user-facing: the service returns them verbatim as the
//! `detail` of a 400 response.

/// Errors from authorization, callback and credential access.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("HubSpot OAuth error: {0}")]
    Provider(String),

    #[error("Invalid state parameter: {0}")]
    InvalidState(String),

    #[error("State validation failed")]
    StateMismatch,

    #[error("Failed to exchange code for tokens: {0}")]
    TokenExchange(String),

    #[error("No HubSpot credentials found. Please reauthorize the integration.")]
    NoCredentials,

    #[error("Failed to refresh HubSpot token: {0}")]
    Refresh(String),

    #[error("Stored HubSpot credentials are malformed: {0}")]
    MalformedCredentials(String),

    #[error("OAuth configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] kv_store::Error),
}

/// Result alias for OAuth operations.
pub type Result<T> = std::result::Result<T, Error>;
