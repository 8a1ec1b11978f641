//! Error types for item loading

/// Errors from credential parsing and CRM list calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid credentials format: {0}")]
    CredentialsFormat(String),

    #[error("Invalid credentials: missing access token")]
    MissingAccessToken,

    #[error("Failed to fetch HubSpot data: {0}")]
    Fetch(String),

    #[error("invalid HubSpot API base URL: {0}")]
    Config(String),
}

/// Result alias for item operations.
pub type Result<T> = std::result::Result<T, Error>;
