//! HubSpot OAuth2 authorization-code flow
//!
//! Drives a user through HubSpot's consent screen and keeps the resulting
//! tokens in the shared key-value cache. All flow state lives in the cache;
//! nothing is held in process between requests.
//!
//! Flow:
//! 1. `HubSpotOAuth::authorize()` stores a `StateToken` and returns the consent URL
//! 2. HubSpot redirects back with `code` + `state`
//! 3. `HubSpotOAuth::complete_authorization()` validates the state, exchanges
//!    the code via `token::exchange_code()` and caches the `Credentials`
//! 4. `HubSpotOAuth::credentials()` returns cached tokens, refreshing once via
//!    `token::refresh_token()` when the access token has expired

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod keys;
pub mod state;
pub mod token;

pub use config::OAuthConfig;
pub use constants::*;
pub use credentials::{Credentials, now_secs};
pub use error::{Error, Result};
pub use flow::{CallbackParams, HubSpotOAuth};
pub use keys::{credentials_key, state_key};
pub use state::StateToken;
pub use token::{exchange_code, refresh_token};
