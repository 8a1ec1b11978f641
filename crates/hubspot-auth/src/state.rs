//! CSRF state carried through the consent redirect
//!
//! The state is a small JSON object holding a random nonce plus the user and
//! organization that started the flow. Its JSON text is cached under the
//! state key; the URL carries the same bytes as URL-safe base64. On callback
//! the decoded bytes must equal the cached text exactly.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nonce-bearing state blob for one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateToken {
    /// Random nonce
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl StateToken {
    /// Fresh state with a 32-byte random nonce.
    pub fn generate(user_id: &str, org_id: &str) -> Self {
        Self {
            state: generate_nonce(),
            user_id: user_id.to_owned(),
            org_id: org_id.to_owned(),
        }
    }

    /// Compact JSON form stored in the cache.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidState(e.to_string()))
    }

    /// Encode cached JSON text for the `state` query parameter.
    pub fn encode(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    /// Decode a `state` query parameter.
    ///
    /// Returns the parsed token along with the exact JSON text it was decoded
    /// from, so the caller can compare it against the cached copy.
    pub fn decode(encoded: &str) -> Result<(Self, String)> {
        // Accept padded input from clients that re-encode the parameter
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim().trim_end_matches('='))
            .map_err(|e| Error::InvalidState(e.to_string()))?;
        let json = String::from_utf8(bytes).map_err(|e| Error::InvalidState(e.to_string()))?;
        let token: StateToken =
            serde_json::from_str(&json).map_err(|e| Error::InvalidState(e.to_string()))?;

        if token.user_id.is_empty() || token.org_id.is_empty() {
            return Err(Error::InvalidState("missing user_id or org_id".into()));
        }
        Ok((token, json))
    }
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    #[test]
    fn nonce_is_url_safe_and_unique() {
        let a = StateToken::generate("u1", "o1");
        let b = StateToken::generate("u1", "o1");
        // 32 bytes → 43 base64url chars without padding
        assert_eq!(a.state.len(), 43);
        assert!(
            a.state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "nonce must be URL-safe: {}",
            a.state
        );
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn decode_returns_exact_cached_bytes() {
        let token = StateToken::generate("u1", "o1");
        let json = token.to_json().unwrap();

        let (decoded, raw) = StateToken::decode(&StateToken::encode(&json)).unwrap();
        assert_eq!(decoded, token);
        assert_eq!(raw.as_bytes(), json.as_bytes());
    }

    #[test]
    fn decode_accepts_padded_input() {
        let json = r#"{"state":"n","user_id":"u1","org_id":"o1"}"#;
        let padded = URL_SAFE.encode(json);

        let (decoded, raw) = StateToken::decode(&padded).unwrap();
        assert_eq!(decoded.org_id, "o1");
        assert_eq!(raw, json);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            StateToken::decode("%%%not-base64%%%"),
            Err(Error::InvalidState(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert!(matches!(
            StateToken::decode(&not_json),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_identity() {
        let json = r#"{"state":"n","user_id":"","org_id":"o1"}"#;
        let result = StateToken::decode(&URL_SAFE_NO_PAD.encode(json));
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }
}
