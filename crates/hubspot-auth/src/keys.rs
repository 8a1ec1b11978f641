//! Cache key layout
//!
//! Both keys are scoped by organization then user, so one user's pending
//! state never collides with another org's record for the same user id.

use crate::constants::PROVIDER;

/// `hubspot_state:{org_id}:{user_id}`
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("{PROVIDER}_state:{org_id}:{user_id}")
}

/// `hubspot_credentials:{org_id}:{user_id}`
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("{PROVIDER}_credentials:{org_id}:{user_id}")
}
