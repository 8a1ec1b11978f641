//! HubSpot OAuth endpoints and defaults

/// Provider name used as the cache key prefix.
pub const PROVIDER: &str = "hubspot";

/// Consent screen the user is redirected to.
pub const AUTHORIZE_ENDPOINT: &str = "https://app.hubspot.com/oauth/authorize";

/// Token endpoint for code exchange and token refresh.
pub const TOKEN_ENDPOINT: &str = "https://api.hubapi.com/oauth/v1/token";

/// Read scopes for the three CRM object types the item fetcher lists.
pub const DEFAULT_SCOPES: &[&str] = &[
    "crm.objects.contacts.read",
    "crm.objects.companies.read",
    "crm.objects.deals.read",
];

/// Lifetime of a pending authorization state entry.
pub const STATE_TTL_SECS: u64 = 600;

/// Lifetime of a cached credential record.
pub const CREDENTIALS_TTL_SECS: u64 = 3600;
