//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The HubSpot client secret is loaded from HUBSPOT_CLIENT_SECRET or
//! client_secret_file, never stored in the TOML directly.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use hubspot_auth::OAuthConfig;
use serde::Deserialize;

const SECRET_ENV: &str = "HUBSPOT_CLIENT_SECRET";

/// Upper bound for cache TTLs and the sweep interval (30 days).
const MAX_CACHE_SECS: u64 = 30 * 24 * 60 * 60;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub hubspot: HubSpotConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Timeout for each outbound call to HubSpot
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// HubSpot app registration and endpoints
#[derive(Debug, Deserialize)]
pub struct HubSpotConfig {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to HUBSPOT_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Cache TTLs
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_credentials_ttl")]
    pub credentials_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            state_ttl_secs: default_state_ttl(),
            credentials_ttl_secs: default_credentials_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1000
}

fn default_authorize_url() -> String {
    hubspot_auth::AUTHORIZE_ENDPOINT.to_owned()
}

fn default_token_url() -> String {
    hubspot_auth::TOKEN_ENDPOINT.to_owned()
}

fn default_api_base_url() -> String {
    hubspot_items::DEFAULT_API_BASE.to_owned()
}

fn default_scopes() -> Vec<String> {
    hubspot_auth::DEFAULT_SCOPES
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn default_page_size() -> u32 {
    hubspot_items::DEFAULT_PAGE_SIZE
}

fn default_state_ttl() -> u64 {
    hubspot_auth::STATE_TTL_SECS
}

fn default_credentials_ttl() -> u64 {
    hubspot_auth::CREDENTIALS_TTL_SECS
}

fn default_sweep_interval() -> u64 {
    60
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Client secret resolution order:
    /// 1. HUBSPOT_CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        if let Ok(secret) = std::env::var(SECRET_ENV) {
            config.hubspot.client_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = config.hubspot.client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                config.hubspot.client_secret = Some(Secret::new(secret));
            }
        }

        match &config.hubspot.client_secret {
            Some(secret) if !secret.is_blank() => Ok(config),
            _ => Err(common::Error::MissingSecret {
                name: "HubSpot client secret",
                env: SECRET_ENV,
                file_key: "hubspot.client_secret_file",
            }),
        }
    }

    fn validate(&self) -> common::Result<()> {
        if self.hubspot.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        for (name, url) in [
            ("redirect_uri", &self.hubspot.redirect_uri),
            ("authorize_url", &self.hubspot.authorize_url),
            ("token_url", &self.hubspot.token_url),
            ("api_base_url", &self.hubspot.api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if self.hubspot.scopes.is_empty() {
            return Err(common::Error::Config("scopes must not be empty".into()));
        }

        for (name, value) in [
            ("timeout_secs", self.server.timeout_secs),
            ("max_connections", self.server.max_connections as u64),
            ("page_size", u64::from(self.hubspot.page_size)),
            ("state_ttl_secs", self.cache.state_ttl_secs),
            ("credentials_ttl_secs", self.cache.credentials_ttl_secs),
            ("sweep_interval_secs", self.cache.sweep_interval_secs),
        ] {
            if value == 0 {
                return Err(common::Error::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        for (name, value) in [
            ("state_ttl_secs", self.cache.state_ttl_secs),
            ("credentials_ttl_secs", self.cache.credentials_ttl_secs),
            ("sweep_interval_secs", self.cache.sweep_interval_secs),
        ] {
            if value > MAX_CACHE_SECS {
                return Err(common::Error::Config(format!(
                    "{name} must be at most {MAX_CACHE_SECS}, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// OAuth client settings for `HubSpotOAuth`.
    pub fn oauth_config(&self) -> OAuthConfig {
        let secret = self
            .hubspot
            .client_secret
            .clone()
            .unwrap_or_else(|| Secret::new(String::new()));
        let mut oauth = OAuthConfig::new(
            self.hubspot.client_id.clone(),
            secret,
            self.hubspot.redirect_uri.clone(),
        );
        oauth.authorize_endpoint = self.hubspot.authorize_url.clone();
        oauth.token_endpoint = self.hubspot.token_url.clone();
        oauth.scopes = self.hubspot.scopes.clone();
        oauth.state_ttl = Duration::from_secs(self.cache.state_ttl_secs);
        oauth.credentials_ttl = Duration::from_secs(self.cache.credentials_ttl_secs);
        oauth
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("hubspot-integration.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn valid_toml() -> &'static str {
        r#"
[server]
listen_addr = "127.0.0.1:8000"

[hubspot]
client_id = "client-123"
redirect_uri = "http://localhost:8000/integrations/hubspot/oauth2callback"
"#
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_applies_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());
        unsafe { set_env(SECRET_ENV, "env-secret") };

        let config = Config::load(&path).unwrap();
        unsafe { remove_env(SECRET_ENV) };

        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.hubspot.token_url, hubspot_auth::TOKEN_ENDPOINT);
        assert_eq!(config.hubspot.api_base_url, "https://api.hubapi.com");
        assert_eq!(config.hubspot.page_size, 100);
        assert_eq!(config.hubspot.scopes.len(), 3);
        assert_eq!(config.cache.state_ttl_secs, 600);
        assert_eq!(config.cache.credentials_ttl_secs, 3600);
        assert_eq!(
            config.hubspot.client_secret.as_ref().unwrap().expose(),
            "env-secret"
        );
    }

    #[test]
    fn oauth_config_carries_file_values() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
listen_addr = "127.0.0.1:8000"

[hubspot]
client_id = "client-123"
redirect_uri = "http://localhost:8000/cb"
token_url = "http://127.0.0.1:9999/oauth/v1/token"
scopes = ["crm.objects.contacts.read"]

[cache]
state_ttl_secs = 120
"#,
        );
        unsafe { set_env(SECRET_ENV, "s") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env(SECRET_ENV) };

        let oauth = config.oauth_config();
        assert_eq!(oauth.client_id, "client-123");
        assert_eq!(oauth.client_secret.expose(), "s");
        assert_eq!(oauth.token_endpoint, "http://127.0.0.1:9999/oauth/v1/token");
        assert_eq!(oauth.scope_param(), "crm.objects.contacts.read");
        assert_eq!(oauth.state_ttl, Duration::from_secs(120));
        assert_eq!(oauth.credentials_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn secret_from_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "file-secret\n").unwrap();
        let path = write_config(
            &dir,
            &format!(
                "{}client_secret_file = \"{}\"\n",
                valid_toml(),
                secret_path.display()
            ),
        );

        unsafe { remove_env(SECRET_ENV) };
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.hubspot.client_secret.as_ref().unwrap().expose(),
            "file-secret"
        );
    }

    #[test]
    fn env_secret_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            &format!("{}client_secret_file = \"/nonexistent/secret\"\n", valid_toml()),
        );

        unsafe { set_env(SECRET_ENV, "env-wins") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env(SECRET_ENV) };
        assert_eq!(
            config.hubspot.client_secret.as_ref().unwrap().expose(),
            "env-wins"
        );
    }

    #[test]
    fn missing_secret_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        unsafe { remove_env(SECRET_ENV) };
        let err = Config::load(&path).unwrap_err();
        assert!(
            matches!(err, common::Error::MissingSecret { .. }),
            "got: {err}"
        );
        assert!(err.to_string().contains(SECRET_ENV));
    }

    #[test]
    fn blank_secret_file_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "  \n").unwrap();
        let path = write_config(
            &dir,
            &format!(
                "{}client_secret_file = \"{}\"\n",
                valid_toml(),
                secret_path.display()
            ),
        );

        unsafe { remove_env(SECRET_ENV) };
        assert!(matches!(
            Config::load(&path),
            Err(common::Error::MissingSecret { .. })
        ));
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
listen_addr = "127.0.0.1:8000"

[hubspot]
client_id = "c"
redirect_uri = "localhost/cb"
"#,
        );
        unsafe { set_env(SECRET_ENV, "s") };
        let err = Config::load(&path).unwrap_err().to_string();
        unsafe { remove_env(SECRET_ENV) };
        assert!(
            err.contains("redirect_uri must start with http"),
            "got: {err}"
        );
    }

    #[test]
    fn zero_values_are_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        for (section, field) in [
            ("server", "timeout_secs"),
            ("hubspot", "page_size"),
            ("cache", "credentials_ttl_secs"),
        ] {
            let contents = match section {
                "server" => valid_toml().replace(
                    "listen_addr = \"127.0.0.1:8000\"",
                    &format!("listen_addr = \"127.0.0.1:8000\"\n{field} = 0"),
                ),
                "hubspot" => format!("{}{field} = 0\n", valid_toml()),
                _ => format!("{}\n[cache]\n{field} = 0\n", valid_toml()),
            };
            let path = write_config(&dir, &contents);
            unsafe { set_env(SECRET_ENV, "s") };
            let result = Config::load(&path);
            unsafe { remove_env(SECRET_ENV) };
            let err = result.unwrap_err().to_string();
            assert!(err.contains(field), "{field}: got {err}");
        }
    }

    #[test]
    fn oversized_cache_durations_are_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        for field in ["state_ttl_secs", "credentials_ttl_secs", "sweep_interval_secs"] {
            let contents = format!("{}\n[cache]\n{field} = {}\n", valid_toml(), u64::MAX / 2);
            let path = write_config(&dir, &contents);
            unsafe { set_env(SECRET_ENV, "s") };
            let result = Config::load(&path);
            unsafe { remove_env(SECRET_ENV) };
            let err = result.unwrap_err().to_string();
            assert!(err.contains(field), "{field}: got {err}");
            assert!(err.contains("at most"), "{field}: got {err}");
        }

        let contents = format!("{}\n[cache]\ncredentials_ttl_secs = {MAX_CACHE_SECS}\n", valid_toml());
        let path = write_config(&dir, &contents);
        unsafe { set_env(SECRET_ENV, "s") };
        let result = Config::load(&path);
        unsafe { remove_env(SECRET_ENV) };
        assert_eq!(result.unwrap().cache.credentials_ttl_secs, MAX_CACHE_SECS);
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, &valid_toml().replace("client-123", " "));
        unsafe { set_env(SECRET_ENV, "s") };
        let result = Config::load(&path);
        unsafe { remove_env(SECRET_ENV) };
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Path::new("/nonexistent/path/config.toml")).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn resolve_path_precedence() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        assert_eq!(
            Config::resolve_path(Some("/cli/wins.toml")),
            PathBuf::from("/cli/wins.toml")
        );
        assert_eq!(Config::resolve_path(None), PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(
            Config::resolve_path(None),
            PathBuf::from("hubspot-integration.toml")
        );
    }
}
