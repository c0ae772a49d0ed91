//! TOML-based configuration with environment overrides for portsync.

use crate::error::{PortSyncError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default Port API base URL.
pub const DEFAULT_API_URL: &str = "https://api.getport.io/v1";

/// Environment variable holding the Port client ID.
pub const ENV_CLIENT_ID: &str = "PORT_CLIENT_ID";
/// Environment variable holding the Port client secret.
pub const ENV_CLIENT_SECRET: &str = "PORT_CLIENT_SECRET";
/// Environment variable overriding the Port API base URL.
pub const ENV_API_URL: &str = "PORT_API_URL";

/// Top-level portsync configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortSyncConfig {
    #[serde(default)]
    pub port: PortConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Connection settings for the Port API.
#[derive(Clone, Serialize, Deserialize)]
pub struct PortConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            client_id: String::new(),
            client_secret: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for PortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_request_timeout() -> u64 {
    30
}

/// What gets synced and how it maps onto catalog blueprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_user_blueprint")]
    pub user_blueprint: String,
    #[serde(default = "default_team_blueprint")]
    pub team_blueprint: String,
    /// Field selector sent as repeated `fields` query parameters when listing users.
    #[serde(default = "default_user_fields")]
    pub user_fields: Vec<String>,
    /// Users whose email starts with any of these prefixes are not synced.
    #[serde(default = "default_skip_email_prefixes")]
    pub skip_email_prefixes: Vec<String>,
    /// Run user identifiers (emails) through the identifier sanitizer too.
    #[serde(default)]
    pub sanitize_user_identifiers: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            user_blueprint: default_user_blueprint(),
            team_blueprint: default_team_blueprint(),
            user_fields: default_user_fields(),
            skip_email_prefixes: default_skip_email_prefixes(),
            sanitize_user_identifiers: false,
        }
    }
}

fn default_user_blueprint() -> String {
    "user".into()
}

fn default_team_blueprint() -> String {
    "team".into()
}

fn default_user_fields() -> Vec<String> {
    [
        "email",
        "firstName",
        "lastName",
        "status",
        "providers",
        "createdAt",
        "teams.name",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_email_prefixes() -> Vec<String> {
    vec!["devops-port".into()]
}

impl PortSyncConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PortSyncError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Load from `path` if the file exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay credentials and API URL from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_CLIENT_ID) {
            self.port.client_id = id;
        }
        if let Some(secret) = get(ENV_CLIENT_SECRET) {
            self.port.client_secret = secret;
        }
        if let Some(url) = get(ENV_API_URL) {
            self.port.api_url = url;
        }
    }

    /// Validate the configuration, returning an error for unusable values.
    pub fn validate(&self) -> Result<()> {
        let url = self.port.api_url.trim();
        if url.is_empty() {
            return Err(PortSyncError::Config("port.api_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PortSyncError::Config(format!(
                "port.api_url must be an http(s) URL, got: {url}"
            )));
        }

        if self.port.client_id.is_empty() {
            return Err(PortSyncError::Config(format!(
                "port.client_id is required (set {ENV_CLIENT_ID})"
            )));
        }
        if self.port.client_secret.is_empty() {
            return Err(PortSyncError::Config(format!(
                "port.client_secret is required (set {ENV_CLIENT_SECRET})"
            )));
        }

        if self.port.request_timeout_secs == 0 {
            return Err(PortSyncError::Config(
                "port.request_timeout_secs must be greater than zero".into(),
            ));
        }

        if self.sync.user_blueprint.is_empty() {
            return Err(PortSyncError::Config(
                "sync.user_blueprint must not be empty".into(),
            ));
        }
        if self.sync.team_blueprint.is_empty() {
            return Err(PortSyncError::Config(
                "sync.team_blueprint must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default configuration suitable for writing to disk.
    ///
    /// Credentials are left blank so they can be supplied via the environment.
    pub fn generate_default() -> Self {
        Self::default()
    }
}
