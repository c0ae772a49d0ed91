//! Client-credentials authentication against the Port API.
//!
//! Authentication is an explicit step: build the credentials from
//! configuration, call [`PortAuth::authenticate`], and hand the resulting
//! token to [`crate::client::PortClient`]. The token is never refreshed; if
//! it expires mid-run, later requests fail.

use std::fmt;

use portsync_core::config::PortConfig;
use portsync_core::error::{PortSyncError, Result};
use tracing::{debug, error};

use crate::models::{AccessTokenRequest, AccessTokenResponse};

/// Client ID and secret for the Port API.
#[derive(Clone)]
pub struct PortCredentials {
    client_id: String,
    client_secret: String,
}

impl PortCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_config(config: &PortConfig) -> Self {
        Self::new(&config.client_id, &config.client_secret)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for PortCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Holds the bearer token for Port API requests.
pub struct PortAuth {
    token: String,
}

impl PortAuth {
    /// Wrap an already-issued bearer token.
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// Exchange credentials for an access token via `POST {api_url}/auth/access_token`.
    ///
    /// Any non-success status, transport error, or response without an
    /// `accessToken` is a [`PortSyncError::Auth`].
    pub async fn authenticate(
        http: &reqwest::Client,
        api_url: &str,
        credentials: &PortCredentials,
    ) -> Result<Self> {
        let url = format!("{}/auth/access_token", api_url.trim_end_matches('/'));
        debug!(url = %url, client_id = credentials.client_id(), "requesting Port access token");

        let resp = http
            .post(&url)
            .json(&AccessTokenRequest {
                client_id: &credentials.client_id,
                client_secret: &credentials.client_secret,
            })
            .send()
            .await
            .map_err(|e| PortSyncError::Auth(format!("access token request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Port authentication failed");
            return Err(PortSyncError::Auth(format!(
                "access token request failed ({status}): {body}"
            )));
        }

        let parsed = resp
            .json::<AccessTokenResponse>()
            .await
            .map_err(|e| PortSyncError::Auth(format!("access token parse failed: {e}")))?;

        let token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PortSyncError::Auth("response did not contain accessToken".into()))?;

        debug!("Port authentication successful");
        Ok(Self::new(token))
    }

    /// Returns the current bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for PortAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortAuth").field("token", &"<redacted>").finish()
    }
}
