//! Authenticated REST client for a GitHub host.

pub mod error;
pub mod scopes;
pub mod user;

pub use error::ApiError;
pub use scopes::{parse_scopes, ScopeCheck, SCOPES_HEADER};

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::config::{CredentialStore, OAUTH_TOKEN_KEY};

/// The public host; every other hostname is treated as an Enterprise server.
pub const DEFAULT_HOSTNAME: &str = "github.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client bound to one host and one access token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"..")
            .finish()
    }
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http,
            base_url,
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET; non-2xx responses become [`ApiError::Status`].
    pub(crate) async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(%url, "api request");
        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            message: error_message(&body),
        })
    }
}

/// Builds [`ApiClient`]s from the credential currently held in a store.
#[derive(Debug, Clone)]
pub struct ApiClientFactory {
    http: reqwest::Client,
    api_url: Option<String>,
}

impl ApiClientFactory {
    pub fn new() -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()?;
        Ok(Self::with_http(http))
    }

    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http, api_url: None }
    }

    /// The shared HTTP client every built [`ApiClient`] uses.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send every request to `url` regardless of hostname.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn api_base(&self, hostname: &str) -> String {
        match &self.api_url {
            Some(url) => url.clone(),
            None => api_base_for(hostname),
        }
    }

    /// Read the committed token for `hostname` and bind a client to it.
    pub fn build(
        &self,
        store: &dyn CredentialStore,
        hostname: &str,
    ) -> Result<ApiClient, ApiError> {
        let token = store
            .get(hostname, OAUTH_TOKEN_KEY)?
            .ok_or_else(|| ApiError::MissingToken {
                hostname: hostname.to_string(),
            })?;
        Ok(ApiClient::new(
            self.http.clone(),
            self.api_base(hostname),
            token,
        ))
    }
}

/// REST base URL for a host.
pub fn api_base_for(hostname: &str) -> String {
    if hostname.eq_ignore_ascii_case(DEFAULT_HOSTNAME) {
        "https://api.github.com/".to_string()
    } else {
        format!("https://{}/api/v3/", hostname.to_ascii_lowercase())
    }
}

fn user_agent() -> String {
    format!("hubauth/{}", env!("CARGO_PKG_VERSION"))
}

fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

impl Default for ApiClientFactory {
    fn default() -> Self {
        Self::with_http(reqwest::Client::new())
    }
}
