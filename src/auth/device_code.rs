use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dialoguer::console::style;
use serde::Deserialize;

use super::error::AuthError;
use super::BrowserAuth;
use crate::config::{CredentialStore, OAUTH_TOKEN_KEY};

/// Device-code session details returned by the host.
#[derive(Debug, Clone)]
pub struct DeviceCodeSession {
    pub hostname: String,
    pub verification_url: String,
    pub user_code: String,
    pub device_code: String,
    pub interval_secs: u64,
    pub expires_at: DateTime<Utc>,
}

/// Polling outcome for a device-code session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCodePoll {
    Pending { interval_secs: u64 },
    SlowDown { interval_secs: u64 },
    Authorized { access_token: String },
    AccessDenied,
    Expired,
}

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);
const SLOW_DOWN_STEP_SECS: u64 = 5;

type Notifier = Box<dyn Fn(&DeviceCodeSession) + Send + Sync>;

/// OAuth device-code flow against `https://<host>/login/...`.
///
/// The operator is shown a one-time code, approves it in a browser, and
/// the resulting token is written to the store and committed.
///
/// # Example
/// ```no_run
/// use hubauth::auth::DeviceCodeFlow;
///
/// let flow = DeviceCodeFlow::new("178c6fc778ccc68e1d6a", &["repo", "read:org"]);
/// ```
pub struct DeviceCodeFlow {
    client: reqwest::Client,
    client_id: String,
    scopes: Vec<String>,
    oauth_base: Option<String>,
    open_browser: bool,
    notify: Notifier,
}

impl DeviceCodeFlow {
    pub fn new(client_id: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            client: default_http_client(),
            client_id: client_id.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            oauth_base: None,
            open_browser: cfg!(feature = "browser"),
            notify: Box::new(print_one_time_code),
        }
    }

    /// Send requests through `client` instead of the default one.
    pub fn with_http(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Talk to `url` instead of `https://<host>/`.
    pub fn with_oauth_base(mut self, url: impl Into<String>) -> Self {
        self.oauth_base = Some(url.into());
        self
    }

    pub fn with_open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    /// Replace how the one-time code is shown to the operator.
    pub fn with_notifier(
        mut self,
        notify: impl Fn(&DeviceCodeSession) + Send + Sync + 'static,
    ) -> Self {
        self.notify = Box::new(notify);
        self
    }

    fn oauth_url(&self, hostname: &str, path: &str) -> String {
        let base = match &self.oauth_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{hostname}"),
        };
        format!("{base}/{path}")
    }

    pub async fn start_device_code(&self, hostname: &str) -> Result<DeviceCodeSession, AuthError> {
        let scope = self.scopes.join(" ");
        let resp = self
            .client
            .post(self.oauth_url(hostname, "login/device/code"))
            .header("Accept", "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::InvalidResponse(format!(
                "Device code request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceCodeResponse = resp.json().await?;
        let expires_at = i64::try_from(payload.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::InvalidResponse(format!(
                    "Device code expires_in out of range: {}",
                    payload.expires_in
                ))
            })?;
        Ok(DeviceCodeSession {
            hostname: hostname.to_string(),
            verification_url: payload.verification_uri,
            user_code: payload.user_code,
            device_code: payload.device_code,
            interval_secs: payload.interval,
            expires_at,
        })
    }

    pub async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
    ) -> Result<DeviceCodePoll, AuthError> {
        if Utc::now() >= session.expires_at {
            return Ok(DeviceCodePoll::Expired);
        }
        let resp = self
            .client
            .post(self.oauth_url(&session.hostname, "login/oauth/access_token"))
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("device_code", session.device_code.as_str()),
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::InvalidResponse(format!(
                "Device token request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceTokenResponse = resp.json().await?;
        if let Some(access_token) = payload.access_token {
            return Ok(DeviceCodePoll::Authorized { access_token });
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending {
                interval_secs: session.interval_secs,
            }),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown {
                interval_secs: payload
                    .interval
                    .unwrap_or(session.interval_secs.saturating_add(SLOW_DOWN_STEP_SECS)),
            }),
            Some("expired_token") => Ok(DeviceCodePoll::Expired),
            Some("access_denied") => Ok(DeviceCodePoll::AccessDenied),
            Some(other) => Err(AuthError::InvalidResponse(format!(
                "Device code error: {other}"
            ))),
            None => Err(AuthError::InvalidResponse(
                "Device code response missing token and error".to_string(),
            )),
        }
    }
}

#[async_trait]
impl BrowserAuth for DeviceCodeFlow {
    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        hostname: &str,
    ) -> Result<(), AuthError> {
        let session = self.start_device_code(hostname).await?;
        (self.notify)(&session);
        if self.open_browser {
            open_in_browser(&session.verification_url);
        }

        let mut interval = session.interval_secs;
        loop {
            tokio::time::sleep(StdDuration::from_secs(interval)).await;
            match self.poll_device_code(&session).await? {
                DeviceCodePoll::Pending { .. } => continue,
                DeviceCodePoll::SlowDown { interval_secs } => interval = interval_secs,
                DeviceCodePoll::Authorized { access_token } => {
                    store.set(hostname, OAUTH_TOKEN_KEY, &access_token)?;
                    store.commit()?;
                    tracing::debug!(%hostname, "device flow authorized");
                    return Ok(());
                }
                DeviceCodePoll::AccessDenied => return Err(AuthError::AccessDenied),
                DeviceCodePoll::Expired => return Err(AuthError::Expired),
            }
        }
    }
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("hubauth/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

fn print_one_time_code(session: &DeviceCodeSession) {
    eprintln!(
        "{} First copy your one-time code: {}",
        style("!").yellow(),
        style(&session.user_code).bold()
    );
    eprintln!(
        "- Open {} in your browser to authorize",
        style(&session.verification_url).bold()
    );
}

#[cfg(feature = "browser")]
fn open_in_browser(url: &str) {
    if let Err(err) = webbrowser::open(url) {
        tracing::warn!(error = %err, "could not open browser");
    }
}

#[cfg(not(feature = "browser"))]
fn open_in_browser(_url: &str) {}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct DeviceTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    interval: Option<u64>,
}
