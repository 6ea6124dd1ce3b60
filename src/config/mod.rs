//! Configuration system (env > `.env` > defaults) and the hosts store.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{
    normalize_host, CredentialStore, FileHostsStore, HostsDocument, GIT_PROTOCOL_KEY,
    OAUTH_TOKEN_KEY,
};

use std::path::PathBuf;

/// OAuth app used by the device-code flow unless overridden.
pub const DEFAULT_OAUTH_CLIENT_ID: &str = "178c6fc778ccc68e1d6a";

const CONFIG_DIR_ENV: &str = "HUBAUTH_CONFIG_DIR";
const API_URL_ENV: &str = "HUBAUTH_API_URL";
const CLIENT_ID_ENV: &str = "HUBAUTH_OAUTH_CLIENT_ID";

/// Process-level settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `hosts.toml`.
    pub config_dir: PathBuf,
    /// API base URL used for every host instead of the derived one.
    pub api_url: Option<String>,
    pub oauth_client_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            api_url: None,
            oauth_client_id: DEFAULT_OAUTH_CLIENT_ID.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            config_dir: non_empty(CONFIG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.config_dir),
            api_url: non_empty(API_URL_ENV),
            oauth_client_id: non_empty(CLIENT_ID_ENV).unwrap_or(defaults.oauth_client_id),
        }
    }

    pub fn hosts_path(&self) -> PathBuf {
        self.config_dir.join(FileHostsStore::FILE_NAME)
    }
}

fn default_config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("hubauth"))
        .unwrap_or_else(|| PathBuf::from(".hubauth"))
}
