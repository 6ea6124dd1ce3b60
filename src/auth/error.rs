use thiserror::Error;

use crate::config::StoreError;

/// Failures of the browser (device-code) authorization flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access denied")]
    AccessDenied,
    #[error("Device code expired, please try again")]
    Expired,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
