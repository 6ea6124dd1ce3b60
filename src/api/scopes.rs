//! Scope verification against the `X-OAuth-Scopes` response header.

use super::{ApiClient, ApiError};

/// Response header listing the scopes granted to the presented token.
pub const SCOPES_HEADER: &str = "x-oauth-scopes";

/// Outcome of a scope query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCheck {
    /// Every required scope was granted.
    pub satisfied: bool,
    /// Scopes the host reported, in header order.
    pub granted: Vec<String>,
}

impl ScopeCheck {
    pub fn evaluate(required: &[&str], granted: Vec<String>) -> Self {
        let satisfied = required
            .iter()
            .all(|scope| granted.iter().any(|g| g == scope));
        Self { satisfied, granted }
    }
}

/// Split a comma-delimited scope header, dropping blanks.
pub fn parse_scopes(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

impl ApiClient {
    /// Ask the host whether the current token carries all of `required`.
    ///
    /// Extra granted scopes are fine. A response without the scopes header
    /// reports nothing granted.
    pub async fn has_scopes(&self, required: &[&str]) -> Result<ScopeCheck, ApiError> {
        let resp = self.get("user").await?;
        let header = resp
            .headers()
            .get(SCOPES_HEADER)
            .map(|value| {
                value
                    .to_str()
                    .map(str::to_string)
                    .map_err(|err| ApiError::InvalidResponse(format!("{SCOPES_HEADER}: {err}")))
            })
            .transpose()?
            .unwrap_or_default();
        let check = ScopeCheck::evaluate(required, parse_scopes(&header));
        tracing::debug!(
            satisfied = check.satisfied,
            granted = ?check.granted,
            "scope check"
        );
        Ok(check)
    }
}
