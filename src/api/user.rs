use serde::Deserialize;

use super::{ApiClient, ApiError};

#[derive(Debug, Deserialize)]
struct CurrentUser {
    login: String,
}

impl ApiClient {
    /// Login name of the principal the token belongs to.
    pub async fn current_login(&self) -> Result<String, ApiError> {
        let user: CurrentUser = self
            .get("user")
            .await?
            .json()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        if user.login.is_empty() {
            return Err(ApiError::InvalidResponse("empty login".to_string()));
        }
        Ok(user.login)
    }
}
