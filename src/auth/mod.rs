//! Browser-based authorization, used by the interactive login branch.

pub mod device_code;
pub mod error;

pub use device_code::{DeviceCodeFlow, DeviceCodePoll, DeviceCodeSession};
pub use error::AuthError;

use async_trait::async_trait;

use crate::config::CredentialStore;

/// Obtains a token for `hostname` out of band and leaves it committed in
/// `store`. The login flow treats the whole exchange as one opaque step.
#[async_trait]
pub trait BrowserAuth: Send + Sync {
    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        hostname: &str,
    ) -> Result<(), AuthError>;
}
