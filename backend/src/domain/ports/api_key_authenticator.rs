//! Driving port used by the API key middleware.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ApiKey, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyAuthenticator: Send + Sync {
    /// Resolve a presented key. Unknown and expired keys are
    /// [`Unauthorized`](crate::domain::ErrorCode::Unauthorized).
    async fn authenticate(&self, key: Uuid) -> Result<ApiKey, Error>;
}
