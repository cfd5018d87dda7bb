//! Storage of the API keys issued at login.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ApiKey;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by API key adapters.
    pub enum ApiKeyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "api key repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "api key repository query failed: {message}",
        /// The key's owner does not exist.
        NoSuchUser { user: Uuid } => "no such user {user}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn find_by_key(&self, key: Uuid) -> Result<Option<ApiKey>, ApiKeyRepositoryError>;

    async fn create(&self, key: &ApiKey) -> Result<(), ApiKeyRepositoryError>;

    /// Remove every key of `user`, returning how many went away.
    async fn delete_for_user(&self, user: Uuid) -> Result<usize, ApiKeyRepositoryError>;
}
