//! API key authentication.
//!
//! Keys are issued at login by the user service and checked here on every
//! game request. A key is usable until `valid_until` (exclusive).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{ApiKeyAuthenticator, ApiKeyRepository, ApiKeyRepositoryError};

/// An API key row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: Uuid,
    pub key: Uuid,
    pub api_user: Uuid,
    pub valid_until: DateTime<Utc>,
}

impl ApiKey {
    /// Whether the key may still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }
}

/// Authenticator backed by an [`ApiKeyRepository`].
#[derive(Clone)]
pub struct ApiKeyService<R> {
    keys: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ApiKeyService<R> {
    pub fn new(keys: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }
}

pub(crate) fn map_api_key_error(error: ApiKeyRepositoryError) -> Error {
    match error {
        ApiKeyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("api key repository unavailable: {message}"))
        }
        ApiKeyRepositoryError::Query { message } => {
            Error::internal(format!("api key repository error: {message}"))
        }
        ApiKeyRepositoryError::NoSuchUser { .. } => Error::not_found("No such user"),
    }
}

#[async_trait]
impl<R> ApiKeyAuthenticator for ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    async fn authenticate(&self, key: Uuid) -> Result<ApiKey, Error> {
        let found = self
            .keys
            .find_by_key(key)
            .await
            .map_err(map_api_key_error)?
            .ok_or_else(|| Error::unauthorized("Invalid API key"))?;
        if !found.is_valid_at(self.clock.utc()) {
            return Err(Error::unauthorized("API key expired"));
        }
        Ok(found)
    }
}
