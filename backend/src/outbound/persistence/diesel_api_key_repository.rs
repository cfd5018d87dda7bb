//! PostgreSQL-backed `ApiKeyRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ApiKey;
use crate::domain::ports::{ApiKeyRepository, ApiKeyRepositoryError};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::ApiKeyRow;
use super::pool::{DbPool, PoolError};
use super::schema::api_keys;

/// Diesel-backed implementation of the `ApiKeyRepository` port.
#[derive(Clone)]
pub struct DieselApiKeyRepository {
    pool: DbPool,
}

impl DieselApiKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApiKeyRepositoryError {
    map_basic_pool_error(error, ApiKeyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApiKeyRepositoryError {
    map_basic_diesel_error(
        error,
        ApiKeyRepositoryError::query,
        ApiKeyRepositoryError::connection,
    )
}

#[async_trait]
impl ApiKeyRepository for DieselApiKeyRepository {
    async fn find_by_key(&self, key: Uuid) -> Result<Option<ApiKey>, ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ApiKeyRow> = api_keys::table
            .filter(api_keys::key.eq(key))
            .select(ApiKeyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, key: &ApiKey) -> Result<(), ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(api_keys::table)
            .values(ApiKeyRow::from(key))
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    ApiKeyRepositoryError::no_such_user(key.api_user)
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn delete_for_user(&self, user: Uuid) -> Result<usize, ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(api_keys::table.filter(api_keys::api_user.eq(user)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
